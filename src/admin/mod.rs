//! Thin CRUD client for the back-office REST surface.
//!
//! The admin endpoints are schemaless from the client's point of view:
//! requests and responses are passed through as JSON values. Console
//! state (the current selection) lives on the console instance and dies
//! with it.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::api::client::{ApiClient, Auth};
use crate::api::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Users,
    Subscriptions,
    Advertisements,
    Packages,
    Videos,
    Media,
    Settings,
    Overview,
}

impl Section {
    pub fn slug(&self) -> &'static str {
        match self {
            Section::Users => "users",
            Section::Subscriptions => "subscriptions",
            Section::Advertisements => "advertisements",
            Section::Packages => "packages",
            Section::Videos => "videos",
            Section::Media => "media",
            Section::Settings => "settings",
            Section::Overview => "overview",
        }
    }

    fn path(&self) -> String {
        format!("/api/admin/{}", self.slug())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Section::Users),
            "subscriptions" => Ok(Section::Subscriptions),
            "advertisements" => Ok(Section::Advertisements),
            "packages" => Ok(Section::Packages),
            "videos" => Ok(Section::Videos),
            "media" => Ok(Section::Media),
            "settings" => Ok(Section::Settings),
            "overview" => Ok(Section::Overview),
            other => Err(format!("unknown admin section: {}", other)),
        }
    }
}

pub struct AdminConsole {
    api: ApiClient,
    selected: Mutex<BTreeSet<String>>,
}

impl AdminConsole {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            selected: Mutex::new(BTreeSet::new()),
        }
    }

    pub async fn list(&self, section: Section) -> Result<Value, ApiError> {
        self.api.get(&section.path(), Auth::Bearer).await
    }

    pub async fn create(&self, section: Section, body: &Value) -> Result<Value, ApiError> {
        self.api.post_json(&section.path(), body, Auth::Bearer).await
    }

    pub async fn update(
        &self,
        section: Section,
        id: &str,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/{}", section.path(), id);
        self.api.put_json(&path, body, Auth::Bearer).await
    }

    pub async fn remove(&self, section: Section, id: &str) -> Result<Value, ApiError> {
        let path = format!("{}/{}", section.path(), id);
        self.api.delete(&path, Auth::Bearer).await
    }

    // ---- selection state ---------------------------------------------

    pub fn select(&self, id: impl Into<String>) {
        self.selected.lock().insert(id.into());
    }

    pub fn deselect(&self, id: &str) {
        self.selected.lock().remove(id);
    }

    pub fn selection(&self) -> Vec<String> {
        self.selected.lock().iter().cloned().collect()
    }

    pub fn clear_selection(&self) {
        self.selected.lock().clear();
    }

    /// Delete every selected item in `section`, deselecting each as it
    /// goes. Stops at the first failure, leaving the remainder selected.
    pub async fn remove_selected(&self, section: Section) -> Result<usize, ApiError> {
        let ids = self.selection();
        let mut removed = 0;
        for id in ids {
            self.remove(section, &id).await?;
            self.deselect(&id);
            removed += 1;
        }
        Ok(removed)
    }
}
