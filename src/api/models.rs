//! Wire types for the LCA TV backend.
//!
//! Field names follow the backend's JSON verbatim, including the French
//! profile fields (`nom`, `prenom`, `telephone`) and the Mongo-style
//! `_id` on user documents.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered viewer, as returned by the auth and profile endpoints.
///
/// The server is the source of truth; this is a cached copy that may
/// drift until the next profile refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    #[serde(default)]
    pub points: u64,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// A channel video. Counts arrive pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
    pub category: String,
    pub view_count: String,
    pub like_count: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default = "default_channel_title")]
    pub channel_title: String,
}

fn default_channel_title() -> String {
    "LCA TV".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
    pub published_at: NaiveDateTime,
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    "LCA TV".to_string()
}

/// A program category. The icon key maps to a rendering asset in the
/// presentation layer; the client carries it as opaque data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub is_live: bool,
    pub stream_url: String,
    pub title: String,
    pub viewers: u64,
    pub started_at: String,
}

// Auth bodies

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub telephone: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_cgu: bool,
    pub newsletter: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Body of a successful engagement call (favorite add/remove, watch).
#[derive(Debug, Deserialize)]
pub struct EngagementReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub points_earned: Option<u64>,
}
