pub mod admin;
pub mod api;
pub mod cli;
pub mod config;
pub mod engage;
pub mod loader;
pub mod session;

use std::sync::Arc;
use tracing::warn;

use crate::admin::AdminConsole;
use crate::api::auth;
use crate::api::models::{LoginRequest, RegisterRequest, UserProfile};
use crate::api::{ApiClient, ApiError};
use crate::config::Config;
use crate::engage::{Engagement, ProfileState};
use crate::loader::ResourceLoader;
use crate::session::SessionStore;

/// Aggregate client state: one instance wires the session store, HTTP
/// client, loaders, engagement actions, and admin console together.
pub struct LcaTv {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub loader: ResourceLoader,
    pub engagement: Engagement,
    pub admin: AdminConsole,
    pub profile: Arc<ProfileState>,
}

impl LcaTv {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::open(&config.storage.data_dir));
        let api = ApiClient::new(&config.api, session.clone())?;

        let profile = Arc::new(match session.user() {
            Some(user) => ProfileState::from_user(&user),
            None => ProfileState::new(),
        });

        let loader = ResourceLoader::new(api.clone());
        let engagement = Engagement::new(api.clone(), session.clone(), profile.clone());
        let admin = AdminConsole::new(api.clone());

        Ok(Self {
            config,
            session,
            api,
            loader,
            engagement,
            admin,
            profile,
        })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<UserProfile, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
        };
        let user = auth::login(&self.api, &self.session, &request).await?;
        self.profile.sync(&user);
        Ok(user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let user = auth::register(&self.api, &self.session, request).await?;
        self.profile.sync(&user);
        Ok(user)
    }

    pub fn logout(&self) {
        self.session.clear();
        self.profile.reset();
    }

    /// Re-fetch the profile, refresh the in-memory state, and rewrite
    /// the persisted copy so a restart sees fresh data.
    pub async fn refresh_profile(&self) -> Result<UserProfile, ApiError> {
        let user = self.loader.profile().await?;
        if let Err(err) = self.session.update_user(&user) {
            warn!(error = %err, "Failed to persist refreshed profile");
        }
        self.profile.sync(&user);
        Ok(user)
    }
}
