//! HTTP client for the LCA TV backend.
//!
//! Wraps `reqwest` with the base URL and bounded timeout from
//! configuration, attaches the stored bearer token when a call requires
//! it, and classifies non-2xx responses into [`ApiError`] kinds. A 401 on
//! an authenticated call clears the stored session as a side effect,
//! since a rejected token means the cached session is stale.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::api::error::{ApiError, ErrorDetail};
use crate::config::ApiConfig;
use crate::session::SessionStore;

/// Whether a call must carry the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Public,
    Bearer,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        self.send(Method::GET, path, None, auth).await
    }

    /// POST with an empty body (the engagement endpoints take none).
    pub async fn post<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        self.send(Method::POST, path, None, auth).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(body), auth).await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        self.send(Method::PUT, path, Some(body), auth).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, auth: Auth) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, None, auth).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: Auth,
    ) -> Result<T, ApiError> {
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));

        if auth == Auth::Bearer {
            // Short-circuit before any network I/O so callers can redirect
            // to login deterministically.
            match self.session.token() {
                Some(token) => {
                    request = request.header("Authorization", format!("Bearer {}", token));
                }
                None => return Err(ApiError::AuthRequired),
            }
        }

        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let bytes = response.bytes().await.unwrap_or_default();
        Err(self.classify(status, &bytes, auth))
    }

    fn classify(&self, status: StatusCode, body: &[u8], auth: Auth) -> ApiError {
        if status == StatusCode::UNAUTHORIZED && auth == Auth::Bearer {
            warn!("Bearer token rejected, clearing stored session");
            self.session.clear();
            return ApiError::AuthRejected;
        }

        if status.is_client_error() {
            let detail = serde_json::from_slice::<ErrorDetail>(body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| format!("request failed with status {}", status));
            return ApiError::Validation { detail };
        }

        ApiError::Server {
            status: status.as_u16(),
        }
    }
}
