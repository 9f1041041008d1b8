//! Durable session storage.
//!
//! Holds the signed-in user's profile and bearer token as two files under
//! the configured data directory, mirroring the mobile app's two storage
//! keys. The store is the only writer of these files: login and
//! registration commit them, logout clears them, and a rejected token
//! (HTTP 401) forces a clear.
//!
//! `restore` never fails outward: unreadable or corrupted state is
//! reported through logging and treated as "no session". `commit` is
//! atomic from the caller's point of view: if either half cannot be
//! written the store ends up cleared, never half-populated.

use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::api::models::UserProfile;

const USER_FILE: &str = "user.json";
const TOKEN_FILE: &str = "access_token";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
}

pub struct SessionStore {
    user_path: PathBuf,
    token_path: PathBuf,
    current: RwLock<Session>,
}

impl SessionStore {
    /// Open the store rooted at `data_dir` and load any persisted session.
    pub fn open(data_dir: &Path) -> Self {
        let user_path = data_dir.join(USER_FILE);
        let token_path = data_dir.join(TOKEN_FILE);
        let current = read_session(&user_path, &token_path);
        Self {
            user_path,
            token_path,
            current: RwLock::new(current),
        }
    }

    /// Re-read the persisted session, replacing the in-memory copy.
    ///
    /// Equivalent to what happens at process start; corrupted or missing
    /// storage yields an empty session rather than an error.
    pub fn restore(&self) -> Session {
        let session = read_session(&self.user_path, &self.token_path);
        *self.current.write() = session.clone();
        session
    }

    /// Persist a user/token pair, replacing any prior session.
    ///
    /// If either half cannot be written the store is cleared and the
    /// error returned, so observers see "committed" or "cleared", never
    /// a partial session.
    pub fn commit(&self, user: &UserProfile, token: &str) -> Result<()> {
        match self.write_pair(user, token) {
            Ok(()) => {
                *self.current.write() = Session {
                    user: Some(user.clone()),
                    token: Some(token.to_string()),
                };
                Ok(())
            }
            Err(err) => {
                self.clear();
                Err(err)
            }
        }
    }

    /// Remove both persisted halves. Idempotent; never fails outward.
    pub fn clear(&self) {
        remove_quietly(&self.user_path);
        remove_quietly(&self.token_path);
        *self.current.write() = Session::default();
    }

    pub fn is_authenticated(&self) -> bool {
        let session = self.current.read();
        session.user.is_some() && session.token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.current.read().user.clone()
    }

    /// Rewrite the persisted profile after a refresh, keeping the token.
    ///
    /// No-op when signed out; the profile endpoint is unreachable then
    /// anyway.
    pub fn update_user(&self, user: &UserProfile) -> Result<()> {
        if !self.is_authenticated() {
            return Ok(());
        }
        let body = serde_json::to_vec_pretty(user).context("Failed to serialize profile")?;
        write_atomic(&self.user_path, &body)?;
        self.current.write().user = Some(user.clone());
        Ok(())
    }

    fn write_pair(&self, user: &UserProfile, token: &str) -> Result<()> {
        let dir = self
            .user_path
            .parent()
            .context("Session path has no parent directory")?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;

        let body = serde_json::to_vec_pretty(user).context("Failed to serialize profile")?;
        write_atomic(&self.user_path, &body)?;
        write_atomic(&self.token_path, token.as_bytes())?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .context("Session path has no parent directory")?;
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to persist {}", path.display()))?;
    Ok(())
}

fn remove_quietly(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %err, "Failed to remove session file");
        }
    }
}

fn read_session(user_path: &Path, token_path: &Path) -> Session {
    let token = match std::fs::read_to_string(token_path) {
        Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
        Ok(_) => None,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, "Failed to read stored token, treating as signed out");
            }
            None
        }
    };

    let user = match std::fs::read(user_path) {
        Ok(bytes) => match serde_json::from_slice::<UserProfile>(&bytes) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "Stored profile is corrupted, treating as signed out");
                None
            }
        },
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, "Failed to read stored profile, treating as signed out");
            }
            None
        }
    };

    // Half-written state counts as no session at all.
    match (user, token) {
        (Some(user), Some(token)) => Session {
            user: Some(user),
            token: Some(token),
        },
        _ => Session::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> UserProfile {
        serde_json::from_value(json!({
            "_id": "u-1",
            "nom": "Ouedraogo",
            "prenom": "Awa",
            "email": "awa@example.bf",
            "telephone": "+22670000000",
            "points": 100,
            "favorites": ["eSApphrRKWg"]
        }))
        .unwrap()
    }

    #[test]
    fn empty_dir_restores_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        let session = store.restore();
        assert!(session.user.is_none());
        assert!(session.token.is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn commit_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.commit(&sample_user(), "tok123").unwrap();

        let reopened = SessionStore::open(dir.path());
        let session = reopened.restore();
        assert_eq!(session.user.unwrap().prenom, "Awa");
        assert_eq!(session.token.unwrap(), "tok123");
        assert!(reopened.is_authenticated());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.commit(&sample_user(), "tok123").unwrap();

        store.clear();
        assert!(!store.is_authenticated());
        store.clear();
        assert!(!store.is_authenticated());
        assert!(store.restore().user.is_none());
    }

    #[test]
    fn corrupted_profile_restores_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.commit(&sample_user(), "tok123").unwrap();

        std::fs::write(dir.path().join(USER_FILE), b"{ not json").unwrap();
        let session = store.restore();
        assert!(session.user.is_none());
        assert!(session.token.is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn token_alone_is_not_a_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), b"orphan").unwrap();
        let store = SessionStore::open(dir.path());
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[test]
    fn failed_commit_leaves_store_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.commit(&sample_user(), "tok123").unwrap();

        // A data dir that is actually a file makes every write fail.
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"").unwrap();
        let broken = SessionStore::open(&blocked);
        assert!(broken.commit(&sample_user(), "tok456").is_err());
        assert!(!broken.is_authenticated());
        assert!(broken.restore().token.is_none());
    }

    #[test]
    fn update_user_keeps_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.commit(&sample_user(), "tok123").unwrap();

        let mut refreshed = sample_user();
        refreshed.points = 150;
        store.update_user(&refreshed).unwrap();

        let reopened = SessionStore::open(dir.path());
        let session = reopened.restore();
        assert_eq!(session.user.unwrap().points, 150);
        assert_eq!(session.token.unwrap(), "tok123");
    }

    #[test]
    fn update_user_is_a_noop_when_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path());
        store.update_user(&sample_user()).unwrap();
        assert!(!store.is_authenticated());
        assert!(!dir.path().join(USER_FILE).exists());
    }
}
