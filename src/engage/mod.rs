//! Optimistic engagement actions: favorite toggling and watch tracking.
//!
//! Each attempt flips the local profile state first, fires the REST
//! call, then reconciles: a 2xx keeps the flip and merges the server's
//! `points_earned`; anything else restores the exact prior state and
//! reports a rolled-back outcome. A second attempt on the same relation
//! while one is in flight is refused, so a rapid double-tap cannot leave
//! interleaved flips behind. Without a session nothing is touched at
//! all.

use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::client::{ApiClient, Auth};
use crate::api::error::ApiError;
use crate::api::models::{EngagementReceipt, UserProfile};
use crate::session::SessionStore;

/// Points the backend grants per recorded watch; shown optimistically
/// and reconciled against the response.
const WATCH_POINTS_HINT: u64 = 2;

/// Terminal result of one engagement attempt.
#[derive(Debug)]
pub enum Outcome {
    /// Server accepted; local state kept, points merged.
    Confirmed { points_earned: u64 },
    /// Server refused or was unreachable; local state restored exactly.
    RolledBack { error: ApiError },
    /// No session; nothing was changed or sent.
    AuthRequired,
    /// The same relation already has an attempt in flight.
    InFlight,
}

/// In-memory favorites and points, seeded from the cached profile.
///
/// This is the screen-facing state the optimistic flips act on; the
/// persisted profile only catches up on the next refresh.
#[derive(Default)]
pub struct ProfileState {
    inner: RwLock<StateInner>,
}

#[derive(Debug, Clone, Default)]
struct StateInner {
    favorites: BTreeSet<String>,
    points: u64,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_user(user: &UserProfile) -> Self {
        let state = Self::new();
        state.sync(user);
        state
    }

    /// Replace local state with a server-fresh profile.
    pub fn sync(&self, user: &UserProfile) {
        let mut inner = self.inner.write();
        inner.favorites = user.favorites.iter().cloned().collect();
        inner.points = user.points;
    }

    pub fn reset(&self) {
        *self.inner.write() = StateInner::default();
    }

    pub fn is_favorite(&self, video_id: &str) -> bool {
        self.inner.read().favorites.contains(video_id)
    }

    pub fn favorites(&self) -> Vec<String> {
        self.inner.read().favorites.iter().cloned().collect()
    }

    pub fn points(&self) -> u64 {
        self.inner.read().points
    }

    fn insert_favorite(&self, video_id: &str) {
        self.inner.write().favorites.insert(video_id.to_string());
    }

    fn remove_favorite(&self, video_id: &str) {
        self.inner.write().favorites.remove(video_id);
    }

    fn adjust_points(&self, delta: i64) {
        let mut inner = self.inner.write();
        inner.points = inner.points.saturating_add_signed(delta);
    }
}

pub struct Engagement {
    api: ApiClient,
    session: Arc<SessionStore>,
    profile: Arc<ProfileState>,
    pending: Mutex<HashSet<String>>,
}

impl Engagement {
    pub fn new(api: ApiClient, session: Arc<SessionStore>, profile: Arc<ProfileState>) -> Self {
        Self {
            api,
            session,
            profile,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Add or remove a favorite, depending on current membership.
    pub async fn toggle_favorite(&self, video_id: &str) -> Outcome {
        if !self.session.is_authenticated() {
            return Outcome::AuthRequired;
        }
        let Some(_guard) = PendingGuard::acquire(&self.pending, format!("favorite:{}", video_id))
        else {
            return Outcome::InFlight;
        };

        let was_favorite = self.profile.is_favorite(video_id);
        if was_favorite {
            self.profile.remove_favorite(video_id);
        } else {
            self.profile.insert_favorite(video_id);
        }

        let path = format!("/api/user/favorites/{}", video_id);
        let result: Result<EngagementReceipt, ApiError> = if was_favorite {
            self.api.delete(&path, Auth::Bearer).await
        } else {
            self.api.post(&path, Auth::Bearer).await
        };

        match result {
            Ok(receipt) => {
                let points_earned = receipt.points_earned.unwrap_or(0);
                if points_earned > 0 {
                    self.profile.adjust_points(points_earned as i64);
                }
                debug!(video_id, points_earned, "Favorite change confirmed");
                Outcome::Confirmed { points_earned }
            }
            Err(error) => {
                if was_favorite {
                    self.profile.insert_favorite(video_id);
                } else {
                    self.profile.remove_favorite(video_id);
                }
                warn!(video_id, error = %error, "Favorite change rolled back");
                Outcome::RolledBack { error }
            }
        }
    }

    /// Record a watch event for points.
    pub async fn record_watch(&self, video_id: &str) -> Outcome {
        if !self.session.is_authenticated() {
            return Outcome::AuthRequired;
        }
        let Some(_guard) = PendingGuard::acquire(&self.pending, format!("watch:{}", video_id))
        else {
            return Outcome::InFlight;
        };

        self.profile.adjust_points(WATCH_POINTS_HINT as i64);

        let path = format!("/api/user/watch-video/{}", video_id);
        match self.api.post::<EngagementReceipt>(&path, Auth::Bearer).await {
            Ok(receipt) => {
                let points_earned = receipt.points_earned.unwrap_or(0);
                // Replace the optimistic hint with the server's figure.
                self.profile
                    .adjust_points(points_earned as i64 - WATCH_POINTS_HINT as i64);
                debug!(video_id, points_earned, "Watch recorded");
                Outcome::Confirmed { points_earned }
            }
            Err(error) => {
                self.profile.adjust_points(-(WATCH_POINTS_HINT as i64));
                warn!(video_id, error = %error, "Watch tracking rolled back");
                Outcome::RolledBack { error }
            }
        }
    }
}

/// Marks a relation as having an attempt in flight; released on drop.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> PendingGuard<'a> {
    fn acquire(pending: &'a Mutex<HashSet<String>>, key: String) -> Option<Self> {
        if pending.lock().insert(key.clone()) {
            Some(Self { pending, key })
        } else {
            None
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}
