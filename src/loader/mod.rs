//! Collection loading with graceful degradation.
//!
//! Every read endpoint resolves to data: live server content when the
//! request succeeds, the registered fallback dataset otherwise. Read
//! failures never propagate to callers; only auth-gated endpoints can
//! report that a session is missing or was rejected.
//!
//! Concurrent loads of the same collection (pull-to-refresh racing a
//! background load) are ordered with a per-endpoint sequence number:
//! each request is tagged when issued, and a completion is applied to
//! the consuming cache only if it is still the latest issued for that
//! endpoint. Stale completions are discarded.

pub mod fallback;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::debug;

use crate::api::client::{ApiClient, Auth};
use crate::api::error::ApiError;
use crate::api::models::{Category, LiveStatus, NewsArticle, UserProfile, Video};

/// Where a collection's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback,
}

/// A loaded collection. An empty live list is valid and distinct from
/// fallback content.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub source: DataSource,
}

impl<T> Loaded<T> {
    fn live(items: Vec<T>) -> Self {
        Self {
            items,
            source: DataSource::Live,
        }
    }

    fn fallback(items: Vec<T>) -> Self {
        Self {
            items,
            source: DataSource::Fallback,
        }
    }
}

/// A loaded single value with its provenance.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub source: DataSource,
}

/// Result of a cache refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was the latest issued and now backs the cache.
    Applied(DataSource),
    /// A newer request was issued while this one was in flight; the
    /// response was dropped.
    Discarded,
}

/// Per-screen collection state. Created empty on mount, discarded with
/// the screen; never persisted.
pub struct CollectionCache<T> {
    inner: Mutex<CacheState<T>>,
}

struct CacheState<T> {
    items: Vec<T>,
    source: Option<DataSource>,
    is_loading: bool,
    applied_seq: u64,
}

impl<T: Clone> CollectionCache<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CacheState {
                items: Vec::new(),
                source: None,
                is_loading: false,
                applied_seq: 0,
            }),
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.lock().items.clone()
    }

    pub fn source(&self) -> Option<DataSource> {
        self.inner.lock().source
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading
    }

    fn mark_loading(&self) {
        self.inner.lock().is_loading = true;
    }

    fn finish_loading(&self) {
        self.inner.lock().is_loading = false;
    }

    fn apply(&self, seq: u64, loaded: Loaded<T>) {
        let mut state = self.inner.lock();
        // Never roll back to an older snapshot.
        if seq <= state.applied_seq {
            return;
        }
        state.items = loaded.items;
        state.source = Some(loaded.source);
        state.is_loading = false;
        state.applied_seq = seq;
    }
}

impl<T: Clone> Default for CollectionCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ResourceLoader {
    api: ApiClient,
    issued: DashMap<String, u64>,
}

impl ResourceLoader {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            issued: DashMap::new(),
        }
    }

    // ---- one-shot loads ----------------------------------------------

    pub async fn videos(&self, category: Option<&str>) -> Loaded<Video> {
        let path = match category {
            Some(c) => format!("/api/videos?category={}", c),
            None => "/api/videos".to_string(),
        };
        match self.api.get::<VideosEnvelope>(&path, Auth::Public).await {
            Ok(body) => Loaded::live(body.videos),
            Err(err) => {
                debug!(error = %err, "Video listing failed, serving fallback");
                Loaded::fallback(match category {
                    Some(c) => fallback::videos_in_category(c),
                    None => fallback::videos(),
                })
            }
        }
    }

    pub async fn featured(&self, limit: usize) -> Loaded<Video> {
        let path = format!("/api/videos/featured?limit={}", limit);
        match self.api.get::<VideosEnvelope>(&path, Auth::Public).await {
            Ok(body) => Loaded::live(body.videos),
            Err(err) => {
                debug!(error = %err, "Featured listing failed, serving fallback");
                let mut items = fallback::videos();
                items.truncate(limit);
                Loaded::fallback(items)
            }
        }
    }

    /// Look up a single video. A live 404 is `None`; when the backend is
    /// unreachable the canonical list answers instead.
    pub async fn video(&self, id: &str) -> Option<Video> {
        let path = format!("/api/videos/{}", id);
        match self.api.get::<VideoEnvelope>(&path, Auth::Public).await {
            Ok(body) => Some(body.video),
            Err(ApiError::Validation { .. }) => None,
            Err(err) => {
                debug!(error = %err, "Video lookup failed, consulting fallback");
                fallback::video_by_id(id)
            }
        }
    }

    pub async fn news(&self, category: Option<&str>) -> Loaded<NewsArticle> {
        let path = match category {
            Some(c) => format!("/api/news?category={}", c),
            None => "/api/news".to_string(),
        };
        match self.api.get::<NewsEnvelope>(&path, Auth::Public).await {
            Ok(body) => Loaded::live(body.news),
            Err(err) => {
                debug!(error = %err, "News listing failed, serving fallback");
                Loaded::fallback(match category {
                    Some(c) => fallback::news_in_category(c),
                    None => fallback::news(),
                })
            }
        }
    }

    /// Look up a single news article; same degradation as [`Self::video`].
    pub async fn article(&self, id: &str) -> Option<NewsArticle> {
        let path = format!("/api/news/{}", id);
        match self.api.get::<ArticleEnvelope>(&path, Auth::Public).await {
            Ok(body) => Some(body.article),
            Err(ApiError::Validation { .. }) => None,
            Err(err) => {
                debug!(error = %err, "Article lookup failed, consulting fallback");
                fallback::article_by_id(id)
            }
        }
    }

    pub async fn categories(&self) -> Loaded<Category> {
        match self
            .api
            .get::<CategoriesEnvelope>("/api/categories", Auth::Public)
            .await
        {
            Ok(body) => Loaded::live(body.categories),
            Err(err) => {
                debug!(error = %err, "Category listing failed, serving fallback");
                Loaded::fallback(fallback::categories())
            }
        }
    }

    pub async fn live_status(&self) -> Fetched<LiveStatus> {
        match self
            .api
            .get::<LiveStatus>("/api/live/status", Auth::Public)
            .await
        {
            Ok(value) => Fetched {
                value,
                source: DataSource::Live,
            },
            Err(err) => {
                debug!(error = %err, "Live status failed, serving fallback");
                Fetched {
                    value: fallback::live_status(),
                    source: DataSource::Fallback,
                }
            }
        }
    }

    /// The signed-in user's favorite videos. A guest must never see demo
    /// content here, so the fallback is the empty list; a missing or
    /// rejected session propagates so the caller can redirect to login.
    pub async fn favorites(&self) -> Result<Loaded<Video>, ApiError> {
        match self
            .api
            .get::<FavoritesEnvelope>("/api/user/favorites", Auth::Bearer)
            .await
        {
            Ok(body) => Ok(Loaded::live(body.favorites)),
            Err(err @ (ApiError::AuthRequired | ApiError::AuthRejected)) => Err(err),
            Err(err) => {
                debug!(error = %err, "Favorites listing failed, serving empty fallback");
                Ok(Loaded::fallback(Vec::new()))
            }
        }
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.api.get("/api/user/profile", Auth::Bearer).await
    }

    // ---- cache refreshes (last issued request wins) ------------------

    pub async fn refresh_videos(
        &self,
        cache: &CollectionCache<Video>,
        category: Option<&str>,
    ) -> RefreshOutcome {
        let key = collection_key("videos", category);
        let seq = self.begin(&key, cache);
        let loaded = self.videos(category).await;
        self.finish(&key, seq, cache, loaded)
    }

    pub async fn refresh_news(
        &self,
        cache: &CollectionCache<NewsArticle>,
        category: Option<&str>,
    ) -> RefreshOutcome {
        let key = collection_key("news", category);
        let seq = self.begin(&key, cache);
        let loaded = self.news(category).await;
        self.finish(&key, seq, cache, loaded)
    }

    pub async fn refresh_categories(&self, cache: &CollectionCache<Category>) -> RefreshOutcome {
        let seq = self.begin("categories", cache);
        let loaded = self.categories().await;
        self.finish("categories", seq, cache, loaded)
    }

    pub async fn refresh_favorites(
        &self,
        cache: &CollectionCache<Video>,
    ) -> Result<RefreshOutcome, ApiError> {
        let seq = self.begin("favorites", cache);
        match self.favorites().await {
            Ok(loaded) => Ok(self.finish("favorites", seq, cache, loaded)),
            Err(err) => {
                if self.latest("favorites") == seq {
                    cache.finish_loading();
                }
                Err(err)
            }
        }
    }

    fn begin<T: Clone>(&self, key: &str, cache: &CollectionCache<T>) -> u64 {
        let mut entry = self.issued.entry(key.to_string()).or_insert(0);
        *entry += 1;
        let seq = *entry;
        drop(entry);
        cache.mark_loading();
        seq
    }

    fn finish<T: Clone>(
        &self,
        key: &str,
        seq: u64,
        cache: &CollectionCache<T>,
        loaded: Loaded<T>,
    ) -> RefreshOutcome {
        if self.latest(key) != seq {
            debug!(key, seq, "Discarding stale response");
            return RefreshOutcome::Discarded;
        }
        let source = loaded.source;
        cache.apply(seq, loaded);
        RefreshOutcome::Applied(source)
    }

    fn latest(&self, key: &str) -> u64 {
        self.issued.get(key).map(|seq| *seq).unwrap_or(0)
    }
}

fn collection_key(name: &str, category: Option<&str>) -> String {
    match category {
        Some(c) => format!("{}:{}", name, c),
        None => name.to_string(),
    }
}

// Response envelopes

#[derive(Debug, Deserialize)]
struct VideosEnvelope {
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct VideoEnvelope {
    video: Video,
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    news: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct ArticleEnvelope {
    article: NewsArticle,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct FavoritesEnvelope {
    favorites: Vec<Video>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    use crate::config::ApiConfig;
    use crate::session::SessionStore;

    fn loader_for(base_url: String) -> (ResourceLoader, Arc<SessionStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::open(dir.path()));
        let config = ApiConfig {
            base_url,
            timeout_secs: 2,
        };
        let api = ApiClient::new(&config, session.clone()).unwrap();
        (ResourceLoader::new(api), session, dir)
    }

    /// Nothing listens here; every request fails fast.
    fn offline_loader() -> (ResourceLoader, Arc<SessionStore>, tempfile::TempDir) {
        loader_for("http://127.0.0.1:9".to_string())
    }

    fn sample_user() -> UserProfile {
        serde_json::from_value(json!({
            "_id": "u-1",
            "nom": "Ouedraogo",
            "prenom": "Awa",
            "email": "awa@example.bf",
            "telephone": "+22670000000",
            "points": 100,
            "favorites": []
        }))
        .unwrap()
    }

    fn wire_video(id: &str, title: &str, category: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "description": "",
            "thumbnail": format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
            "published_at": "2025-01-01T12:00:00Z",
            "category": category,
            "view_count": "10",
            "like_count": "1",
            "duration": "1:00",
            "channel_title": "LCA TV"
        })
    }

    #[tokio::test]
    async fn offline_videos_serve_the_exact_fallback_every_time() {
        let (loader, _session, _dir) = offline_loader();

        let first = loader.videos(None).await;
        let second = loader.videos(None).await;

        assert_eq!(first.source, DataSource::Fallback);
        assert_eq!(first.items, fallback::videos());
        assert_eq!(second.items, fallback::videos());

        let news = loader.news(None).await;
        assert_eq!(news.source, DataSource::Fallback);
        assert_eq!(news.items, fallback::news());
    }

    #[tokio::test]
    async fn offline_category_filter_applies_to_fallback() {
        let (loader, _session, _dir) = offline_loader();
        let sport = loader.videos(Some("sport")).await;
        assert_eq!(sport.source, DataSource::Fallback);
        assert_eq!(sport.items.len(), 1);
        assert_eq!(sport.items[0].id, "R2EocmxeJ5Q");
    }

    #[tokio::test]
    async fn live_content_wins_over_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/videos");
            then.status(200)
                .json_body(json!({"videos": [wire_video("abc", "Journal", "actualites")]}));
        });

        let (loader, _session, _dir) = loader_for(server.base_url());
        let loaded = loader.videos(None).await;
        assert_eq!(loaded.source, DataSource::Live);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].id, "abc");
    }

    #[tokio::test]
    async fn empty_live_list_is_not_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/videos");
            then.status(200).json_body(json!({"videos": []}));
        });

        let (loader, _session, _dir) = loader_for(server.base_url());
        let loaded = loader.videos(None).await;
        assert_eq!(loaded.source, DataSource::Live);
        assert!(loaded.items.is_empty());
    }

    #[tokio::test]
    async fn server_error_serves_fallback() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/categories");
            then.status(500).body("boom");
        });

        let (loader, _session, _dir) = loader_for(server.base_url());
        let loaded = loader.categories().await;
        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(loaded.items, fallback::categories());
    }

    #[tokio::test]
    async fn favorites_without_session_never_hit_the_network() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/user/favorites");
            then.status(200).json_body(json!({"favorites": []}));
        });

        let (loader, _session, _dir) = loader_for(server.base_url());
        let result = loader.favorites().await;
        assert!(matches!(result, Err(ApiError::AuthRequired)));
        assert_eq!(mock.hits(), 0);
    }

    #[tokio::test]
    async fn favorites_401_clears_session_then_gates_locally() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/user/favorites");
            then.status(401)
                .json_body(json!({"detail": "Could not validate credentials"}));
        });

        let (loader, session, _dir) = loader_for(server.base_url());
        session.commit(&sample_user(), "stale").unwrap();

        let first = loader.favorites().await;
        assert!(matches!(first, Err(ApiError::AuthRejected)));
        assert!(!session.is_authenticated());
        assert_eq!(mock.hits(), 1);

        // The cleared session short-circuits before any further I/O.
        let second = loader.favorites().await;
        assert!(matches!(second, Err(ApiError::AuthRequired)));
        assert_eq!(mock.hits(), 1);
    }

    #[tokio::test]
    async fn favorites_network_failure_degrades_to_empty_list() {
        let (loader, session, _dir) = offline_loader();
        session.commit(&sample_user(), "tok123").unwrap();

        let loaded = loader.favorites().await.unwrap();
        assert_eq!(loaded.source, DataSource::Fallback);
        assert!(loaded.items.is_empty());
        // Network trouble is not an auth problem.
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let (loader, _session, _dir) = offline_loader();
        let cache: CollectionCache<Video> = CollectionCache::new();

        let first = loader.begin("videos", &cache);
        let second = loader.begin("videos", &cache);

        // Second request completes first; the older completion must not
        // overwrite it, whatever the arrival order.
        let newer = Loaded::live(vec![fallback::videos()[1].clone()]);
        let older = Loaded::live(vec![fallback::videos()[0].clone()]);

        assert_eq!(
            loader.finish("videos", second, &cache, newer),
            RefreshOutcome::Applied(DataSource::Live)
        );
        assert_eq!(
            loader.finish("videos", first, &cache, older),
            RefreshOutcome::Discarded
        );

        let items = cache.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, fallback::videos()[1].id);
        assert!(!cache.is_loading());

        // A completion is stale as soon as a newer request is issued,
        // whichever finishes first.
        let third = loader.begin("videos", &cache);
        let fourth = loader.begin("videos", &cache);
        assert_eq!(
            loader.finish("videos", third, &cache, Loaded::live(Vec::new())),
            RefreshOutcome::Discarded
        );
        assert_eq!(
            loader.finish(
                "videos",
                fourth,
                &cache,
                Loaded::live(vec![fallback::videos()[2].clone()])
            ),
            RefreshOutcome::Applied(DataSource::Live)
        );
        assert_eq!(cache.items()[0].id, fallback::videos()[2].id);
    }

    #[tokio::test]
    async fn refresh_applies_to_the_cache() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/videos").query_param("category", "sport");
            then.status(200)
                .json_body(json!({"videos": [wire_video("m1", "Match", "sport")]}));
        });

        let (loader, _session, _dir) = loader_for(server.base_url());
        let cache = CollectionCache::new();
        let outcome = loader.refresh_videos(&cache, Some("sport")).await;

        assert_eq!(outcome, RefreshOutcome::Applied(DataSource::Live));
        assert_eq!(cache.source(), Some(DataSource::Live));
        assert_eq!(cache.items().len(), 1);
        assert!(!cache.is_loading());
    }

    #[tokio::test]
    async fn unknown_video_offline_is_none() {
        let (loader, _session, _dir) = offline_loader();
        assert!(loader.video("nope").await.is_none());
        let known = loader.video("eSApphrRKWg").await.unwrap();
        assert_eq!(known.category, "actualites");
    }

    #[tokio::test]
    async fn article_lookup_degrades_like_videos() {
        let (loader, _session, _dir) = offline_loader();
        assert!(loader.article("nope").await.is_none());
        let known = loader.article("news-sport-etalons").await.unwrap();
        assert_eq!(known.category, "sport");

        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/news/n-404");
            then.status(404).json_body(json!({"detail": "Article non trouvé"}));
        });
        let (live, _session, _dir) = loader_for(server.base_url());
        assert!(live.article("n-404").await.is_none());
    }
}
