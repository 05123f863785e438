use chrono::Utc;
use pn_core::{
    Article, ArticleStore, Error, NewSavedArticle, NewsQuery, NewsResponse, Result, SavedArticle,
    SavedArticleUpdate,
};
use pn_storage::FreshnessCache;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::sources::{mock_news, NewsSource, UpstreamRequest};

/// Single entry point for article data.
///
/// Fetches go through the freshness cache, then the upstream source, falling
/// back to the mock dataset on any upstream failure. Saves and deletes go
/// through here too so they can invalidate the cache: a cached page is only
/// valid as long as the saved flags merged into it are.
pub struct FetchCoordinator {
    source: Arc<dyn NewsSource>,
    store: Arc<dyn ArticleStore>,
    cache: FreshnessCache<NewsResponse>,
}

impl FetchCoordinator {
    pub fn new(source: Arc<dyn NewsSource>, store: Arc<dyn ArticleStore>, cache_window: Duration) -> Self {
        Self {
            source,
            store,
            cache: FreshnessCache::new(cache_window),
        }
    }

    pub async fn fetch(&self, query: &NewsQuery) -> Result<NewsResponse> {
        query.validate()?;
        let key = query.cache_key();

        if let Some(cached) = self.cache.lookup(&key) {
            debug!(key = %key, "serving news from cache");
            return self.merge_saved(cached).await;
        }

        // Read before the upstream call so a save/delete landing in between
        // keeps this result out of the cache
        let generation = self.cache.generation();
        let request = UpstreamRequest::for_query(query);
        let mut news = match self.source.fetch(&request).await {
            Ok(news) => news,
            Err(e) if e.is_upstream() => {
                warn!(
                    source = self.source.name(),
                    mode = ?request.mode,
                    error = %e,
                    "upstream unavailable, serving mock articles"
                );
                mock_news()
            }
            Err(e) => {
                error!(
                    source = self.source.name(),
                    mode = ?request.mode,
                    error = %e,
                    "news source failed, serving mock articles"
                );
                mock_news()
            }
        };

        assign_ids(&mut news.articles);
        let news = self.merge_saved(news).await?;

        if !self.cache.store_if_current(generation, key.clone(), news.clone()) {
            debug!(key = %key, "saved articles changed during fetch, result not cached");
        }
        Ok(news)
    }

    pub async fn political(&self, page: u32, page_size: u32) -> Result<NewsResponse> {
        self.fetch(&NewsQuery::political(page, page_size)).await
    }

    async fn merge_saved(&self, mut news: NewsResponse) -> Result<NewsResponse> {
        for article in news.articles.iter_mut() {
            article.saved = Some(self.store.exists(&article.id).await?);
        }
        Ok(news)
    }

    pub async fn saved_articles(&self) -> Result<Vec<SavedArticle>> {
        self.store.get_all().await
    }

    pub async fn saved_article(&self, id: &str) -> Result<SavedArticle> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Saved news not found".to_string()))
    }

    pub async fn save_article(&self, body: NewSavedArticle) -> Result<SavedArticle> {
        body.validate()?;
        let record = body.into_saved(Utc::now());
        let saved = self.store.insert(record).await.map_err(|e| match e {
            Error::Conflict(_) => Error::Conflict("Article already saved".to_string()),
            other => other,
        })?;
        self.cache.clear();
        info!("💾 Saved article {}", saved.id());
        Ok(saved)
    }

    pub async fn update_article(&self, id: &str, changes: SavedArticleUpdate) -> Result<SavedArticle> {
        self.store
            .update(id, changes)
            .await?
            .ok_or_else(|| Error::NotFound("Saved news not found".to_string()))
    }

    pub async fn delete_article(&self, id: &str) -> Result<()> {
        let removed = self.store.delete(id).await?;
        self.cache.clear();
        if removed {
            info!("🗑️ Deleted saved article {}", id);
            Ok(())
        } else {
            Err(Error::NotFound("Saved news not found".to_string()))
        }
    }
}

/// Give every article without an id one derived from its URL, so the same
/// upstream article gets the same id on every fetch. Collisions inside one
/// batch get the batch position appended.
pub fn assign_ids(articles: &mut [Article]) {
    let mut seen = articles
        .iter()
        .filter(|a| !a.id.is_empty())
        .map(|a| a.id.clone())
        .collect::<HashSet<_>>();

    for (index, article) in articles.iter_mut().enumerate() {
        if !article.id.is_empty() {
            continue;
        }
        let mut hasher = Sha256::new();
        if article.url.is_empty() {
            hasher.update(article.title.as_bytes());
            hasher.update(article.published_at.to_rfc3339().as_bytes());
        } else {
            hasher.update(article.url.as_bytes());
        }
        let digest = hasher.finalize();
        let hex = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect::<String>();

        let mut id = format!("art-{}", hex);
        if seen.contains(&id) {
            id = format!("{}-{}", id, index);
        }
        seen.insert(id.clone());
        article.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use pn_core::{ArticleSource, Category};
    use pn_storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn upstream_article(n: usize) -> Article {
        Article {
            id: String::new(),
            source: ArticleSource {
                id: None,
                name: "Wire".to_string(),
            },
            author: None,
            title: format!("Story {}", n),
            description: format!("Description {}", n),
            url: format!("https://news.example/{}", n),
            url_to_image: None,
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            content: String::new(),
            category: None,
            country: None,
            saved: None,
        }
    }

    /// Upstream double that counts calls and can be switched to failing.
    struct FakeSource {
        calls: AtomicUsize,
        failing: Mutex<bool>,
        size: usize,
    }

    impl FakeSource {
        fn new(size: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failing: Mutex::new(false),
                size,
            })
        }

        fn failing() -> Arc<Self> {
            let source = Self::new(0);
            *source.failing.lock().unwrap() = true;
            source
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch(&self, _request: &UpstreamRequest) -> Result<NewsResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.failing.lock().unwrap() {
                return Err(Error::UpstreamUnavailable("connection refused".to_string()));
            }
            Ok(NewsResponse::ok((0..self.size).map(upstream_article).collect()))
        }
    }

    fn coordinator(source: Arc<FakeSource>) -> FetchCoordinator {
        FetchCoordinator::new(source, Arc::new(MemoryStorage::new()), Duration::from_secs(300))
    }

    fn save_body(article: &Article) -> NewSavedArticle {
        let mut article = article.clone();
        article.saved = None;
        NewSavedArticle { article, notes: None }
    }

    #[tokio::test]
    async fn test_identical_queries_hit_cache() {
        let source = FakeSource::new(5);
        let coordinator = coordinator(source.clone());
        let query = NewsQuery::political(1, 5);

        let first = coordinator.fetch(&query).await.unwrap();
        let second = coordinator.fetch(&query).await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(first.articles.len(), 5);
        assert!(first.articles.iter().all(|a| a.saved == Some(false)));
    }

    #[tokio::test]
    async fn test_different_tuples_miss_cache() {
        let source = FakeSource::new(2);
        let coordinator = coordinator(source.clone());

        coordinator.fetch(&NewsQuery::political(1, 5)).await.unwrap();
        coordinator.fetch(&NewsQuery::political(2, 5)).await.unwrap();
        coordinator
            .fetch(&NewsQuery {
                category: Some(Category::Business),
                ..NewsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expires_after_window() {
        let source = FakeSource::new(1);
        let coordinator = coordinator(source.clone());
        let query = NewsQuery::default();

        coordinator.fetch(&query).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        coordinator.fetch(&query).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_save_is_reflected_in_next_fetch() {
        let source = FakeSource::new(5);
        let coordinator = coordinator(source.clone());
        let query = NewsQuery::political(1, 5);

        let before = coordinator.fetch(&query).await.unwrap();
        let target = before.articles[2].clone();
        coordinator.save_article(save_body(&target)).await.unwrap();

        let after = coordinator.fetch(&query).await.unwrap();
        assert_eq!(after.articles.len(), before.articles.len());
        let ids = |news: &NewsResponse| news.articles.iter().map(|a| a.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&after), ids(&before));
        for article in &after.articles {
            assert_eq!(article.saved, Some(article.id == target.id));
        }
    }

    #[tokio::test]
    async fn test_delete_is_reflected_in_next_fetch() {
        let source = FakeSource::new(3);
        let coordinator = coordinator(source.clone());
        let query = NewsQuery::default();

        let news = coordinator.fetch(&query).await.unwrap();
        let id = news.articles[0].id.clone();
        coordinator.save_article(save_body(&news.articles[0])).await.unwrap();
        assert_eq!(coordinator.fetch(&query).await.unwrap().articles[0].saved, Some(true));

        coordinator.delete_article(&id).await.unwrap();
        assert_eq!(coordinator.fetch(&query).await.unwrap().articles[0].saved, Some(false));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_upstream_failure_serves_mock() {
        let source = FakeSource::failing();
        let coordinator = coordinator(source.clone());

        let news = coordinator.fetch(&NewsQuery::political(1, 5)).await.unwrap();
        assert_eq!(news.status, "ok");
        assert!(!news.articles.is_empty());
        assert!(news.articles.iter().all(|a| a.id.starts_with("mock-")));
    }

    /// Source that fails with something other than an upstream error.
    struct BrokenSource;

    #[async_trait]
    impl NewsSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self, _request: &UpstreamRequest) -> Result<NewsResponse> {
            Err(Error::Config("bad source configuration".to_string()))
        }
    }

    #[tokio::test]
    async fn test_any_source_error_serves_mock() {
        let err = Error::Config("x".to_string());
        assert!(!err.is_upstream());

        let coordinator = FetchCoordinator::new(
            Arc::new(BrokenSource),
            Arc::new(MemoryStorage::new()),
            Duration::from_secs(300),
        );
        let news = coordinator.political(1, 10).await.unwrap();
        let ids: Vec<_> = news.articles.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["mock-1", "mock-2", "mock-3"]);
    }

    #[tokio::test]
    async fn test_mock_articles_can_be_saved() {
        let coordinator = coordinator(FakeSource::failing());
        let query = NewsQuery::default();

        let news = coordinator.fetch(&query).await.unwrap();
        coordinator.save_article(save_body(&news.articles[1])).await.unwrap();

        let news = coordinator.fetch(&query).await.unwrap();
        assert_eq!(news.articles[1].saved, Some(true));
        assert_eq!(news.articles[0].saved, Some(false));
    }

    #[tokio::test]
    async fn test_save_conflict() {
        let coordinator = coordinator(FakeSource::new(1));
        let article = coordinator.fetch(&NewsQuery::default()).await.unwrap().articles[0].clone();

        let first = coordinator.save_article(save_body(&article)).await.unwrap();
        assert_eq!(first.article.saved, Some(true));
        let err = coordinator.save_article(save_body(&article)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(coordinator.saved_articles().await.unwrap(), vec![first]);
    }

    #[tokio::test]
    async fn test_update_and_missing_ids() {
        let coordinator = coordinator(FakeSource::new(1));
        let article = coordinator.fetch(&NewsQuery::default()).await.unwrap().articles[0].clone();
        let saved = coordinator.save_article(save_body(&article)).await.unwrap();

        let updated = coordinator
            .update_article(saved.id(), SavedArticleUpdate::notes("x"))
            .await
            .unwrap();
        assert_eq!(updated.notes.as_deref(), Some("x"));
        assert_eq!(updated.saved_at, saved.saved_at);

        assert!(matches!(
            coordinator.update_article("missing", SavedArticleUpdate::notes("x")).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(coordinator.saved_article("missing").await, Err(Error::NotFound(_))));
        assert!(matches!(coordinator.delete_article("missing").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_query_rejected() {
        let source = FakeSource::new(1);
        let coordinator = coordinator(source.clone());
        let err = coordinator.fetch(&NewsQuery::political(0, 5)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn test_assign_ids_is_deterministic() {
        let mut first = (0..3).map(upstream_article).collect::<Vec<_>>();
        let mut second = first.clone();
        assign_ids(&mut first);
        assign_ids(&mut second);

        assert_eq!(first, second);
        assert!(first.iter().all(|a| a.id.starts_with("art-")));
        let unique = first.iter().map(|a| &a.id).collect::<HashSet<_>>();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_assign_ids_keeps_existing_and_disambiguates() {
        let mut articles = vec![upstream_article(1), upstream_article(1), upstream_article(2)];
        articles[2].id = "given".to_string();
        assign_ids(&mut articles);

        assert_eq!(articles[2].id, "given");
        assert_ne!(articles[0].id, articles[1].id);
        assert!(articles[1].id.ends_with("-1"));
    }
}
