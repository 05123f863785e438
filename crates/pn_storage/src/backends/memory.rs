use async_trait::async_trait;
use pn_core::{ArticleStore, Error, Result, SavedArticle, SavedArticleUpdate};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::StorageBackend;

struct Entry {
    /// Insertion counter, breaks `savedAt` ties in listing order
    seq: u64,
    article: SavedArticle,
}

#[derive(Default)]
pub struct MemoryStore {
    articles: HashMap<String, Entry>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, article: SavedArticle) -> SavedArticle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.articles.insert(
            article.id().to_string(),
            Entry {
                seq,
                article: article.clone(),
            },
        );
        article
    }

    pub fn insert(&mut self, article: SavedArticle) -> Result<SavedArticle> {
        if self.exists(article.id()) {
            return Err(Error::Conflict(format!("Article already saved: {}", article.id())));
        }
        Ok(self.save(article))
    }

    pub fn get_all(&self) -> Vec<SavedArticle> {
        let mut entries = self.articles.values().collect::<Vec<_>>();
        entries.sort_by_key(|e| (Reverse(e.article.saved_at), e.seq));
        entries.into_iter().map(|e| e.article.clone()).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<SavedArticle> {
        self.articles.get(id).map(|e| e.article.clone())
    }

    pub fn update(&mut self, id: &str, changes: SavedArticleUpdate) -> Option<SavedArticle> {
        let entry = self.articles.get_mut(id)?;
        changes.apply(&mut entry.article);
        Some(entry.article.clone())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.articles.remove(id).is_some()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.articles.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.articles.len()
    }
}

/// Process-lifetime store for saved articles.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn name() -> &'static str {
        "memory"
    }

    async fn connect() -> Result<Self> {
        Ok(Self::new())
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn save(&self, article: SavedArticle) -> Result<SavedArticle> {
        let mut store = self.store.write().await;
        Ok(store.save(article))
    }

    async fn insert(&self, article: SavedArticle) -> Result<SavedArticle> {
        let mut store = self.store.write().await;
        store.insert(article)
    }

    async fn get_all(&self) -> Result<Vec<SavedArticle>> {
        let store = self.store.read().await;
        Ok(store.get_all())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<SavedArticle>> {
        let store = self.store.read().await;
        Ok(store.get_by_id(id))
    }

    async fn update(&self, id: &str, changes: SavedArticleUpdate) -> Result<Option<SavedArticle>> {
        let mut store = self.store.write().await;
        Ok(store.update(id, changes))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.delete(id))
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store.exists(id))
    }

    async fn count(&self) -> Result<usize> {
        let store = self.store.read().await;
        Ok(store.count())
    }
}
