use async_trait::async_trait;
use crate::models::{SavedArticle, SavedArticleUpdate};
use crate::Result;

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Store an article under its id, replacing any previous record
    async fn save(&self, article: SavedArticle) -> Result<SavedArticle>;

    /// Store an article only if its id is not present yet.
    ///
    /// The existence check and the write happen atomically. Returns
    /// [`crate::Error::Conflict`] when the id is already taken.
    async fn insert(&self, article: SavedArticle) -> Result<SavedArticle>;

    /// All saved articles, most recently saved first
    async fn get_all(&self) -> Result<Vec<SavedArticle>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<SavedArticle>>;

    /// Merge `changes` into an existing record. `None` when the id is unknown.
    async fn update(&self, id: &str, changes: SavedArticleUpdate) -> Result<Option<SavedArticle>>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn exists(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}
