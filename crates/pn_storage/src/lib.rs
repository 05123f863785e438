use async_trait::async_trait;
use pn_core::{ArticleStore, Error, Result};
use std::sync::Arc;

pub mod backends;
pub mod cache;

pub use backends::*;
pub use cache::FreshnessCache;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name used to select the backend from configuration
    fn name() -> &'static str;
    async fn connect() -> Result<Self> where Self: Sized;
}

/// Build the article store selected by `kind`.
pub async fn create_storage(kind: &str) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        k if k == MemoryStorage::name() => Ok(Arc::new(MemoryStorage::connect().await?)),
        other => Err(Error::Config(format!(
            "Unknown storage backend: {} (available: {})",
            other,
            MemoryStorage::name()
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::cache::FreshnessCache;
    pub use super::{create_storage, StorageBackend};
}
