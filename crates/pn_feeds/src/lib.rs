pub mod analytics;
pub mod coordinator;
pub mod sources;

pub use coordinator::{assign_ids, FetchCoordinator};
pub use sources::{mock_news, NewsApiSource, NewsSource, UpstreamRequest, WhiteHouseSource};

pub mod prelude {
    pub use super::coordinator::FetchCoordinator;
    pub use super::sources::{NewsSource, RetrievalMode};
    pub use pn_core::{Article, Error, NewsQuery, NewsResponse, Result};
}
