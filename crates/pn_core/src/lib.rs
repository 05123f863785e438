pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;

pub use config::{AppConfig, HumanDuration};
pub use error::{Error, Result};
pub use models::{
    Article, ArticleSource, Category, Listing, NewSavedArticle, NewsQuery, NewsQueryParams,
    NewsResponse, SavedArticle, SavedArticleUpdate, WhiteHouseArticle, WhiteHouseKind,
};
pub use storage::ArticleStore;

pub mod prelude {
    pub use crate::{Article, ArticleStore, Error, NewsQuery, Result, SavedArticle};
}
