use async_trait::async_trait;
use pn_core::{Category, NewsQuery, NewsResponse, Result};

pub mod mock;
pub mod newsapi;
pub mod whitehouse;

pub use mock::mock_news;
pub use newsapi::NewsApiSource;
pub use whitehouse::WhiteHouseSource;

/// Canned OR-query behind the "political" retrieval mode.
pub const POLITICAL_QUERY: &str = "politics OR government OR election OR congress OR senate";
pub const DEFAULT_COUNTRY: &str = "us";

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Returns the name of the upstream provider
    fn name(&self) -> &str;

    /// Runs one upstream query. Any failure is reported as an error and left
    /// to the caller to absorb.
    async fn fetch(&self, request: &UpstreamRequest) -> Result<NewsResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    TopHeadlines,
    Everything,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::TopHeadlines => "/top-headlines",
            Endpoint::Everything => "/everything",
        }
    }
}

/// The three ways a filter tuple is turned into an upstream query. They share
/// caching and normalization and differ only in the parameters sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    Headlines,
    Search,
    Political,
}

impl RetrievalMode {
    pub fn of(query: &NewsQuery) -> Self {
        if query.q.is_some() {
            RetrievalMode::Search
        } else if query.category == Some(Category::Politics) {
            RetrievalMode::Political
        } else {
            RetrievalMode::Headlines
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub mode: RetrievalMode,
    pub endpoint: Endpoint,
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    pub fn for_query(query: &NewsQuery) -> Self {
        let mode = RetrievalMode::of(query);
        let paging = [
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];

        let search = |q: &str| {
            let mut params = vec![("q", q.to_string())];
            params.extend(paging.clone());
            params.push(("sortBy", "publishedAt".to_string()));
            params.push(("language", "en".to_string()));
            params
        };

        let (endpoint, params) = match mode {
            RetrievalMode::Search => (Endpoint::Everything, search(query.q.as_deref().unwrap_or_default())),
            RetrievalMode::Political => (Endpoint::Everything, search(POLITICAL_QUERY)),
            RetrievalMode::Headlines => {
                let country = query.country.as_deref().unwrap_or(DEFAULT_COUNTRY);
                let mut params = vec![("country", country.to_string())];
                params.extend(paging.clone());
                if let Some(category) = query.category.filter(|c| *c != Category::General) {
                    params.push(("category", category.to_string()));
                }
                (Endpoint::TopHeadlines, params)
            }
        };

        Self { mode, endpoint, params }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}
