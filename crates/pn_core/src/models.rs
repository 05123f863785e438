use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{Error, Result};

/// Largest page the upstream source accepts.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upstream sources send `null` for missing text fields.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Empty until the article has been normalized.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    pub source: ArticleSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
}

impl Article {
    pub fn is_saved(&self) -> bool {
        self.saved.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub saved_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SavedArticle {
    pub fn id(&self) -> &str {
        &self.article.id
    }
}

/// Request body for saving an article.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSavedArticle {
    #[serde(flatten)]
    pub article: Article,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewSavedArticle {
    pub fn validate(&self) -> Result<()> {
        if self.article.id.trim().is_empty() {
            return Err(Error::Validation("id must not be empty".to_string()));
        }
        Url::parse(&self.article.url)
            .map_err(|e| Error::Validation(format!("url is not a valid URL: {}", e)))?;
        if let Some(image) = &self.article.url_to_image {
            Url::parse(image)
                .map_err(|e| Error::Validation(format!("urlToImage is not a valid URL: {}", e)))?;
        }
        Ok(())
    }

    pub fn into_saved(self, saved_at: DateTime<Utc>) -> SavedArticle {
        let mut article = self.article;
        article.saved = Some(true);
        SavedArticle {
            article,
            saved_at,
            notes: self.notes,
        }
    }
}

/// Fields a caller may change on a saved article. Anything else in the
/// request body is ignored, so `id` and `savedAt` can never be rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SavedArticleUpdate {
    #[serde(default)]
    pub notes: Option<String>,
}

impl SavedArticleUpdate {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
        }
    }

    pub fn apply(self, target: &mut SavedArticle) {
        if let Some(notes) = self.notes {
            target.notes = Some(notes);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

fn default_status() -> String {
    "ok".to_string()
}

impl NewsResponse {
    pub fn ok(articles: Vec<Article>) -> Self {
        Self {
            status: default_status(),
            total_results: articles.len() as u64,
            articles,
        }
    }
}

/// `{articles, total}` envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub articles: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(articles: Vec<T>) -> Self {
        let total = articles.len();
        Self { articles, total }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Politics,
    Business,
    Technology,
    World,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Politics,
        Category::Business,
        Category::Technology,
        Category::World,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Politics => "politics",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::World => "world",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "category must be one of general, politics, business, technology, world (got {:?})",
                    s
                ))
            })
    }
}

/// Validated filter tuple for a news fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub q: Option<String>,
    pub category: Option<Category>,
    pub country: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            q: None,
            category: None,
            country: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl NewsQuery {
    pub fn political(page: u32, page_size: u32) -> Self {
        Self {
            category: Some(Category::Politics),
            page,
            page_size,
            ..Self::default()
        }
    }

    pub fn search(q: impl Into<String>, page: u32, page_size: u32) -> Self {
        Self {
            q: Some(q.into()),
            page,
            page_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(Error::Validation("page must be at least 1".to_string()));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::Validation(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if let Some(country) = &self.country {
            if country.chars().count() != 2 {
                return Err(Error::Validation(
                    "country must be exactly 2 characters".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Deterministic fingerprint of the filter tuple. Absent fields map to
    /// the empty string so equivalent requests share an entry.
    pub fn cache_key(&self) -> String {
        format!(
            "q={}|category={}|country={}|page={}|pageSize={}",
            self.q.as_deref().unwrap_or(""),
            self.category.map(|c| c.as_str()).unwrap_or(""),
            self.country.as_deref().unwrap_or(""),
            self.page,
            self.page_size
        )
    }
}

/// Raw query-string form of [`NewsQuery`] as it arrives over HTTP.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQueryParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub country: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    })
}

fn parse_number(name: &str, value: Option<String>, default: u32) -> Result<u32> {
    match non_empty(value) {
        None => Ok(default),
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| Error::Validation(format!("{} must be a positive integer", name))),
    }
}

impl TryFrom<NewsQueryParams> for NewsQuery {
    type Error = Error;

    fn try_from(params: NewsQueryParams) -> Result<Self> {
        let query = NewsQuery {
            q: non_empty(params.q),
            category: non_empty(params.category)
                .map(|c| c.parse::<Category>())
                .transpose()?,
            country: non_empty(params.country).map(|c| c.to_lowercase()),
            page: parse_number("page", params.page, 1)?,
            page_size: parse_number("pageSize", params.page_size, DEFAULT_PAGE_SIZE)?,
        };
        query.validate()?;
        Ok(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhiteHouseKind {
    Briefing,
    Statement,
    PressRelease,
}

impl WhiteHouseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhiteHouseKind::Briefing => "briefing",
            WhiteHouseKind::Statement => "statement",
            WhiteHouseKind::PressRelease => "press-release",
        }
    }
}

impl FromStr for WhiteHouseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "briefing" => Ok(WhiteHouseKind::Briefing),
            "statement" => Ok(WhiteHouseKind::Statement),
            "press-release" => Ok(WhiteHouseKind::PressRelease),
            other => Err(Error::Validation(format!(
                "Invalid type parameter: {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteHouseArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: WhiteHouseKind,
}
