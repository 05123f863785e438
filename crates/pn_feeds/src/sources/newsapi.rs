use async_trait::async_trait;
use pn_core::{AppConfig, Error, NewsResponse, Result};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::{NewsSource, UpstreamRequest};

/// Client for the NewsAPI v2 HTTP interface.
pub struct NewsApiSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiSource {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pn/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.news_api_base.clone(),
            config.news_api_key.clone(),
            config.request_timeout,
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, request: &UpstreamRequest) -> Result<NewsResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::UpstreamUnavailable("NEWS_API_KEY is not configured".to_string()))?;

        let url = format!("{}{}", self.base_url, request.endpoint.path());
        debug!(url = %url, mode = ?request.mode, "querying NewsAPI");

        let response = self
            .client
            .get(&url)
            .query(&request.params)
            .query(&[("apiKey", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = body.chars().take(200).collect::<String>();
            return Err(Error::UpstreamUnavailable(format!(
                "NewsAPI error: {} {}",
                status, detail
            )));
        }

        let news = response.json::<NewsResponse>().await?;
        if news.status != "ok" {
            return Err(Error::UpstreamUnavailable(format!(
                "NewsAPI reported status {:?}",
                news.status
            )));
        }
        Ok(news)
    }
}
