use chrono::{DateTime, Utc};
use pn_core::{Article, Error, Result};
use serde::{Deserialize, Serialize};

/// Channel carrying periodic and breaking news pushes.
pub const NEWS_CHANNEL: &str = "news-updates";

/// Frames sent from the server to subscribed clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "news:update")]
    NewsUpdate {
        timestamp: DateTime<Utc>,
        articles: Vec<Article>,
    },
    #[serde(rename = "news:breaking")]
    NewsBreaking {
        timestamp: DateTime<Utc>,
        article: Article,
    },
}

impl ServerEvent {
    pub fn update(articles: Vec<Article>) -> Self {
        ServerEvent::NewsUpdate {
            timestamp: Utc::now(),
            articles,
        }
    }

    pub fn breaking(article: Article) -> Self {
        ServerEvent::NewsBreaking {
            timestamp: Utc::now(),
            article,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewsUpdate { .. } => "news:update",
            ServerEvent::NewsBreaking { .. } => "news:breaking",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "event")]
pub enum ClientMessage {
    #[serde(rename = "subscribe:news")]
    SubscribeNews,
    #[serde(rename = "unsubscribe:news")]
    UnsubscribeNews,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Validation(format!("Unrecognized client message: {}", e)))
    }
}
