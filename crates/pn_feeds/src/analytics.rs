//! Display-only dashboard figures. Trend and topic counts are random, sentiment
//! is a keyword tally.

use chrono::{Duration, NaiveDate};
use pn_core::Article;
use rand::Rng;
use serde::Serialize;

const POSITIVE_WORDS: [&str; 7] = ["success", "growth", "win", "agreement", "peace", "progress", "achievement"];
const NEGATIVE_WORDS: [&str; 7] = ["crisis", "conflict", "scandal", "controversy", "failure", "decline", "concern"];

pub const TREND_DAYS: u32 = 7;
pub const TRENDING_TOPICS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

pub fn analyze_sentiment(text: &str) -> Sentiment {
    let text = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| text.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| text.contains(*w)).count();

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn of(articles: &[Article]) -> Self {
        let mut breakdown = Self::default();
        for article in articles {
            match analyze_sentiment(&format!("{} {}", article.title, article.description)) {
                Sentiment::Positive => breakdown.positive += 1,
                Sentiment::Neutral => breakdown.neutral += 1,
                Sentiment::Negative => breakdown.negative += 1,
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u32,
}

/// One point per day for the last `days` days ending at `today`, oldest first.
pub fn trends<R: Rng + ?Sized>(today: NaiveDate, days: u32, rng: &mut R) -> Vec<TrendPoint> {
    (0..days)
        .rev()
        .map(|ago| TrendPoint {
            date: (today - Duration::days(ago as i64)).format("%b %d").to_string(),
            count: rng.gen_range(30..80),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub name: &'static str,
    pub count: u32,
}

pub fn topics<R: Rng + ?Sized>(rng: &mut R) -> Vec<TopicCount> {
    [
        ("Politics", 50, 100),
        ("Economy", 40, 80),
        ("International", 30, 70),
        ("Policy", 25, 60),
        ("Elections", 35, 90),
    ]
    .into_iter()
    .map(|(name, base, spread)| TopicCount {
        name,
        count: base + rng.gen_range(0..spread),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_articles: usize,
    pub today_articles: usize,
    pub trending_topics: usize,
    pub update_frequency: String,
}

impl Summary {
    pub fn of(articles: &[Article], update_frequency: impl Into<String>) -> Self {
        let total = articles.len();
        Self {
            total_articles: total,
            today_articles: total * 15 / 100,
            trending_topics: TRENDING_TOPICS,
            update_frequency: update_frequency.into(),
        }
    }
}
