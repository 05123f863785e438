use axum::{extract::State, Json};
use chrono::Utc;
use pn_core::HumanDuration;
use pn_feeds::analytics::{self, SentimentBreakdown, Summary, TREND_DAYS};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::error::ApiResult;
use crate::AppState;

pub async fn trends() -> Json<Value> {
    let trends = analytics::trends(Utc::now().date_naive(), TREND_DAYS, &mut rand::thread_rng());
    Json(json!({ "trends": trends }))
}

pub async fn sentiment(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let news = state.coordinator.political(1, 50).await?;
    let sentiment = SentimentBreakdown::of(&news.articles);
    Ok(Json(json!({ "sentiment": sentiment })))
}

pub async fn topics() -> Json<Value> {
    let topics = analytics::topics(&mut rand::thread_rng());
    Json(json!({ "topics": topics }))
}

pub async fn summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let news = state.coordinator.political(1, 100).await?;
    let frequency = HumanDuration(state.broadcast.interval).to_string();
    let summary = Summary::of(&news.articles, frequency);
    Ok(Json(json!({ "summary": summary })))
}
