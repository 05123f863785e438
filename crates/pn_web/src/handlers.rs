use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use pn_core::{
    Listing, NewSavedArticle, NewsQuery, NewsQueryParams, NewsResponse, SavedArticle,
    SavedArticleUpdate, WhiteHouseArticle, WhiteHouseKind,
};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

pub async fn not_found() -> ApiError {
    ApiError(pn_core::Error::NotFound("Not Found".to_string()))
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NewsQueryParams>, QueryRejection>,
) -> ApiResult<Json<NewsResponse>> {
    let Query(params) = params?;
    let query = NewsQuery::try_from(params)?;
    Ok(Json(state.coordinator.fetch(&query).await?))
}

pub async fn list_saved(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Listing<SavedArticle>>> {
    let saved = state.coordinator.saved_articles().await?;
    Ok(Json(Listing::from(saved)))
}

pub async fn get_saved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SavedArticle>> {
    Ok(Json(state.coordinator.saved_article(&id).await?))
}

pub async fn create_saved(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSavedArticle>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let saved = state.coordinator.save_article(body).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_saved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SavedArticleUpdate>, JsonRejection>,
) -> ApiResult<Json<SavedArticle>> {
    let Json(changes) = body?;
    Ok(Json(state.coordinator.update_article(&id, changes).await?))
}

pub async fn delete_saved(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.coordinator.delete_article(&id).await?;
    Ok(Json(json!({ "message": "Saved news deleted successfully" })))
}

pub async fn list_whitehouse(
    State(state): State<Arc<AppState>>,
) -> Json<Listing<WhiteHouseArticle>> {
    Json(Listing::from(state.whitehouse.latest_updates()))
}

pub async fn whitehouse_by_kind(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Listing<WhiteHouseArticle>>> {
    let kind = kind.parse::<WhiteHouseKind>()?;
    Ok(Json(Listing::from(state.whitehouse.by_kind(kind))))
}
