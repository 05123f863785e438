use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

pub mod analytics;
pub mod error;
pub mod handlers;
pub mod state;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn create_app(state: AppState, frontend_url: &str) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/news", get(handlers::list_news))
        .route(
            "/api/news/saved",
            get(handlers::list_saved).post(handlers::create_saved),
        )
        .route(
            "/api/news/saved/:id",
            get(handlers::get_saved)
                .patch(handlers::update_saved)
                .delete(handlers::delete_saved),
        )
        .route("/api/whitehouse", get(handlers::list_whitehouse))
        .route("/api/whitehouse/:type", get(handlers::whitehouse_by_kind))
        .route("/api/analytics/trends", get(analytics::trends))
        .route("/api/analytics/sentiment", get(analytics::sentiment))
        .route("/api/analytics/topics", get(analytics::topics))
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/ws", get(ws::ws_handler))
        .fallback(handlers::not_found)
        .layer(cors_layer(frontend_url))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(e) => {
            warn!("Invalid frontend origin {:?} ({}), allowing any origin", frontend_url, e);
            CorsLayer::permissive()
        }
    }
}

pub mod prelude {
    pub use crate::{create_app, ApiError, AppState};
    pub use pn_core::{Error, Result};
}
