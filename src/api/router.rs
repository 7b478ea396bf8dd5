//! Route table for the Medisight API and embedded front end.

use axum::extract::DefaultBodyLimit;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use super::endpoints::{analysis, claim, health};
use super::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health::health))
        .route("/api/claim/upload", post(claim::upload))
        .route("/api/claim", get(claim::snapshot))
        .route("/api/claim/pages", post(claim::select_pages))
        .route("/api/claim/preview/:page", get(claim::preview))
        .route("/api/claim/download", get(claim::download))
        .route("/api/analysis/run", post(analysis::run))
        .route("/api/analysis/followup", post(analysis::follow_up))
        .route("/api/session/reset", post(analysis::reset))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// `GET /` — the single-page front end, embedded at compile time.
async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
