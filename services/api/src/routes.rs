use crate::infra::{AdminServices, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use teranga_admin::workflows::accommodations::accommodation_router;
use teranga_admin::workflows::articles::article_router;
use teranga_admin::workflows::listings::listing_router;
use teranga_admin::workflows::users::user_router;

/// Every workflow router plus the operational endpoints.
pub(crate) fn admin_routes(services: &AdminServices) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(listing_router(Arc::clone(&services.listings)))
        .merge(accommodation_router(Arc::clone(&services.accommodations)))
        .merge(article_router(Arc::clone(&services.articles)))
        .merge(user_router(Arc::clone(&services.users)))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
