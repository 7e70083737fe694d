use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{ContentId, ContentKind, ContentRecord, ListingDetails};
use super::notify::NotificationPublisher;
use super::queue::QueueFilter;
use super::service::{ListingFilter, ListingService, ListingServiceError};
use super::timer::Urgency;
use crate::workflows::actor::Actor;
use crate::workflows::catalog::router::{error_response, repository_status, trash_error_response};
use crate::workflows::catalog::{trash_router, CatalogStore};

type SharedService<S, N> = Arc<ListingService<S, N>>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateListingRequest {
    pub kind: ContentKind,
    #[serde(flatten)]
    pub details: ListingDetails,
    /// Keep the new listing as a draft instead of submitting it.
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

/// A listing plus its live countdown while pending review.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub record: ContentRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

impl ListingView {
    pub fn at(record: ContentRecord, now: DateTime<Utc>) -> Self {
        let time_remaining = record.time_remaining(now).map(|remaining| remaining.to_string());
        let urgency = record
            .auto_publish_at
            .filter(|_| time_remaining.is_some())
            .map(|deadline| Urgency::classify(now, deadline));
        Self {
            record,
            time_remaining,
            urgency,
        }
    }
}

/// Router for tours and events, their validation queue and the sweep hook.
pub fn listing_router<S, N>(service: SharedService<S, N>) -> Router
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let trash = trash_router("/api/v1/content", service.trash_bin());

    Router::new()
        .route(
            "/api/v1/content",
            post(create_handler::<S, N>).get(list_handler::<S, N>),
        )
        .route(
            "/api/v1/content/:id",
            get(get_handler::<S, N>).put(update_handler::<S, N>),
        )
        .route("/api/v1/content/:id/submit", post(submit_handler::<S, N>))
        .route("/api/v1/content/:id/approve", post(approve_handler::<S, N>))
        .route("/api/v1/content/:id/reject", post(reject_handler::<S, N>))
        .route(
            "/api/v1/content/:id/cancel-submission",
            post(cancel_submission_handler::<S, N>),
        )
        .route("/api/v1/content/:id/suspend", post(suspend_handler::<S, N>))
        .route(
            "/api/v1/content/:id/reinstate",
            post(reinstate_handler::<S, N>),
        )
        .route("/api/v1/content/:id/cancel", post(cancel_handler::<S, N>))
        .route("/api/v1/validation/queue", get(queue_handler::<S, N>))
        .route("/api/v1/validation/stats", get(stats_handler::<S, N>))
        .route(
            "/internal/sweep-auto-publish",
            post(sweep_handler::<S, N>),
        )
        .with_state(service)
        .merge(trash)
}

pub(crate) async fn create_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Json(request): Json<CreateListingRequest>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.create(&actor, request.kind, request.details, !request.draft, now) {
        Ok(record) => (StatusCode::CREATED, Json(ListingView::at(record, now))).into_response(),
        Err(err) => listing_error_response(err),
    }
}

pub(crate) async fn list_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Query(filter): Query<ListingFilter>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    match service.list(&filter) {
        Ok(records) => {
            let views: Vec<ListingView> = records
                .into_iter()
                .map(|record| ListingView::at(record, now))
                .collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => listing_error_response(err),
    }
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    view_response(service.get(&ContentId(id)), Utc::now())
}

pub(crate) async fn update_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(details): Json<ListingDetails>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(
        service.update_details(&actor, &ContentId(id), details, now),
        now,
    )
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.submit(&actor, &ContentId(id), now), now)
}

pub(crate) async fn approve_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.approve(&actor, &ContentId(id), now), now)
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(
        service.reject(&actor, &ContentId(id), &request.reason, now),
        now,
    )
}

pub(crate) async fn cancel_submission_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.cancel_submission(&actor, &ContentId(id), now), now)
}

pub(crate) async fn suspend_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.suspend(&actor, &ContentId(id), now), now)
}

pub(crate) async fn reinstate_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.reinstate(&actor, &ContentId(id), now), now)
}

pub(crate) async fn cancel_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    let now = Utc::now();
    view_response(service.cancel_listing(&actor, &ContentId(id), now), now)
}

pub(crate) async fn queue_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
    Query(filter): Query<QueueFilter>,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    if !actor.is_admin() {
        return error_response(StatusCode::FORBIDDEN, "the validation queue requires the admin role");
    }
    match service.validation_queue(Utc::now(), filter) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => listing_error_response(err),
    }
}

pub(crate) async fn stats_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    actor: Actor,
) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    if !actor.is_admin() {
        return error_response(StatusCode::FORBIDDEN, "validation statistics require the admin role");
    }
    match service.queue_stats(Utc::now()) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => listing_error_response(err),
    }
}

pub(crate) async fn sweep_handler<S, N>(State(service): State<SharedService<S, N>>) -> Response
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    match service.sweep_auto_publish(Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => listing_error_response(err),
    }
}

fn view_response(result: Result<ContentRecord, ListingServiceError>, now: DateTime<Utc>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(ListingView::at(record, now))).into_response(),
        Err(err) => listing_error_response(err),
    }
}

pub(crate) fn listing_error_response(err: ListingServiceError) -> Response {
    let err = match err {
        ListingServiceError::Trash(err) => return trash_error_response(err),
        other => other,
    };
    let status = match &err {
        ListingServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ListingServiceError::InvalidStateTransition { from, action } => {
            let payload = json!({
                "error": err.to_string(),
                "from": from,
                "action": action,
            });
            return (StatusCode::CONFLICT, Json(payload)).into_response();
        }
        ListingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ListingServiceError::Forbidden { .. } => StatusCode::FORBIDDEN,
        ListingServiceError::Conflict(_) => StatusCode::CONFLICT,
        ListingServiceError::Repository(err) => repository_status(err),
        ListingServiceError::Trash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}
