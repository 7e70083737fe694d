use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::store::{CatalogEntry, CatalogStore, RepositoryError};
use super::trash::{TrashBin, TrashError};
use crate::workflows::actor::Actor;

/// Body of the second purge step.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PurgeRequest {
    pub confirmation_token: String,
}

/// Trash routes for one collection mounted under `base` (e.g. `/api/v1/articles`).
pub fn trash_router<S, T>(base: &str, bin: TrashBin<S, T>) -> Router
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
    T::Id: From<String>,
{
    Router::new()
        .route(&format!("{base}/trash"), get(list_handler::<S, T>))
        .route(&format!("{base}/:id"), delete(soft_delete_handler::<S, T>))
        .route(&format!("{base}/:id/restore"), post(restore_handler::<S, T>))
        .route(
            &format!("{base}/:id/purge-request"),
            post(purge_request_handler::<S, T>),
        )
        .route(&format!("{base}/:id/purge"), delete(purge_handler::<S, T>))
        .with_state(bin)
}

pub(crate) async fn list_handler<S, T>(State(bin): State<TrashBin<S, T>>, actor: Actor) -> Response
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
{
    if !actor.is_admin() {
        return error_response(StatusCode::FORBIDDEN, "trash listing requires the admin role");
    }
    match bin.list() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => trash_error_response(err),
    }
}

pub(crate) async fn soft_delete_handler<S, T>(
    State(bin): State<TrashBin<S, T>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
    T::Id: From<String>,
{
    match bin.soft_delete(&T::Id::from(id), &actor, chrono::Utc::now()) {
        Ok(trashed) => (StatusCode::OK, Json(trashed)).into_response(),
        Err(err) => trash_error_response(err),
    }
}

pub(crate) async fn restore_handler<S, T>(
    State(bin): State<TrashBin<S, T>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
    T::Id: From<String>,
{
    match bin.restore(&T::Id::from(id), &actor) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => trash_error_response(err),
    }
}

pub(crate) async fn purge_request_handler<S, T>(
    State(bin): State<TrashBin<S, T>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
    T::Id: From<String>,
{
    match bin.request_purge(&T::Id::from(id), &actor) {
        Ok(challenge) => (StatusCode::OK, Json(challenge)).into_response(),
        Err(err) => trash_error_response(err),
    }
}

pub(crate) async fn purge_handler<S, T>(
    State(bin): State<TrashBin<S, T>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(request): Json<PurgeRequest>,
) -> Response
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry + Serialize,
    T::Id: From<String>,
{
    let id = T::Id::from(id);
    match bin.purge(&id, &request.confirmation_token, &actor) {
        Ok(_) => {
            let payload = json!({ "id": id.to_string(), "purged": true });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(TrashError::ConfirmationMismatch) => {
            let payload = json!({
                "error": TrashError::ConfirmationMismatch.to_string(),
                "purged": false,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(err) => trash_error_response(err),
    }
}

pub(crate) fn trash_error_response(err: TrashError) -> Response {
    let status = match &err {
        TrashError::NotFound { .. } => StatusCode::NOT_FOUND,
        TrashError::Forbidden { .. } => StatusCode::FORBIDDEN,
        TrashError::ConfirmationMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        TrashError::Repository(err) => repository_status(err),
    };
    error_response(status, &err.to_string())
}

pub(crate) fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict | RepositoryError::Stale => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
