use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use super::router::{error_response, repository_status, trash_error_response};
use super::store::{CatalogEntry, CatalogStore, Collection, RepositoryError};
use super::trash::TrashError;
use crate::workflows::actor::Actor;

/// Error shared by the admin-only collections (accommodations, articles, users).
#[derive(Debug, thiserror::Error)]
pub enum CatalogActionError {
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: Collection, id: String },
    #[error("cannot {action} a record in status {from}")]
    InvalidStateTransition { from: String, action: &'static str },
    #[error("{0}")]
    Validation(String),
    #[error("{actor} may not {action}")]
    Forbidden { actor: String, action: String },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Trash(#[from] TrashError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CatalogActionError {
    pub fn not_found<T: CatalogEntry>(id: &T::Id) -> Self {
        Self::NotFound {
            collection: T::COLLECTION,
            id: id.to_string(),
        }
    }

    pub fn invalid(from: impl ToString, action: &'static str) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            action,
        }
    }

    pub fn forbidden(actor: &Actor, action: impl Into<String>) -> Self {
        Self::Forbidden {
            actor: actor.id.clone(),
            action: action.into(),
        }
    }
}

/// Admin gate for back-office writes.
pub fn require_admin(actor: &Actor, action: &str) -> Result<(), CatalogActionError> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!(actor = %actor.id, role = %actor.role, action, "admin role required");
        Err(CatalogActionError::forbidden(actor, action))
    }
}

pub fn fetch_active<S, T>(store: &S, id: &T::Id) -> Result<T, CatalogActionError>
where
    S: CatalogStore<T>,
    T: CatalogEntry,
{
    store
        .fetch(id)?
        .ok_or_else(|| CatalogActionError::not_found::<T>(id))
}

const ID_ATTEMPTS: usize = 16;

/// Insert a record built from the next free sequence number, skipping ids
/// already taken by seeded or trashed records.
pub fn insert_next<S, T, F>(store: &S, sequence: &AtomicU64, build: F) -> Result<T, CatalogActionError>
where
    S: CatalogStore<T>,
    T: CatalogEntry,
    F: Fn(u64) -> T,
{
    for _ in 0..ID_ATTEMPTS {
        let record = build(sequence.fetch_add(1, Ordering::Relaxed));
        match store.insert(record) {
            Ok(stored) => return Ok(stored),
            Err(RepositoryError::Conflict) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(CatalogActionError::Conflict(format!(
        "no free {} identifier after {ID_ATTEMPTS} attempts",
        T::COLLECTION
    )))
}

/// Read a record, mutate a copy with `apply`, then compare-and-swap it back.
/// A concurrent write in between surfaces as `Conflict`.
pub fn apply_update<S, T, F>(store: &S, id: &T::Id, apply: F) -> Result<T, CatalogActionError>
where
    S: CatalogStore<T>,
    T: CatalogEntry,
    F: FnOnce(&mut T) -> Result<(), CatalogActionError>,
{
    let current = fetch_active(store, id)?;
    let mut next = current.clone();
    apply(&mut next)?;
    match store.swap(&current, next) {
        Ok(record) => Ok(record),
        Err(RepositoryError::Stale) => Err(CatalogActionError::Conflict(format!(
            "{} record '{id}' was modified concurrently; reload and retry",
            T::COLLECTION
        ))),
        Err(RepositoryError::NotFound) => Err(CatalogActionError::not_found::<T>(id)),
        Err(err) => Err(err.into()),
    }
}

pub fn catalog_error_response(err: CatalogActionError) -> Response {
    let err = match err {
        CatalogActionError::Trash(err) => return trash_error_response(err),
        other => other,
    };
    let status = match &err {
        CatalogActionError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogActionError::InvalidStateTransition { from, action } => {
            let payload = json!({
                "error": err.to_string(),
                "from": from,
                "action": action,
            });
            return (StatusCode::CONFLICT, Json(payload)).into_response();
        }
        CatalogActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogActionError::Forbidden { .. } => StatusCode::FORBIDDEN,
        CatalogActionError::Conflict(_) => StatusCode::CONFLICT,
        CatalogActionError::Repository(err) => repository_status(err),
        CatalogActionError::Trash(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}
