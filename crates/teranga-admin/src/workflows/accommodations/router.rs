use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{Accommodation, AccommodationDraft, AccommodationId};
use super::service::{AccommodationQuery, AccommodationService};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{catalog_error_response, trash_router, CatalogActionError, CatalogStore};

type SharedService<S> = Arc<AccommodationService<S>>;

pub fn accommodation_router<S>(service: SharedService<S>) -> Router
where
    S: CatalogStore<Accommodation> + 'static,
{
    let trash = trash_router("/api/v1/accommodations", service.trash_bin());

    Router::new()
        .route(
            "/api/v1/accommodations",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route(
            "/api/v1/accommodations/:id",
            get(get_handler::<S>).put(update_handler::<S>),
        )
        .route(
            "/api/v1/accommodations/:id/suspend",
            post(suspend_handler::<S>),
        )
        .route(
            "/api/v1/accommodations/:id/activate",
            post(activate_handler::<S>),
        )
        .with_state(service)
        .merge(trash)
}

async fn create_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Json(draft): Json<AccommodationDraft>,
) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    match service.create(&actor, draft, Utc::now()) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn list_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<AccommodationQuery>,
) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    match service.list(&query) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn get_handler<S>(State(service): State<SharedService<S>>, Path(id): Path<String>) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    record_response(service.get(&AccommodationId(id)))
}

async fn update_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(draft): Json<AccommodationDraft>,
) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    record_response(service.update(&actor, &AccommodationId(id), draft, Utc::now()))
}

async fn suspend_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    record_response(service.suspend(&actor, &AccommodationId(id), Utc::now()))
}

async fn activate_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<Accommodation> + 'static,
{
    record_response(service.activate(&actor, &AccommodationId(id), Utc::now()))
}

fn record_response(result: Result<Accommodation, CatalogActionError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}
