use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{UserAccount, UserDraft, UserId};
use super::service::{UserQuery, UserService};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{
    catalog_error_response, require_admin, trash_router, CatalogActionError, CatalogStore,
};

type SharedService<S> = Arc<UserService<S>>;

pub fn user_router<S>(service: SharedService<S>) -> Router
where
    S: CatalogStore<UserAccount> + 'static,
{
    let trash = trash_router("/api/v1/users", service.trash_bin());

    Router::new()
        .route(
            "/api/v1/users",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/users/stats", get(stats_handler::<S>))
        .route(
            "/api/v1/users/:id",
            get(get_handler::<S>).put(update_handler::<S>),
        )
        .route("/api/v1/users/:id/suspend", post(suspend_handler::<S>))
        .route("/api/v1/users/:id/activate", post(activate_handler::<S>))
        .route("/api/v1/users/:id/verify", post(verify_handler::<S>))
        .with_state(service)
        .merge(trash)
}

async fn create_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Json(draft): Json<UserDraft>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    match service.create(&actor, draft, Utc::now()) {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

/// Account data is admin-only, reads included.
async fn list_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Query(query): Query<UserQuery>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    let result = require_admin(&actor, "list users").and_then(|()| service.list(&query));
    match result {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn stats_handler<S>(State(service): State<SharedService<S>>, actor: Actor) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    let result = require_admin(&actor, "view user statistics")
        .and_then(|()| service.stats(Utc::now()));
    match result {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn get_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    user_response(require_admin(&actor, "view users").and_then(|()| service.get(&UserId(id))))
}

async fn update_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(draft): Json<UserDraft>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    user_response(service.update(&actor, &UserId(id), draft, Utc::now()))
}

async fn suspend_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    user_response(service.suspend(&actor, &UserId(id), Utc::now()))
}

async fn activate_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    user_response(service.activate(&actor, &UserId(id), Utc::now()))
}

async fn verify_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<UserAccount> + 'static,
{
    user_response(service.verify(&actor, &UserId(id), Utc::now()))
}

fn user_response(result: Result<UserAccount, CatalogActionError>) -> Response {
    match result {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}
