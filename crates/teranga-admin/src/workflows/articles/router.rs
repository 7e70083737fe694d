use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use super::domain::{Article, ArticleDraft, ArticleId};
use super::service::{ArticleQuery, ArticleService};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{catalog_error_response, trash_router, CatalogActionError, CatalogStore};

type SharedService<S> = Arc<ArticleService<S>>;

pub fn article_router<S>(service: SharedService<S>) -> Router
where
    S: CatalogStore<Article> + 'static,
{
    let trash = trash_router("/api/v1/articles", service.trash_bin());

    Router::new()
        .route(
            "/api/v1/articles",
            post(create_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/articles/stats", get(stats_handler::<S>))
        .route(
            "/api/v1/articles/:id",
            get(get_handler::<S>).put(update_handler::<S>),
        )
        .route("/api/v1/articles/:id/publish", post(publish_handler::<S>))
        .route("/api/v1/articles/:id/archive", post(archive_handler::<S>))
        .with_state(service)
        .merge(trash)
}

async fn create_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Json(draft): Json<ArticleDraft>,
) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    match service.create(&actor, draft, Utc::now()) {
        Ok(article) => (StatusCode::CREATED, Json(article)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn list_handler<S>(
    State(service): State<SharedService<S>>,
    Query(query): Query<ArticleQuery>,
) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    match service.list(&query) {
        Ok(articles) => (StatusCode::OK, Json(articles)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn stats_handler<S>(State(service): State<SharedService<S>>) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    match service.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn get_handler<S>(State(service): State<SharedService<S>>, Path(id): Path<String>) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    article_response(service.get(&ArticleId(id)))
}

async fn update_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
    Json(draft): Json<ArticleDraft>,
) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    article_response(service.update(&actor, &ArticleId(id), draft, Utc::now()))
}

async fn publish_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    article_response(service.publish(&actor, &ArticleId(id), Utc::now()))
}

async fn archive_handler<S>(
    State(service): State<SharedService<S>>,
    actor: Actor,
    Path(id): Path<String>,
) -> Response
where
    S: CatalogStore<Article> + 'static,
{
    article_response(service.archive(&actor, &ArticleId(id), Utc::now()))
}

fn article_response(result: Result<Article, CatalogActionError>) -> Response {
    match result {
        Ok(article) => (StatusCode::OK, Json(article)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}
