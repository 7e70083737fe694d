use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tower::ServiceExt;

use super::*;
use crate::workflows::actor::{Actor, ActorRole, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::catalog::{CatalogActionError, MemoryCatalog};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 12, 8, 0, 0).unwrap()
}

fn admin() -> Actor {
    Actor::new("admin-1", "Aminata Sow", ActorRole::Admin)
}

fn draft(title: &str, category: &str, review: bool) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        author: "Awa Fall".to_string(),
        category: category.to_string(),
        excerpt: format!("{title} en quelques mots"),
        body: String::new(),
        tags: Vec::new(),
        read_time: Some("5 min".to_string()),
        featured: false,
        submit_for_review: review,
    }
}

fn service() -> ArticleService<MemoryCatalog<Article>> {
    ArticleService::new(Arc::new(MemoryCatalog::<Article>::default()))
}

#[test]
fn create_defaults_to_draft_or_review() {
    let service = service();
    let draft_article = service
        .create(&admin(), draft("La Maison des Esclaves", "Histoire", false), now())
        .unwrap();
    let queued = service
        .create(&admin(), draft("Le Sabar", "Culture", true), now())
        .unwrap();

    assert_eq!(draft_article.id, ArticleId::from("art-000001"));
    assert_eq!(draft_article.status, ArticleStatus::Draft);
    assert_eq!(queued.status, ArticleStatus::PendingReview);
    assert_eq!(queued.published_at, None);
}

#[test]
fn publish_stamps_date_and_archive_is_terminal_once() {
    let service = service();
    let article = service
        .create(&admin(), draft("Le Lac Rose", "Nature", false), now())
        .unwrap();

    let later = now() + Duration::hours(3);
    let published = service.publish(&admin(), &article.id, later).unwrap();
    assert_eq!(published.status, ArticleStatus::Published);
    assert_eq!(published.published_at, Some(later));
    assert!(matches!(
        service.publish(&admin(), &article.id, later),
        Err(CatalogActionError::InvalidStateTransition { .. })
    ));

    let archived = service.archive(&admin(), &article.id, later).unwrap();
    assert_eq!(archived.status, ArticleStatus::Archived);
    match service.archive(&admin(), &article.id, later) {
        Err(CatalogActionError::InvalidStateTransition { from, action }) => {
            assert_eq!(from, "archived");
            assert_eq!(action, "archive");
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn update_keeps_status() {
    let service = service();
    let article = service
        .create(&admin(), draft("Le Sabar", "Culture", true), now())
        .unwrap();

    let mut edit = draft("Le Sabar, danse de Dakar", "Culture", false);
    edit.featured = true;
    let updated = service
        .update(&admin(), &article.id, edit, now() + Duration::minutes(10))
        .unwrap();
    assert_eq!(updated.title, "Le Sabar, danse de Dakar");
    assert_eq!(updated.status, ArticleStatus::PendingReview);
    assert!(updated.featured);
}

#[test]
fn list_filters_and_stats_count_statuses() {
    let service = service();
    let first = service
        .create(&admin(), draft("La Maison des Esclaves", "Histoire", false), now())
        .unwrap();
    service
        .create(&admin(), draft("Le Sabar", "Culture", true), now())
        .unwrap();
    service
        .create(&admin(), draft("Saint-Louis, ville coloniale", "histoire", false), now())
        .unwrap();
    service.publish(&admin(), &first.id, now()).unwrap();

    let history = service
        .list(&ArticleQuery {
            category: Some("HISTOIRE".to_string()),
            ..ArticleQuery::default()
        })
        .unwrap();
    assert_eq!(history.len(), 2);

    let searched = service
        .list(&ArticleQuery {
            search: Some("sabar".to_string()),
            ..ArticleQuery::default()
        })
        .unwrap();
    assert_eq!(searched.len(), 1);

    let stats = service.stats().unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_status["published"], 1);
    assert_eq!(stats.by_status["pending_review"], 1);
    assert_eq!(stats.by_status["draft"], 1);
    assert_eq!(stats.by_status["archived"], 0);
}

#[test]
fn writes_require_admin() {
    let service = service();
    let guide = Actor::new("guide-1", "Moussa Diop", ActorRole::Guide);
    assert!(matches!(
        service.create(&guide, draft("X", "Culture", false), now()),
        Err(CatalogActionError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn create_route_validates_payload() {
    let router = article_router(Arc::new(service()));
    let payload = json!({ "title": "", "author": "Awa Fall" });

    let response = router
        .oneshot(
            Request::post("/api/v1/articles")
                .header(ACTOR_ID_HEADER, "admin-1")
                .header(ACTOR_ROLE_HEADER, "admin")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn purge_request_names_the_confirmation_phrase() {
    let service = Arc::new(service());
    let article = service
        .create(&admin(), draft("Le Lac Rose", "Nature", false), now())
        .unwrap();
    service
        .trash_bin()
        .soft_delete(&article.id, &admin(), now())
        .unwrap();
    let router = article_router(service);

    let response = router
        .oneshot(
            Request::post(format!("/api/v1/articles/{}/purge-request", article.id))
                .header(ACTOR_ID_HEADER, "admin-1")
                .header(ACTOR_ROLE_HEADER, "admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let challenge: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(challenge["confirmation_phrase"], "SUPPRIMER");
    assert_eq!(challenge["collection"], "articles");
    assert_eq!(challenge["label"], "Le Lac Rose");
}
