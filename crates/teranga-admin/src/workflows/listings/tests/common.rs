use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::actor::{
    Actor, ActorRole, ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLE_HEADER,
};
use crate::workflows::catalog::{
    CatalogStore, Deletion, MemoryCatalog, RepositoryError, Trashed,
};
use crate::workflows::listings::domain::{ContentId, ContentKind, ContentRecord, ListingDetails};
use crate::workflows::listings::notify::{NotificationError, NotificationPublisher, OwnerNotice};
use crate::workflows::listings::service::ListingService;

pub(super) type MemoryListings = MemoryCatalog<ContentRecord>;

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 10, 0, 0).unwrap()
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

pub(super) fn admin() -> Actor {
    Actor::new("admin-1", "Aminata Sow", ActorRole::Admin)
}

pub(super) fn guide() -> Actor {
    Actor::new("guide-1", "Moussa Diop", ActorRole::Guide)
}

pub(super) fn other_guide() -> Actor {
    Actor::new("guide-2", "Fatou Ndiaye", ActorRole::Guide)
}

pub(super) fn organizer() -> Actor {
    Actor::new("org-1", "Dakar Events", ActorRole::Organizer)
}

pub(super) fn tourist() -> Actor {
    Actor::new("tourist-1", "Jean Martin", ActorRole::Tourist)
}

pub(super) fn details(title: &str) -> ListingDetails {
    ListingDetails {
        title: title.to_string(),
        description: "Balade commentée".to_string(),
        category: "culture".to_string(),
        location: "Île de Gorée".to_string(),
        price_fcfa: 15_000,
        capacity: Some(12),
        tags: vec!["histoire".to_string()],
    }
}

pub(super) fn build_service() -> (
    ListingService<MemoryListings, MemoryNotifications>,
    Arc<MemoryListings>,
    Arc<MemoryNotifications>,
) {
    let store = Arc::new(MemoryListings::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = ListingService::new(store.clone(), notifications.clone());
    (service, store, notifications)
}

/// A tour created by `guide()` and submitted at `submitted_at()`.
pub(super) fn pending_tour(
    service: &ListingService<MemoryListings, MemoryNotifications>,
) -> ContentRecord {
    service
        .create(
            &guide(),
            ContentKind::Tour,
            details("Circuit Gorée"),
            true,
            submitted_at(),
        )
        .expect("guide creates tour")
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    notices: Arc<Mutex<Vec<OwnerNotice>>>,
}

impl MemoryNotifications {
    pub(super) fn notices(&self) -> Vec<OwnerNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .map(|notice| notice.template)
            .collect()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notice: OwnerNotice) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotifications;

impl NotificationPublisher for OfflineNotifications {
    fn publish(&self, _notice: OwnerNotice) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

/// Store that lets an admin approval land between the sweep's read and write.
pub(super) struct RacingStore {
    pub(super) inner: MemoryListings,
    raced: AtomicBool,
}

impl RacingStore {
    pub(super) fn new(inner: MemoryListings) -> Self {
        Self {
            inner,
            raced: AtomicBool::new(false),
        }
    }
}

impl CatalogStore<ContentRecord> for RacingStore {
    fn insert(&self, record: ContentRecord) -> Result<ContentRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &ContentId) -> Result<Option<ContentRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<ContentRecord>, RepositoryError> {
        self.inner.list()
    }

    fn swap(
        &self,
        current: &ContentRecord,
        next: ContentRecord,
    ) -> Result<ContentRecord, RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let mut approved = current.clone();
            approved
                .approve(&admin().name, next.updated_at)
                .expect("pending record approves");
            self.inner.swap(current, approved)?;
        }
        self.inner.swap(current, next)
    }

    fn trash(
        &self,
        id: &ContentId,
        deletion: Deletion,
    ) -> Result<Trashed<ContentRecord>, RepositoryError> {
        self.inner.trash(id, deletion)
    }

    fn fetch_trashed(
        &self,
        id: &ContentId,
    ) -> Result<Option<Trashed<ContentRecord>>, RepositoryError> {
        self.inner.fetch_trashed(id)
    }

    fn list_trashed(&self) -> Result<Vec<Trashed<ContentRecord>>, RepositoryError> {
        self.inner.list_trashed()
    }

    fn restore(&self, id: &ContentId) -> Result<ContentRecord, RepositoryError> {
        self.inner.restore(id)
    }

    fn purge(&self, id: &ContentId) -> Result<Trashed<ContentRecord>, RepositoryError> {
        self.inner.purge(id)
    }
}

pub(super) struct UnavailableStore;

impl CatalogStore<ContentRecord> for UnavailableStore {
    fn insert(&self, _record: ContentRecord) -> Result<ContentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ContentId) -> Result<Option<ContentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<ContentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn swap(
        &self,
        _current: &ContentRecord,
        _next: ContentRecord,
    ) -> Result<ContentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn trash(
        &self,
        _id: &ContentId,
        _deletion: Deletion,
    ) -> Result<Trashed<ContentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_trashed(
        &self,
        _id: &ContentId,
    ) -> Result<Option<Trashed<ContentRecord>>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_trashed(&self) -> Result<Vec<Trashed<ContentRecord>>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn restore(&self, _id: &ContentId) -> Result<ContentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn purge(&self, _id: &ContentId) -> Result<Trashed<ContentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn request(
    method: Method,
    uri: &str,
    actor: Option<&Actor>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder
            .header(ACTOR_ID_HEADER, actor.id.as_str())
            .header(ACTOR_NAME_HEADER, actor.name.as_str())
            .header(ACTOR_ROLE_HEADER, actor.role.label());
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
