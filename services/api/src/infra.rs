use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use teranga_admin::workflows::accommodations::{Accommodation, AccommodationService};
use teranga_admin::workflows::articles::{Article, ArticleService};
use teranga_admin::workflows::catalog::MemoryCatalog;
use teranga_admin::workflows::listings::{
    ContentRecord, KindFilter, ListingService, NotificationError, NotificationPublisher,
    OwnerNotice, UrgencyFilter,
};
use teranga_admin::workflows::users::{UserAccount, UserService};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps every owner notice in memory and logs it; no delivery channel exists yet.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationOutbox {
    notices: Arc<Mutex<Vec<OwnerNotice>>>,
}

impl NotificationPublisher for InMemoryNotificationOutbox {
    fn publish(&self, notice: OwnerNotice) -> Result<(), NotificationError> {
        info!(
            template = %notice.template,
            content_id = %notice.content_id,
            owner = %notice.owner_id,
            "owner notice queued"
        );
        let mut guard = self
            .notices
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?;
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNotificationOutbox {
    pub(crate) fn notices(&self) -> Vec<OwnerNotice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) type Listings = ListingService<MemoryCatalog<ContentRecord>, InMemoryNotificationOutbox>;
pub(crate) type Accommodations = AccommodationService<MemoryCatalog<Accommodation>>;
pub(crate) type Articles = ArticleService<MemoryCatalog<Article>>;
pub(crate) type Users = UserService<MemoryCatalog<UserAccount>>;

/// The four back-office services over in-memory stores.
#[derive(Clone)]
pub(crate) struct AdminServices {
    pub(crate) listings: Arc<Listings>,
    pub(crate) accommodations: Arc<Accommodations>,
    pub(crate) articles: Arc<Articles>,
    pub(crate) users: Arc<Users>,
    pub(crate) outbox: InMemoryNotificationOutbox,
}

impl AdminServices {
    pub(crate) fn in_memory() -> Self {
        let outbox = InMemoryNotificationOutbox::default();
        Self {
            listings: Arc::new(ListingService::new(
                Arc::new(MemoryCatalog::default()),
                Arc::new(outbox.clone()),
            )),
            accommodations: Arc::new(AccommodationService::new(Arc::new(
                MemoryCatalog::default(),
            ))),
            articles: Arc::new(ArticleService::new(Arc::new(MemoryCatalog::default()))),
            users: Arc::new(UserService::new(Arc::new(MemoryCatalog::default()))),
            outbox,
        }
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

pub(crate) fn parse_kind_filter(raw: &str) -> Result<KindFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(KindFilter::All),
        "event" => Ok(KindFilter::Event),
        "tour" => Ok(KindFilter::Tour),
        other => Err(format!("unknown kind '{other}' (expected all, event or tour)")),
    }
}

pub(crate) fn parse_urgency_filter(raw: &str) -> Result<UrgencyFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(UrgencyFilter::All),
        "high" => Ok(UrgencyFilter::High),
        "medium" => Ok(UrgencyFilter::Medium),
        "low" => Ok(UrgencyFilter::Low),
        other => Err(format!(
            "unknown urgency '{other}' (expected all, high, medium or low)"
        )),
    }
}
