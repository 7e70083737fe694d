use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{ContentId, ContentKind, ContentRecord, ContentStatus, ListingDetails};
use super::lifecycle::{AutoPublishOutcome, LifecycleAction, LifecycleError};
use super::notify::{NotificationPublisher, OwnerNotice};
use super::queue::{validation_queue, QueueEntry, QueueFilter, QueueStats};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{
    CatalogStore, PurgeChallenge, RepositoryError, TrashBin, TrashError, Trashed,
};

const ID_ATTEMPTS: usize = 16;
const SWAP_ATTEMPTS: usize = 3;

/// Listing filter for the owner and admin listings screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingFilter {
    pub kind: Option<ContentKind>,
    pub status: Option<ContentStatus>,
    pub owner_id: Option<String>,
}

/// Summary of one pass of the auto-publish sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub published: Vec<ContentId>,
    pub not_due: usize,
    pub superseded: usize,
}

/// Service owning the tour and event lifecycle.
pub struct ListingService<S, N> {
    store: Arc<S>,
    notifications: Arc<N>,
    trash: TrashBin<S, ContentRecord>,
    sequence: AtomicU64,
}

impl<S, N> ListingService<S, N>
where
    S: CatalogStore<ContentRecord> + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>) -> Self {
        let trash = TrashBin::new(Arc::clone(&store));
        Self {
            store,
            notifications,
            trash,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn trash_bin(&self) -> TrashBin<S, ContentRecord> {
        self.trash.clone()
    }

    /// Create a listing owned by `actor`, optionally submitting it right away.
    pub fn create(
        &self,
        actor: &Actor,
        kind: ContentKind,
        details: ListingDetails,
        submit_now: bool,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        if !actor.is_admin() && actor.role != kind.owner_role() {
            return Err(ListingServiceError::forbidden(actor, "create", kind.label()));
        }
        details.validate().map_err(ListingServiceError::Validation)?;

        for _ in 0..ID_ATTEMPTS {
            let id = self.next_id(kind);
            let mut record = ContentRecord::draft(id, kind, actor, details.clone(), now);
            if submit_now {
                record.submit(now)?;
            }
            match self.store.insert(record) {
                Ok(stored) => {
                    info!(id = %stored.id, %kind, status = %stored.status, owner = %actor.id, "listing created");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(ListingServiceError::Conflict(format!(
            "no free {kind} identifier after {ID_ATTEMPTS} attempts"
        )))
    }

    pub fn get(&self, id: &ContentId) -> Result<ContentRecord, ListingServiceError> {
        self.store
            .fetch(id)?
            .ok_or_else(|| ListingServiceError::NotFound(id.clone()))
    }

    pub fn list(&self, filter: &ListingFilter) -> Result<Vec<ContentRecord>, ListingServiceError> {
        let mut records: Vec<ContentRecord> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| filter.kind.map_or(true, |kind| record.kind == kind))
            .filter(|record| filter.status.map_or(true, |status| record.status == status))
            .filter(|record| {
                filter
                    .owner_id
                    .as_deref()
                    .map_or(true, |owner| record.owner_id == owner)
            })
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    pub fn update_details(
        &self,
        actor: &Actor,
        id: &ContentId,
        details: ListingDetails,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        self.transition(id, |record| {
            require_owner_or_admin(actor, record, LifecycleAction::Edit)?;
            record.edit(details, now)?;
            Ok(())
        })
    }

    pub fn submit(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_owner(actor, record, LifecycleAction::Submit)?;
            record.submit(now)?;
            Ok(())
        })?;
        info!(%id, auto_publish_at = ?record.auto_publish_at, "listing submitted for review");
        Ok(record)
    }

    pub fn approve(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_admin(actor, LifecycleAction::Approve)?;
            record.approve(&actor.name, now)?;
            Ok(())
        })?;
        info!(%id, validated_by = %actor.name, "listing approved");
        self.notify_owner(&record, "listing_approved", [("validated_by", actor.name.clone())]);
        Ok(record)
    }

    pub fn reject(
        &self,
        actor: &Actor,
        id: &ContentId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_admin(actor, LifecycleAction::Reject)?;
            record.reject(reason, now)?;
            Ok(())
        })?;
        info!(%id, rejected_by = %actor.name, "listing rejected");
        let reason = record.rejection_reason.clone().unwrap_or_default();
        self.notify_owner(&record, "listing_rejected", [("reason", reason)]);
        Ok(record)
    }

    pub fn cancel_submission(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_owner(actor, record, LifecycleAction::CancelSubmission)?;
            record.cancel_submission(now)?;
            Ok(())
        })?;
        info!(%id, "submission withdrawn");
        Ok(record)
    }

    pub fn suspend(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_admin(actor, LifecycleAction::Suspend)?;
            record.suspend(now)?;
            Ok(())
        })?;
        info!(%id, suspended_by = %actor.name, "listing suspended");
        Ok(record)
    }

    pub fn reinstate(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_admin(actor, LifecycleAction::Reinstate)?;
            record.reinstate(now)?;
            Ok(())
        })?;
        info!(%id, "listing reinstated");
        Ok(record)
    }

    pub fn cancel_listing(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<ContentRecord, ListingServiceError> {
        let record = self.transition(id, |record| {
            require_owner_or_admin(actor, record, LifecycleAction::Cancel)?;
            record.cancel(now)?;
            Ok(())
        })?;
        info!(%id, cancelled_by = %actor.id, "listing cancelled");
        Ok(record)
    }

    /// Apply the timeout transition to one record. A lost race against an
    /// admin action is re-evaluated against the fresh record, which then
    /// reports the admin outcome as `Superseded`.
    pub fn auto_publish(
        &self,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<AutoPublishOutcome, ListingServiceError> {
        for _ in 0..SWAP_ATTEMPTS {
            let current = self.get(id)?;
            let mut next = current.clone();
            let outcome = next.auto_publish(now);
            if !outcome.changed() {
                debug!(%id, ?outcome, "auto-publish skipped");
                return Ok(outcome);
            }

            match self.store.swap(&current, next) {
                Ok(record) => {
                    info!(%id, "listing auto-published after review window");
                    self.notify_owner(&record, "listing_auto_published", []);
                    return Ok(outcome);
                }
                Err(RepositoryError::Stale) => continue,
                Err(RepositoryError::NotFound) => {
                    return Err(ListingServiceError::NotFound(id.clone()))
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ListingServiceError::Conflict(format!(
            "listing '{id}' kept changing during auto-publish"
        )))
    }

    /// Publish every pending listing whose review window has elapsed.
    pub fn sweep_auto_publish(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, ListingServiceError> {
        let pending: Vec<ContentId> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| record.status == ContentStatus::PendingReview)
            .map(|record| record.id)
            .collect();

        let mut report = SweepReport {
            examined: pending.len(),
            ..SweepReport::default()
        };
        for id in pending {
            match self.auto_publish(&id, now) {
                Ok(AutoPublishOutcome::Published) => report.published.push(id),
                Ok(AutoPublishOutcome::NotDue(_)) => report.not_due += 1,
                Ok(_) => report.superseded += 1,
                // Deleted or contended between listing and publishing.
                Err(ListingServiceError::NotFound(_)) | Err(ListingServiceError::Conflict(_)) => {
                    report.superseded += 1
                }
                Err(err) => return Err(err),
            }
        }

        if !report.published.is_empty() {
            info!(
                published = report.published.len(),
                examined = report.examined,
                "auto-publish sweep completed"
            );
        }
        Ok(report)
    }

    pub fn validation_queue(
        &self,
        now: DateTime<Utc>,
        filter: QueueFilter,
    ) -> Result<Vec<QueueEntry>, ListingServiceError> {
        let records = self.store.list()?;
        Ok(validation_queue(&records, now, filter))
    }

    pub fn queue_stats(&self, now: DateTime<Utc>) -> Result<QueueStats, ListingServiceError> {
        let queue = self.validation_queue(now, QueueFilter::default())?;
        Ok(QueueStats::from_entries(&queue, now))
    }

    pub fn delete(
        &self,
        actor: &Actor,
        id: &ContentId,
        now: DateTime<Utc>,
    ) -> Result<Trashed<ContentRecord>, ListingServiceError> {
        Ok(self.trash.soft_delete(id, actor, now)?)
    }

    pub fn restore(
        &self,
        actor: &Actor,
        id: &ContentId,
    ) -> Result<ContentRecord, ListingServiceError> {
        Ok(self.trash.restore(id, actor)?)
    }

    pub fn request_purge(
        &self,
        actor: &Actor,
        id: &ContentId,
    ) -> Result<PurgeChallenge, ListingServiceError> {
        Ok(self.trash.request_purge(id, actor)?)
    }

    pub fn purge(
        &self,
        actor: &Actor,
        id: &ContentId,
        confirmation_token: &str,
    ) -> Result<Trashed<ContentRecord>, ListingServiceError> {
        Ok(self.trash.purge(id, confirmation_token, actor)?)
    }

    pub fn list_trash(&self) -> Result<Vec<Trashed<ContentRecord>>, ListingServiceError> {
        Ok(self.trash.list()?)
    }

    fn next_id(&self, kind: ContentKind) -> ContentId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        ContentId(format!("{}-{id:06}", kind.label()))
    }

    /// Fetch, mutate a copy, and compare-and-swap it back.
    fn transition<F>(&self, id: &ContentId, apply: F) -> Result<ContentRecord, ListingServiceError>
    where
        F: FnOnce(&mut ContentRecord) -> Result<(), ListingServiceError>,
    {
        let current = self.get(id)?;
        let mut next = current.clone();
        if let Err(err) = apply(&mut next) {
            warn!(%id, status = %current.status, error = %err, "listing action refused");
            return Err(err);
        }

        match self.store.swap(&current, next) {
            Ok(record) => Ok(record),
            Err(RepositoryError::Stale) => Err(ListingServiceError::Conflict(format!(
                "listing '{id}' was modified concurrently; reload and retry"
            ))),
            Err(RepositoryError::NotFound) => Err(ListingServiceError::NotFound(id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// The state change is already committed, so delivery failures are logged
    /// rather than surfaced to the caller.
    fn notify_owner<const K: usize>(
        &self,
        record: &ContentRecord,
        template: &str,
        extra: [(&str, String); K],
    ) {
        let mut details = BTreeMap::new();
        details.insert("title".to_string(), record.details.title.clone());
        details.insert("kind".to_string(), record.kind.label().to_string());
        details.insert("status".to_string(), record.status.label().to_string());
        for (key, value) in extra {
            details.insert(key.to_string(), value);
        }

        let notice = OwnerNotice {
            template: template.to_string(),
            content_id: record.id.clone(),
            owner_id: record.owner_id.clone(),
            details,
        };
        if let Err(err) = self.notifications.publish(notice) {
            warn!(id = %record.id, template, error = %err, "owner notification failed");
        }
    }
}

fn require_admin(actor: &Actor, action: LifecycleAction) -> Result<(), ListingServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ListingServiceError::forbidden(actor, action.label(), "listing"))
    }
}

fn require_owner(
    actor: &Actor,
    record: &ContentRecord,
    action: LifecycleAction,
) -> Result<(), ListingServiceError> {
    if record.is_owned_by(actor) {
        Ok(())
    } else {
        Err(ListingServiceError::forbidden(actor, action.label(), &record.id.0))
    }
}

fn require_owner_or_admin(
    actor: &Actor,
    record: &ContentRecord,
    action: LifecycleAction,
) -> Result<(), ListingServiceError> {
    if actor.is_admin() {
        return Ok(());
    }
    require_owner(actor, record, action)
}

/// Error raised by the listing service.
#[derive(Debug, thiserror::Error)]
pub enum ListingServiceError {
    #[error("listing '{0}' not found")]
    NotFound(ContentId),
    #[error("cannot {action} a listing in status {from}")]
    InvalidStateTransition {
        from: ContentStatus,
        action: LifecycleAction,
    },
    #[error("{0}")]
    Validation(String),
    #[error("{actor} ({role}) may not {action} {target}")]
    Forbidden {
        actor: String,
        role: String,
        action: String,
        target: String,
    },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Trash(#[from] TrashError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ListingServiceError {
    fn forbidden(actor: &Actor, action: &str, target: &str) -> Self {
        Self::Forbidden {
            actor: actor.id.clone(),
            role: actor.role.label().to_string(),
            action: action.to_string(),
            target: target.to_string(),
        }
    }
}

impl From<LifecycleError> for ListingServiceError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidStateTransition { from, action } => {
                Self::InvalidStateTransition { from, action }
            }
            LifecycleError::Validation(message) => Self::Validation(message),
        }
    }
}
