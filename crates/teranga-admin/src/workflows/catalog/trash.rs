use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::store::{CatalogEntry, CatalogStore, Collection, Deletion, RepositoryError, Trashed};
use crate::workflows::actor::Actor;

/// Phrase an operator must type back to purge a record for good.
pub const PURGE_CONFIRMATION: &str = "SUPPRIMER";

/// First half of the two-step purge: tells the caller what to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeChallenge {
    pub collection: Collection,
    pub id: String,
    pub label: String,
    pub confirmation_phrase: &'static str,
    pub deleted_at: DateTime<Utc>,
}

/// Soft delete, restore and purge over any catalog store.
pub struct TrashBin<S, T> {
    store: Arc<S>,
    entry: PhantomData<fn() -> T>,
}

impl<S, T> Clone for TrashBin<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entry: PhantomData,
        }
    }
}

impl<S, T> TrashBin<S, T>
where
    S: CatalogStore<T> + 'static,
    T: CatalogEntry,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            entry: PhantomData,
        }
    }

    /// Move an active record to the trash, stamping who deleted it and when.
    pub fn soft_delete(
        &self,
        id: &T::Id,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Trashed<T>, TrashError> {
        let record = self
            .store
            .fetch(id)?
            .ok_or_else(|| TrashError::not_found::<T>(id))?;
        if !record.can_trash(actor) {
            warn!(collection = %T::COLLECTION, %id, actor = %actor.id, "delete refused");
            return Err(TrashError::Forbidden {
                actor: actor.id.clone(),
            });
        }

        let trashed = self
            .store
            .trash(
                id,
                Deletion {
                    deleted_at: now,
                    deleted_by: actor.name.clone(),
                },
            )
            .map_err(|err| TrashError::from_store::<T>(err, id))?;
        info!(collection = %T::COLLECTION, %id, deleted_by = %trashed.deleted_by, "moved to trash");
        Ok(trashed)
    }

    /// Return a trashed record to its collection with the deletion stamp cleared.
    pub fn restore(&self, id: &T::Id, actor: &Actor) -> Result<T, TrashError> {
        self.trashed_for(id, actor)?;
        let record = self
            .store
            .restore(id)
            .map_err(|err| TrashError::from_store::<T>(err, id))?;
        info!(collection = %T::COLLECTION, %id, restored_by = %actor.id, "restored from trash");
        Ok(record)
    }

    pub fn request_purge(&self, id: &T::Id, actor: &Actor) -> Result<PurgeChallenge, TrashError> {
        let trashed = self.trashed_for(id, actor)?;
        Ok(PurgeChallenge {
            collection: T::COLLECTION,
            id: id.to_string(),
            label: trashed.record.label().to_string(),
            confirmation_phrase: PURGE_CONFIRMATION,
            deleted_at: trashed.deleted_at,
        })
    }

    /// Remove a trashed record irrecoverably. A token other than
    /// [`PURGE_CONFIRMATION`] aborts and leaves the record untouched.
    pub fn purge(
        &self,
        id: &T::Id,
        confirmation_token: &str,
        actor: &Actor,
    ) -> Result<Trashed<T>, TrashError> {
        self.trashed_for(id, actor)?;
        if confirmation_token != PURGE_CONFIRMATION {
            warn!(collection = %T::COLLECTION, %id, "purge aborted: confirmation mismatch");
            return Err(TrashError::ConfirmationMismatch);
        }

        let purged = self
            .store
            .purge(id)
            .map_err(|err| TrashError::from_store::<T>(err, id))?;
        info!(collection = %T::COLLECTION, %id, purged_by = %actor.id, "purged permanently");
        Ok(purged)
    }

    /// Trashed records, most recent deletion first.
    pub fn list(&self) -> Result<Vec<Trashed<T>>, TrashError> {
        let mut trashed = self.store.list_trashed()?;
        trashed.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(trashed)
    }

    fn trashed_for(&self, id: &T::Id, actor: &Actor) -> Result<Trashed<T>, TrashError> {
        let trashed = self
            .store
            .fetch_trashed(id)?
            .ok_or_else(|| TrashError::not_found::<T>(id))?;
        if !trashed.record.can_trash(actor) {
            return Err(TrashError::Forbidden {
                actor: actor.id.clone(),
            });
        }
        Ok(trashed)
    }
}

/// Error raised by trash operations.
#[derive(Debug, thiserror::Error)]
pub enum TrashError {
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: Collection, id: String },
    #[error("actor '{actor}' may not manage this record")]
    Forbidden { actor: String },
    #[error("confirmation did not match; type exactly SUPPRIMER to purge")]
    ConfirmationMismatch,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TrashError {
    fn not_found<T: CatalogEntry>(id: &T::Id) -> Self {
        Self::NotFound {
            collection: T::COLLECTION,
            id: id.to_string(),
        }
    }

    fn from_store<T: CatalogEntry>(err: RepositoryError, id: &T::Id) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found::<T>(id),
            other => Self::Repository(other),
        }
    }
}
