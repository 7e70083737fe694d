use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::actor::Actor;

/// The back-office collections that share the trash workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Accommodations,
    Articles,
    Listings,
    Users,
}

impl Collection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accommodations => "accommodations",
            Self::Articles => "articles",
            Self::Listings => "listings",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record that can live in a catalog store and its trash.
pub trait CatalogEntry: Clone + PartialEq + Send + Sync + 'static {
    type Id: Clone + Ord + Hash + fmt::Display + Send + Sync + 'static;

    const COLLECTION: Collection;

    fn id(&self) -> &Self::Id;

    /// Human readable name used in logs and purge challenges.
    fn label(&self) -> &str;

    /// Whether `actor` may move this record to the trash, restore or purge it.
    fn can_trash(&self, actor: &Actor) -> bool {
        actor.is_admin()
    }
}

/// Stamp carried by a record while it sits in the trash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: String,
}

/// A soft-deleted record and its deletion stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trashed<T> {
    #[serde(flatten)]
    pub record: T,
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: String,
}

impl<T> Trashed<T> {
    pub fn new(record: T, deletion: Deletion) -> Self {
        Self {
            record,
            deleted_at: deletion.deleted_at,
            deleted_by: deletion.deleted_by,
        }
    }

    /// Drop the deletion stamp, returning the record exactly as it was deleted.
    pub fn into_record(self) -> T {
        self.record
    }
}

/// Storage abstraction with an active collection and a trash collection.
///
/// Every method is atomic. `swap` is a compare-and-swap on the whole record so
/// concurrent writers cannot silently overwrite each other.
pub trait CatalogStore<T: CatalogEntry>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn fetch(&self, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    fn list(&self) -> Result<Vec<T>, RepositoryError>;
    fn swap(&self, current: &T, next: T) -> Result<T, RepositoryError>;
    fn trash(&self, id: &T::Id, deletion: Deletion) -> Result<Trashed<T>, RepositoryError>;
    fn fetch_trashed(&self, id: &T::Id) -> Result<Option<Trashed<T>>, RepositoryError>;
    fn list_trashed(&self) -> Result<Vec<Trashed<T>>, RepositoryError>;
    fn restore(&self, id: &T::Id) -> Result<T, RepositoryError>;
    fn purge(&self, id: &T::Id) -> Result<Trashed<T>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was modified concurrently")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
