//! Shared storage and trash handling for every back-office collection.

pub mod admin;
pub mod memory;
pub mod router;
pub mod store;
pub mod trash;

pub use admin::{
    apply_update, catalog_error_response, fetch_active, insert_next, require_admin,
    CatalogActionError,
};
pub use memory::MemoryCatalog;
pub use router::trash_router;
pub use store::{CatalogEntry, CatalogStore, Collection, Deletion, RepositoryError, Trashed};
pub use trash::{PurgeChallenge, TrashBin, TrashError, PURGE_CONFIRMATION};
