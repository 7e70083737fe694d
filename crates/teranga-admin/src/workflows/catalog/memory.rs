use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::store::{CatalogEntry, CatalogStore, Deletion, RepositoryError, Trashed};

struct CatalogState<T: CatalogEntry> {
    active: BTreeMap<T::Id, T>,
    trash: BTreeMap<T::Id, Trashed<T>>,
}

impl<T: CatalogEntry> Default for CatalogState<T> {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
            trash: BTreeMap::new(),
        }
    }
}

/// Process-local store; both collections sit behind one lock so moves between
/// them are atomic.
pub struct MemoryCatalog<T: CatalogEntry> {
    state: Arc<Mutex<CatalogState<T>>>,
}

impl<T: CatalogEntry> Default for MemoryCatalog<T> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState::default())),
        }
    }
}

impl<T: CatalogEntry> Clone for MemoryCatalog<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: CatalogEntry> MemoryCatalog<T> {
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let catalog = Self::default();
        if let Ok(mut state) = catalog.state.lock() {
            for record in records {
                state.active.insert(record.id().clone(), record);
            }
        }
        catalog
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogState<T>>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable(format!("{} lock poisoned", T::COLLECTION)))
    }
}

impl<T: CatalogEntry> CatalogStore<T> for MemoryCatalog<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut state = self.lock()?;
        let id = record.id();
        if state.active.contains_key(id) || state.trash.contains_key(id) {
            return Err(RepositoryError::Conflict);
        }
        state.active.insert(id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Ok(self.lock()?.active.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.lock()?.active.values().cloned().collect())
    }

    fn swap(&self, current: &T, next: T) -> Result<T, RepositoryError> {
        if current.id() != next.id() {
            return Err(RepositoryError::Conflict);
        }

        let mut state = self.lock()?;
        let slot = state
            .active
            .get_mut(current.id())
            .ok_or(RepositoryError::NotFound)?;
        if *slot != *current {
            return Err(RepositoryError::Stale);
        }
        *slot = next.clone();
        Ok(next)
    }

    fn trash(&self, id: &T::Id, deletion: Deletion) -> Result<Trashed<T>, RepositoryError> {
        let mut state = self.lock()?;
        let record = state.active.remove(id).ok_or(RepositoryError::NotFound)?;
        let trashed = Trashed::new(record, deletion);
        state.trash.insert(id.clone(), trashed.clone());
        Ok(trashed)
    }

    fn fetch_trashed(&self, id: &T::Id) -> Result<Option<Trashed<T>>, RepositoryError> {
        Ok(self.lock()?.trash.get(id).cloned())
    }

    fn list_trashed(&self) -> Result<Vec<Trashed<T>>, RepositoryError> {
        Ok(self.lock()?.trash.values().cloned().collect())
    }

    fn restore(&self, id: &T::Id) -> Result<T, RepositoryError> {
        let mut state = self.lock()?;
        if state.active.contains_key(id) {
            return Err(RepositoryError::Conflict);
        }
        let record = state
            .trash
            .remove(id)
            .ok_or(RepositoryError::NotFound)?
            .into_record();
        state.active.insert(id.clone(), record.clone());
        Ok(record)
    }

    fn purge(&self, id: &T::Id) -> Result<Trashed<T>, RepositoryError> {
        self.lock()?.trash.remove(id).ok_or(RepositoryError::NotFound)
    }
}
