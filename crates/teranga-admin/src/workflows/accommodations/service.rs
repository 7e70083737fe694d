use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use super::domain::{
    Accommodation, AccommodationDraft, AccommodationId, AccommodationKind, Availability,
};
use crate::workflows::actor::Actor;
use crate::workflows::catalog::{
    apply_update, fetch_active, insert_next, require_admin, CatalogActionError, CatalogStore,
    TrashBin,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationSort {
    #[default]
    Name,
    /// Best rated first.
    Rating,
    /// Cheapest first.
    Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccommodationQuery {
    pub kind: Option<AccommodationKind>,
    pub availability: Option<Availability>,
    pub location: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: AccommodationSort,
}

impl AccommodationQuery {
    fn matches(&self, record: &Accommodation) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }
        if self
            .availability
            .is_some_and(|availability| availability != record.availability)
        {
            return false;
        }
        if let Some(location) = self.location.as_deref() {
            if !contains_folded(&record.location, location) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                contains_folded(&record.name, term) || contains_folded(&record.location, term)
            }
            _ => true,
        }
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub struct AccommodationService<S> {
    store: Arc<S>,
    trash: TrashBin<S, Accommodation>,
    sequence: AtomicU64,
}

impl<S> AccommodationService<S>
where
    S: CatalogStore<Accommodation> + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let trash = TrashBin::new(Arc::clone(&store));
        Self {
            store,
            trash,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn trash_bin(&self) -> TrashBin<S, Accommodation> {
        self.trash.clone()
    }

    /// New properties start `Pending` until an admin activates them.
    pub fn create(
        &self,
        actor: &Actor,
        draft: AccommodationDraft,
        now: DateTime<Utc>,
    ) -> Result<Accommodation, CatalogActionError> {
        require_admin(actor, "create accommodations")?;
        draft.validate().map_err(CatalogActionError::Validation)?;

        let stored = insert_next(self.store.as_ref(), &self.sequence, |seq| {
            Accommodation::from_draft(AccommodationId(format!("acc-{seq:06}")), draft.clone(), now)
        })?;
        info!(id = %stored.id, name = %stored.name, "accommodation created");
        Ok(stored)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &AccommodationId,
        draft: AccommodationDraft,
        now: DateTime<Utc>,
    ) -> Result<Accommodation, CatalogActionError> {
        require_admin(actor, "update accommodations")?;
        draft.validate().map_err(CatalogActionError::Validation)?;
        apply_update(self.store.as_ref(), id, |record: &mut Accommodation| {
            record.apply_draft(draft, now);
            Ok(())
        })
    }

    pub fn get(&self, id: &AccommodationId) -> Result<Accommodation, CatalogActionError> {
        fetch_active(self.store.as_ref(), id)
    }

    pub fn list(&self, query: &AccommodationQuery) -> Result<Vec<Accommodation>, CatalogActionError> {
        let mut records: Vec<Accommodation> = self
            .store
            .list()?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();

        records.sort_by(|a, b| match query.sort {
            AccommodationSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            AccommodationSort::Rating => b
                .rating
                .partial_cmp(&a.rating)
                .unwrap_or(CmpOrdering::Equal)
                .then_with(|| a.name.cmp(&b.name)),
            AccommodationSort::Price => a
                .nightly_rate_fcfa
                .cmp(&b.nightly_rate_fcfa)
                .then_with(|| a.name.cmp(&b.name)),
        });
        Ok(records)
    }

    pub fn suspend(
        &self,
        actor: &Actor,
        id: &AccommodationId,
        now: DateTime<Utc>,
    ) -> Result<Accommodation, CatalogActionError> {
        self.set_availability(actor, id, Availability::Suspended, "suspend", now)
    }

    pub fn activate(
        &self,
        actor: &Actor,
        id: &AccommodationId,
        now: DateTime<Utc>,
    ) -> Result<Accommodation, CatalogActionError> {
        self.set_availability(actor, id, Availability::Available, "activate", now)
    }

    fn set_availability(
        &self,
        actor: &Actor,
        id: &AccommodationId,
        target: Availability,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<Accommodation, CatalogActionError> {
        require_admin(actor, action)?;
        let record = apply_update(self.store.as_ref(), id, |record: &mut Accommodation| {
            if record.availability == target {
                return Err(CatalogActionError::invalid(record.availability, action));
            }
            record.availability = target;
            record.updated_at = now;
            Ok(())
        })?;
        info!(%id, availability = %record.availability, by = %actor.id, "accommodation availability changed");
        Ok(record)
    }
}
