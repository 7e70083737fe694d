use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{UserAccount, UserDraft, UserId, UserStatus};
use crate::workflows::actor::{Actor, ActorRole};
use crate::workflows::catalog::{
    apply_update, fetch_active, insert_next, require_admin, CatalogActionError, CatalogStore,
    RepositoryError, TrashBin,
};

const RECENT_SIGNUP_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserQuery {
    pub role: Option<ActorRole>,
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

impl UserQuery {
    fn matches(&self, user: &UserAccount) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.status.is_some_and(|status| status != user.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                user.name.to_lowercase().contains(&term)
                    || user.email.contains(&term)
                    || user.location.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub suspended: usize,
    pub verified: usize,
    pub by_role: BTreeMap<String, usize>,
    pub joined_last_30_days: usize,
    pub deleted: usize,
}

pub struct UserService<S> {
    store: Arc<S>,
    trash: TrashBin<S, UserAccount>,
    sequence: AtomicU64,
    /// Held across the email check and the write that depends on it.
    registry: Mutex<()>,
}

impl<S> UserService<S>
where
    S: CatalogStore<UserAccount> + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let trash = TrashBin::new(Arc::clone(&store));
        Self {
            store,
            trash,
            sequence: AtomicU64::new(1),
            registry: Mutex::new(()),
        }
    }

    pub fn trash_bin(&self) -> TrashBin<S, UserAccount> {
        self.trash.clone()
    }

    pub fn create(
        &self,
        actor: &Actor,
        draft: UserDraft,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, CatalogActionError> {
        require_admin(actor, "create users")?;
        draft.validate().map_err(CatalogActionError::Validation)?;
        let _registry = self.lock_registry()?;
        self.ensure_email_free(&draft.normalized_email(), None)?;

        let stored = insert_next(self.store.as_ref(), &self.sequence, |seq| {
            UserAccount::from_draft(UserId(format!("user-{seq:06}")), draft.clone(), now)
        })?;
        info!(id = %stored.id, role = %stored.role, "user account created");
        Ok(stored)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &UserId,
        draft: UserDraft,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, CatalogActionError> {
        require_admin(actor, "update users")?;
        draft.validate().map_err(CatalogActionError::Validation)?;
        let _registry = self.lock_registry()?;
        self.ensure_email_free(&draft.normalized_email(), Some(id))?;
        apply_update(self.store.as_ref(), id, |user: &mut UserAccount| {
            user.apply_draft(draft, now);
            Ok(())
        })
    }

    pub fn get(&self, id: &UserId) -> Result<UserAccount, CatalogActionError> {
        fetch_active(self.store.as_ref(), id)
    }

    /// Matching accounts, newest members first.
    pub fn list(&self, query: &UserQuery) -> Result<Vec<UserAccount>, CatalogActionError> {
        let mut users: Vec<UserAccount> = self
            .store
            .list()?
            .into_iter()
            .filter(|user| query.matches(user))
            .collect();
        users.sort_by(|a, b| b.joined_on.cmp(&a.joined_on).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    pub fn suspend(
        &self,
        actor: &Actor,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, CatalogActionError> {
        require_admin(actor, "suspend users")?;
        let user = apply_update(self.store.as_ref(), id, |user: &mut UserAccount| {
            if user.is_self(actor) {
                warn!(%id, "admin attempted to suspend their own account");
                return Err(CatalogActionError::forbidden(actor, "suspend their own account"));
            }
            if user.status == UserStatus::Suspended {
                return Err(CatalogActionError::invalid(user.status, "suspend"));
            }
            user.status = UserStatus::Suspended;
            user.updated_at = now;
            Ok(())
        })?;
        info!(%id, by = %actor.id, "user suspended");
        Ok(user)
    }

    pub fn activate(
        &self,
        actor: &Actor,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, CatalogActionError> {
        require_admin(actor, "activate users")?;
        let user = apply_update(self.store.as_ref(), id, |user: &mut UserAccount| {
            if user.status == UserStatus::Active {
                return Err(CatalogActionError::invalid(user.status, "activate"));
            }
            user.status = UserStatus::Active;
            user.updated_at = now;
            Ok(())
        })?;
        info!(%id, by = %actor.id, "user reactivated");
        Ok(user)
    }

    pub fn verify(
        &self,
        actor: &Actor,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, CatalogActionError> {
        require_admin(actor, "verify users")?;
        let user = apply_update(self.store.as_ref(), id, |user: &mut UserAccount| {
            if user.verified {
                return Err(CatalogActionError::invalid("verified", "verify"));
            }
            user.verified = true;
            user.updated_at = now;
            Ok(())
        })?;
        info!(%id, by = %actor.id, "user verified");
        Ok(user)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Result<UserStats, CatalogActionError> {
        let users = self.store.list()?;
        let cutoff = (now - Duration::days(RECENT_SIGNUP_DAYS)).date_naive();

        let mut stats = UserStats {
            total: users.len(),
            by_role: ActorRole::ordered()
                .into_iter()
                .map(|role| (role.label().to_string(), 0))
                .collect(),
            deleted: self.store.list_trashed()?.len(),
            ..UserStats::default()
        };
        for user in &users {
            match user.status {
                UserStatus::Active => stats.active += 1,
                UserStatus::Suspended => stats.suspended += 1,
            }
            if user.verified {
                stats.verified += 1;
            }
            if user.joined_on >= cutoff {
                stats.joined_last_30_days += 1;
            }
            *stats.by_role.entry(user.role.label().to_string()).or_default() += 1;
        }
        Ok(stats)
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, ()>, CatalogActionError> {
        self.registry.lock().map_err(|_| {
            RepositoryError::Unavailable("user registry lock poisoned".to_string()).into()
        })
    }

    /// Emails are unique across active and trashed accounts.
    fn ensure_email_free(&self, email: &str, except: Option<&UserId>) -> Result<(), CatalogActionError> {
        let taken = self
            .store
            .list()?
            .into_iter()
            .chain(
                self.store
                    .list_trashed()?
                    .into_iter()
                    .map(|trashed| trashed.into_record()),
            )
            .any(|user| user.email == email && Some(&user.id) != except);
        if taken {
            return Err(CatalogActionError::Conflict(format!(
                "email '{email}' is already registered"
            )));
        }
        Ok(())
    }
}
