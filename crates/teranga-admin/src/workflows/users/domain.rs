use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::actor::{Actor, ActorRole};
use crate::workflows::catalog::{CatalogEntry, Collection};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Suspended,
}

impl UserStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: ActorRole,
    #[serde(default)]
    pub location: String,
}

impl UserDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !self.email.contains('@') {
            return Err(format!("'{}' is not an email address", self.email));
        }
        Ok(())
    }

    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: ActorRole,
    pub status: UserStatus,
    pub location: String,
    pub verified: bool,
    pub joined_on: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn from_draft(id: UserId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        let email = draft.normalized_email();
        Self {
            id,
            name: draft.name,
            email,
            phone: draft.phone,
            role: draft.role,
            status: UserStatus::Active,
            location: draft.location,
            verified: false,
            joined_on: now.date_naive(),
            updated_at: now,
        }
    }

    pub fn apply_draft(&mut self, draft: UserDraft, now: DateTime<Utc>) {
        self.email = draft.normalized_email();
        self.name = draft.name;
        self.phone = draft.phone;
        self.role = draft.role;
        self.location = draft.location;
        self.updated_at = now;
    }

    pub fn is_self(&self, actor: &Actor) -> bool {
        self.id.0 == actor.id
    }
}

impl CatalogEntry for UserAccount {
    type Id = UserId;

    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    /// Admins manage accounts, but never their own.
    fn can_trash(&self, actor: &Actor) -> bool {
        actor.is_admin() && !self.is_self(actor)
    }
}
