use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::actor::{Actor, ActorRole};
use crate::workflows::catalog::{CatalogEntry, Collection};

/// Identifier wrapper for guided tours and events.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The two kinds of listing that go through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Event,
    Tour,
}

impl ContentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Tour => "tour",
        }
    }

    /// Roles allowed to own a listing of this kind, besides admins.
    pub const fn owner_role(self) -> ActorRole {
        match self {
            Self::Event => ActorRole::Organizer,
            Self::Tour => ActorRole::Guide,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    PendingReview,
    AutoPublished,
    Published,
    Rejected,
    Suspended,
    Cancelled,
}

impl ContentStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Draft,
            Self::PendingReview,
            Self::AutoPublished,
            Self::Published,
            Self::Rejected,
            Self::Suspended,
            Self::Cancelled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::AutoPublished => "auto_published",
            Self::Published => "published",
            Self::Rejected => "rejected",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Visible to tourists.
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Published | Self::AutoPublished)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive fields the owner edits; none of them affect the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub location: String,
    /// Price per participant in FCFA.
    #[serde(default)]
    pub price_fcfa: u32,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ListingDetails {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("location must not be empty".to_string());
        }
        if self.capacity == Some(0) {
            return Err("capacity must be greater than zero when provided".to_string());
        }
        Ok(())
    }
}

/// A guided tour or event together with its validation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,
    pub kind: ContentKind,
    pub owner_id: String,
    pub owner_name: String,
    pub details: ListingDetails,
    pub status: ContentStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub auto_publish_at: Option<DateTime<Utc>>,
    pub validated_by: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRecord {
    /// A fresh draft owned by `owner`.
    pub fn draft(
        id: ContentId,
        kind: ContentKind,
        owner: &Actor,
        details: ListingDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            owner_id: owner.id.clone(),
            owner_name: owner.name.clone(),
            details,
            status: ContentStatus::Draft,
            submitted_at: None,
            auto_publish_at: None,
            validated_by: None,
            validated_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        self.owner_id == actor.id
    }
}

impl CatalogEntry for ContentRecord {
    type Id = ContentId;

    const COLLECTION: Collection = Collection::Listings;

    fn id(&self) -> &ContentId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.details.title
    }

    fn can_trash(&self, actor: &Actor) -> bool {
        actor.is_admin() || self.is_owned_by(actor)
    }
}
