use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::{CatalogEntry, Collection};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccommodationId(pub String);

impl fmt::Display for AccommodationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AccommodationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AccommodationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccommodationKind {
    Hotel,
    Lodge,
    GuestHouse,
    Campement,
    Apartment,
}

/// Whether the property can currently be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Pending,
    Suspended,
}

impl Availability {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields supplied on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccommodationDraft {
    pub name: String,
    pub kind: AccommodationKind,
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    /// Nightly rate in FCFA.
    pub nightly_rate_fcfa: u32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl AccommodationDraft {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("location must not be empty".to_string());
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(format!("rating {} is outside 0-5", self.rating));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accommodation {
    pub id: AccommodationId,
    pub name: String,
    pub kind: AccommodationKind,
    pub location: String,
    pub address: String,
    pub description: String,
    pub nightly_rate_fcfa: u32,
    pub rating: f32,
    pub amenities: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub availability: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Accommodation {
    pub fn from_draft(id: AccommodationId, draft: AccommodationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            kind: draft.kind,
            location: draft.location,
            address: draft.address,
            description: draft.description,
            nightly_rate_fcfa: draft.nightly_rate_fcfa,
            rating: draft.rating,
            amenities: draft.amenities,
            phone: draft.phone,
            email: draft.email,
            availability: Availability::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_draft(&mut self, draft: AccommodationDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.kind = draft.kind;
        self.location = draft.location;
        self.address = draft.address;
        self.description = draft.description;
        self.nightly_rate_fcfa = draft.nightly_rate_fcfa;
        self.rating = draft.rating;
        self.amenities = draft.amenities;
        self.phone = draft.phone;
        self.email = draft.email;
        self.updated_at = now;
    }
}

impl CatalogEntry for Accommodation {
    type Id = AccommodationId;

    const COLLECTION: Collection = Collection::Accommodations;

    fn id(&self) -> &AccommodationId {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }
}
