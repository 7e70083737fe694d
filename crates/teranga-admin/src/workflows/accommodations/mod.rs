//! Hotels, lodges and other stays listed on the platform.

pub mod domain;
pub mod router;
pub mod service;


pub use domain::{Accommodation, AccommodationDraft, AccommodationId, AccommodationKind, Availability};
pub use router::accommodation_router;
pub use service::{AccommodationQuery, AccommodationService, AccommodationSort};
