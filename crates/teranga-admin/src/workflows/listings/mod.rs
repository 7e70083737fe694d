//! Guided tours and events: submission, moderation and the 48 hour
//! auto-publish window.

pub mod domain;
pub mod lifecycle;
pub mod notify;
pub mod queue;
pub mod router;
pub mod service;
pub mod sweep;
pub mod timer;

#[cfg(test)]
mod tests;

pub use domain::{ContentId, ContentKind, ContentRecord, ContentStatus, ListingDetails};
pub use lifecycle::{
    auto_publish_window, AutoPublishOutcome, LifecycleAction, LifecycleError,
    AUTO_PUBLISH_WINDOW_HOURS,
};
pub use notify::{NotificationError, NotificationPublisher, OwnerNotice};
pub use queue::{validation_queue, KindFilter, QueueEntry, QueueFilter, QueueStats, UrgencyFilter};
pub use router::{listing_router, CreateListingRequest, ListingView, RejectRequest};
pub use service::{ListingFilter, ListingService, ListingServiceError, SweepReport};
pub use sweep::spawn_auto_publish_sweeper;
pub use timer::{TimeRemaining, Urgency};
