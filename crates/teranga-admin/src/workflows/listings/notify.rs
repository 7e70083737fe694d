use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::ContentId;

/// Outbound hook used to tell owners about moderation outcomes.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: OwnerNotice) -> Result<(), NotificationError>;
}

/// Notice payload; `template` names the message, `details` fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerNotice {
    pub template: String,
    pub content_id: ContentId,
    pub owner_id: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
