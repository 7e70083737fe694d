use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ContentId, ContentKind, ContentRecord, ContentStatus};
use super::timer::{TimeRemaining, Urgency};

/// Kind filter as accepted on the query string (`all` by default).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    Event,
    Tour,
}

impl KindFilter {
    pub fn matches(self, kind: ContentKind) -> bool {
        match self {
            Self::All => true,
            Self::Event => kind == ContentKind::Event,
            Self::Tour => kind == ContentKind::Tour,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl UrgencyFilter {
    pub fn matches(self, urgency: Urgency) -> bool {
        match self {
            Self::All => true,
            Self::High => urgency == Urgency::High,
            Self::Medium => urgency == Urgency::Medium,
            Self::Low => urgency == Urgency::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueFilter {
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub urgency: UrgencyFilter,
}

/// One pending listing as shown to moderators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub id: ContentId,
    pub kind: ContentKind,
    pub title: String,
    pub owner_id: String,
    pub owner_name: String,
    pub location: String,
    pub submitted_at: DateTime<Utc>,
    pub auto_publish_at: DateTime<Utc>,
    pub time_remaining: String,
    pub expired: bool,
    pub urgency: Urgency,
}

impl QueueEntry {
    fn from_record(record: &ContentRecord, now: DateTime<Utc>) -> Option<Self> {
        if record.status != ContentStatus::PendingReview {
            return None;
        }
        let submitted_at = record.submitted_at?;
        let auto_publish_at = record.auto_publish_at?;
        let remaining = TimeRemaining::between(now, auto_publish_at);

        Some(Self {
            id: record.id.clone(),
            kind: record.kind,
            title: record.details.title.clone(),
            owner_id: record.owner_id.clone(),
            owner_name: record.owner_name.clone(),
            location: record.details.location.clone(),
            submitted_at,
            auto_publish_at,
            time_remaining: remaining.to_string(),
            expired: remaining.is_expired(),
            urgency: Urgency::classify(now, auto_publish_at),
        })
    }
}

/// Pending listings, most urgent first, then earliest deadline first.
pub fn validation_queue<'a>(
    records: impl IntoIterator<Item = &'a ContentRecord>,
    now: DateTime<Utc>,
    filter: QueueFilter,
) -> Vec<QueueEntry> {
    let mut entries: Vec<QueueEntry> = records
        .into_iter()
        .filter_map(|record| QueueEntry::from_record(record, now))
        .filter(|entry| filter.kind.matches(entry.kind))
        .filter(|entry| filter.urgency.matches(entry.urgency))
        .collect();

    entries.sort_by(|a, b| {
        (Reverse(a.urgency.rank()), a.auto_publish_at, &a.id).cmp(&(
            Reverse(b.urgency.rank()),
            b.auto_publish_at,
            &b.id,
        ))
    });
    entries
}

/// Counters for the moderation dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total_pending: usize,
    pub events_pending: usize,
    pub tours_pending: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Not yet expired and due within 24 hours.
    pub expiring_soon: usize,
    pub expired: usize,
}

impl QueueStats {
    pub fn from_entries(entries: &[QueueEntry], now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            stats.total_pending += 1;
            match entry.kind {
                ContentKind::Event => stats.events_pending += 1,
                ContentKind::Tour => stats.tours_pending += 1,
            }
            match entry.urgency {
                Urgency::High => stats.high += 1,
                Urgency::Medium => stats.medium += 1,
                Urgency::Low => stats.low += 1,
            }
            if entry.expired {
                stats.expired += 1;
            } else if entry.auto_publish_at - now <= chrono::Duration::hours(24) {
                stats.expiring_soon += 1;
            }
        }
        stats
    }
}
