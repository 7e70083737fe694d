use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::domain::{ContentRecord, ContentStatus};
use super::timer::TimeRemaining;

/// Delay between submission and automatic publication.
pub const AUTO_PUBLISH_WINDOW_HOURS: i64 = 48;

pub fn auto_publish_window() -> Duration {
    Duration::hours(AUTO_PUBLISH_WINDOW_HOURS)
}

/// Named lifecycle actions, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Submit,
    Approve,
    Reject,
    AutoPublish,
    CancelSubmission,
    Suspend,
    Reinstate,
    Cancel,
    Edit,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::AutoPublish => "auto_publish",
            Self::CancelSubmission => "cancel_submission",
            Self::Suspend => "suspend",
            Self::Reinstate => "reinstate",
            Self::Cancel => "cancel",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule violations raised by the pure transitions below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} a listing in status {from}")]
    InvalidStateTransition {
        from: ContentStatus,
        action: LifecycleAction,
    },
    #[error("{0}")]
    Validation(String),
}

/// Result of evaluating the timeout transition against one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPublishOutcome {
    Published,
    AlreadyPublished,
    /// An admin or owner action moved the record out of review first.
    Superseded(ContentStatus),
    NotDue(TimeRemaining),
}

impl AutoPublishOutcome {
    pub fn changed(self) -> bool {
        matches!(self, Self::Published)
    }
}

fn require(
    record: &ContentRecord,
    action: LifecycleAction,
    allowed: &[ContentStatus],
) -> Result<(), LifecycleError> {
    if allowed.contains(&record.status) {
        Ok(())
    } else {
        Err(LifecycleError::InvalidStateTransition {
            from: record.status,
            action,
        })
    }
}

impl ContentRecord {
    /// `Draft | Rejected -> PendingReview`, starting the 48h window.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(
            self,
            LifecycleAction::Submit,
            &[ContentStatus::Draft, ContentStatus::Rejected],
        )?;
        self.status = ContentStatus::PendingReview;
        self.submitted_at = Some(now);
        self.auto_publish_at = Some(now + auto_publish_window());
        self.validated_by = None;
        self.validated_at = None;
        self.rejection_reason = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn approve(&mut self, admin: &str, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(self, LifecycleAction::Approve, &[ContentStatus::PendingReview])?;
        self.status = ContentStatus::Published;
        self.validated_by = Some(admin.to_string());
        self.validated_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// The status is checked first; a blank reason then fails validation and
    /// leaves the record untouched.
    pub fn reject(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(self, LifecycleAction::Reject, &[ContentStatus::PendingReview])?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::Validation(
                "a rejection reason is required".to_string(),
            ));
        }
        self.status = ContentStatus::Rejected;
        self.rejection_reason = Some(reason.to_string());
        self.updated_at = now;
        Ok(())
    }

    /// Timeout transition. Never fails: anything other than a due pending
    /// record is reported as a no-op outcome.
    pub fn auto_publish(&mut self, now: DateTime<Utc>) -> AutoPublishOutcome {
        match self.status {
            ContentStatus::PendingReview => {}
            ContentStatus::AutoPublished => return AutoPublishOutcome::AlreadyPublished,
            other => return AutoPublishOutcome::Superseded(other),
        }

        let Some(deadline) = self.auto_publish_at else {
            return AutoPublishOutcome::Superseded(self.status);
        };
        let remaining = TimeRemaining::between(now, deadline);
        if !remaining.is_expired() {
            return AutoPublishOutcome::NotDue(remaining);
        }

        self.status = ContentStatus::AutoPublished;
        self.updated_at = now;
        AutoPublishOutcome::Published
    }

    pub fn cancel_submission(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(
            self,
            LifecycleAction::CancelSubmission,
            &[ContentStatus::PendingReview],
        )?;
        self.status = ContentStatus::Draft;
        self.submitted_at = None;
        self.auto_publish_at = None;
        self.validated_by = None;
        self.validated_at = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn suspend(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(
            self,
            LifecycleAction::Suspend,
            &[ContentStatus::Published, ContentStatus::AutoPublished],
        )?;
        self.status = ContentStatus::Suspended;
        self.updated_at = now;
        Ok(())
    }

    pub fn reinstate(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(self, LifecycleAction::Reinstate, &[ContentStatus::Suspended])?;
        self.status = ContentStatus::Published;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        require(
            self,
            LifecycleAction::Cancel,
            &[ContentStatus::Published, ContentStatus::AutoPublished],
        )?;
        self.status = ContentStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Replace the descriptive fields; cancelled listings are frozen.
    pub fn edit(
        &mut self,
        details: super::domain::ListingDetails,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if self.status == ContentStatus::Cancelled {
            return Err(LifecycleError::InvalidStateTransition {
                from: self.status,
                action: LifecycleAction::Edit,
            });
        }
        details.validate().map_err(LifecycleError::Validation)?;
        self.details = details;
        self.updated_at = now;
        Ok(())
    }

    /// Time left before auto-publish, for pending records only.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<TimeRemaining> {
        match (self.status, self.auto_publish_at) {
            (ContentStatus::PendingReview, Some(deadline)) => {
                Some(TimeRemaining::between(now, deadline))
            }
            _ => None,
        }
    }
}
