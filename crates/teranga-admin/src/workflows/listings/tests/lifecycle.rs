use super::common::*;
use chrono::Duration;

use crate::workflows::listings::domain::{ContentKind, ContentRecord, ContentStatus};
use crate::workflows::listings::lifecycle::{
    auto_publish_window, AutoPublishOutcome, LifecycleAction, LifecycleError,
};
use crate::workflows::listings::timer::{TimeRemaining, Urgency};

fn draft() -> ContentRecord {
    ContentRecord::draft(
        "tour-000001".into(),
        ContentKind::Tour,
        &guide(),
        details("Circuit Gorée"),
        at(19, 8),
    )
}

fn assert_timestamps_paired(record: &ContentRecord) {
    assert_eq!(
        record.submitted_at.is_none(),
        record.auto_publish_at.is_none(),
        "submitted_at and auto_publish_at must be set together: {record:?}"
    );
    if record.status == ContentStatus::PendingReview {
        let submitted = record.submitted_at.expect("pending records are submitted");
        assert_eq!(record.auto_publish_at, Some(submitted + auto_publish_window()));
    }
}

#[test]
fn submission_schedules_publication_two_days_later() {
    let mut record = draft();
    record.submit(submitted_at()).expect("draft submits");

    assert_eq!(record.status, ContentStatus::PendingReview);
    assert_eq!(record.auto_publish_at, Some(at(22, 10)));

    let one_hour_left = record.time_remaining(at(22, 9)).expect("pending");
    assert_eq!(one_hour_left.to_string(), "1h 0m");

    let late = record.time_remaining(at(22, 11)).expect("pending");
    assert_eq!(late, TimeRemaining::Expired);
    assert_eq!(late.to_string(), "Expired");
    assert_eq!(Urgency::classify(at(22, 11), at(22, 10)), Urgency::High);
}

#[test]
fn timestamps_stay_paired_through_every_transition() {
    let mut record = draft();
    assert_timestamps_paired(&record);

    record.submit(submitted_at()).unwrap();
    assert_timestamps_paired(&record);

    record.cancel_submission(at(20, 12)).unwrap();
    assert_timestamps_paired(&record);
    assert_eq!(record.status, ContentStatus::Draft);
    assert!(record.submitted_at.is_none());

    record.submit(at(20, 13)).unwrap();
    record.reject("Photos manquantes", at(20, 14)).unwrap();
    assert_timestamps_paired(&record);

    record.submit(at(21, 9)).unwrap();
    assert_timestamps_paired(&record);
    assert_eq!(record.rejection_reason, None);
    assert_eq!(record.auto_publish_at, Some(at(23, 9)));

    assert_eq!(record.auto_publish(at(23, 9)), AutoPublishOutcome::Published);
    assert_timestamps_paired(&record);
}

#[test]
fn auto_publish_is_idempotent() {
    let mut record = draft();
    record.submit(submitted_at()).unwrap();

    assert_eq!(record.auto_publish(at(22, 10)), AutoPublishOutcome::Published);
    let once = record.clone();
    assert_eq!(
        record.auto_publish(at(22, 12)),
        AutoPublishOutcome::AlreadyPublished
    );
    assert_eq!(record, once);
    assert_eq!(record.status, ContentStatus::AutoPublished);
}

#[test]
fn auto_publish_waits_for_deadline() {
    let mut record = draft();
    record.submit(submitted_at()).unwrap();
    let before = record.clone();

    match record.auto_publish(at(22, 9)) {
        AutoPublishOutcome::NotDue(remaining) => assert_eq!(remaining.to_string(), "1h 0m"),
        other => panic!("expected not due, got {other:?}"),
    }
    assert_eq!(record, before);
}

#[test]
fn approval_wins_over_later_timeout() {
    let mut record = draft();
    record.submit(submitted_at()).unwrap();
    record.approve("Aminata Sow", at(21, 8)).unwrap();

    assert_eq!(
        record.auto_publish(at(22, 11)),
        AutoPublishOutcome::Superseded(ContentStatus::Published)
    );
    assert_eq!(record.status, ContentStatus::Published);
    assert_eq!(record.validated_by.as_deref(), Some("Aminata Sow"));
    assert_eq!(record.validated_at, Some(at(21, 8)));
}

#[test]
fn blank_rejection_reason_leaves_record_pending() {
    let mut record = draft();
    record.submit(submitted_at()).unwrap();
    let before = record.clone();

    for reason in ["", "   "] {
        assert!(matches!(
            record.reject(reason, at(21, 8)),
            Err(LifecycleError::Validation(_))
        ));
    }
    assert_eq!(record, before);
    assert_eq!(record.status, ContentStatus::PendingReview);
}

#[test]
fn transitions_require_expected_status() {
    let mut record = draft();
    assert_eq!(
        record.approve("Aminata Sow", at(20, 9)),
        Err(LifecycleError::InvalidStateTransition {
            from: ContentStatus::Draft,
            action: LifecycleAction::Approve,
        })
    );
    assert!(record.cancel_submission(at(20, 9)).is_err());
    assert!(record.suspend(at(20, 9)).is_err());

    record.submit(submitted_at()).unwrap();
    assert!(record.submit(submitted_at()).is_err());

    record.approve("Aminata Sow", at(20, 11)).unwrap();
    record.suspend(at(21, 8)).unwrap();
    assert_eq!(record.status, ContentStatus::Suspended);
    assert!(record.cancel(at(21, 9)).is_err());
    record.reinstate(at(21, 10)).unwrap();
    assert_eq!(record.status, ContentStatus::Published);
    record.cancel(at(21, 11)).unwrap();
    assert_eq!(record.status, ContentStatus::Cancelled);
    assert!(record.edit(details("Nouveau titre"), at(21, 12)).is_err());
}

#[test]
fn decided_records_keep_their_last_review_window() {
    let mut rejected = draft();
    rejected.submit(submitted_at()).unwrap();
    rejected.reject("Photos manquantes", at(20, 12)).unwrap();

    let mut approved = draft();
    approved.submit(submitted_at()).unwrap();
    approved.approve("Aminata Sow", at(20, 12)).unwrap();

    for record in [&mut rejected, &mut approved] {
        assert_timestamps_paired(record);
        assert_eq!(record.submitted_at, Some(submitted_at()));
        assert_eq!(record.auto_publish_at, Some(at(22, 10)));
        assert_eq!(record.time_remaining(at(23, 0)), None);
        let status = record.status;
        assert_eq!(
            record.auto_publish(at(23, 0)),
            AutoPublishOutcome::Superseded(status)
        );
        assert_eq!(record.status, status);
    }
}

#[test]
fn cancel_submission_clears_validation_fields() {
    let mut record = draft();
    record.submit(submitted_at()).unwrap();
    record.validated_by = Some("stale".to_string());
    record.validated_at = Some(submitted_at() + Duration::minutes(5));

    record.cancel_submission(at(20, 11)).unwrap();
    assert_eq!(record.status, ContentStatus::Draft);
    assert_eq!(record.validated_by, None);
    assert_eq!(record.validated_at, None);
    assert_eq!(record.auto_publish_at, None);
}
