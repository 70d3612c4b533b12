//! Golden tests for the complaint lifecycle.
//!
//! Walks full journeys through the state machine (submit -> triage ->
//! resolve -> confirm) and checks the audit-grade properties: one timeline
//! entry per accepted mutation, Closed as an absorbing state, rejected
//! writes leaving the record untouched.

use chrono::Utc;
use ombud_common::complaint::{ComplaintCategory, ComplaintDraft, ComplaintRecord, ComplaintStatus};
use ombud_common::confirm::confirm_resolution;
use ombud_common::error::{OmbudError, PolicyViolation};
use ombud_common::identity::{Identity, Role};
use ombud_common::lifecycle::{apply_agent_update, apply_consumer_edit, AgentUpdate, ConsumerEdit};

fn consumer() -> Identity {
    Identity::new("Dana Vega", Role::Consumer, "acme")
}

fn agent() -> Identity {
    Identity::new("Sam Ortiz", Role::Agent, "acme")
}

fn submitted(owner: &Identity) -> ComplaintRecord {
    ComplaintRecord::create(
        ComplaintDraft {
            category: ComplaintCategory::TechnicalIssue,
            title: "VPN down".to_string(),
            description: "Cannot connect to VPN since Monday".to_string(),
        },
        owner,
        "#Ref-1001".to_string(),
        Utc::now(),
    )
}

// =============================================================================
// GOLDEN TEST 1: the happy path, submission through confirmation
// =============================================================================

#[test]
fn test_full_journey_submit_triage_resolve_confirm() {
    let owner = consumer();
    let handler = agent();
    let now = Utc::now();

    let record = submitted(&owner);
    assert_eq!(record.status, ComplaintStatus::Open);
    assert_eq!(record.resolution_notes, "");
    assert_eq!(record.timeline.len(), 1);

    // Agent writes notes; Open moves to InProgress.
    let record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            resolution_notes: Some("Replaced the expired certificate".to_string()),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    assert_eq!(record.status, ComplaintStatus::InProgress);
    assert_eq!(record.timeline.len(), 2);

    // Agent marks it resolved.
    let record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    assert_eq!(record.status, ComplaintStatus::Resolved);
    assert_eq!(record.timeline.len(), 3);

    // Owner confirms with a rating.
    let record = confirm_resolution(&record, &owner, 4, "Quick fix", now).unwrap();
    assert_eq!(record.status, ComplaintStatus::Closed);
    assert_eq!(record.rating, Some(4));
    assert_eq!(record.feedback.as_deref(), Some("Quick fix"));
    assert_eq!(record.timeline.len(), 4);

    let events: Vec<&str> = record.timeline.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(
        events,
        vec![
            "Complaint Submitted",
            "Status Updated to \"In Progress\"",
            "Status Updated to \"Resolved\"",
            "Resolution Confirmed by Consumer",
        ]
    );
}

// =============================================================================
// GOLDEN TEST 2: timeline grows by exactly one per accepted mutation
// =============================================================================

#[test]
fn test_timeline_grows_one_entry_per_mutation() {
    let owner = consumer();
    let handler = agent();
    let now = Utc::now();
    let mut record = submitted(&owner);

    let updates = [
        AgentUpdate {
            priority: Some(ombud_common::Priority::High),
            ..Default::default()
        },
        AgentUpdate {
            resolution_notes: Some("Looking into it".to_string()),
            ..Default::default()
        },
        AgentUpdate {
            resolution_notes: Some("Root cause found, patch rolling out".to_string()),
            ..Default::default()
        },
        AgentUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
    ];

    for update in &updates {
        let before = record.timeline.len();
        record = apply_agent_update(&record, &handler, update, now).unwrap();
        assert_eq!(record.timeline.len(), before + 1);
        assert!(matches!(
            record.status,
            ComplaintStatus::Open
                | ComplaintStatus::InProgress
                | ComplaintStatus::Resolved
                | ComplaintStatus::Closed
        ));
    }
}

// =============================================================================
// GOLDEN TEST 3: Closed is absorbing
// =============================================================================

#[test]
fn test_closed_is_absorbing() {
    let owner = consumer();
    let handler = agent();
    let now = Utc::now();

    let mut record = submitted(&owner);
    record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            resolution_notes: Some("Fixed".to_string() + " and verified"),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    let closed = confirm_resolution(&record, &owner, 5, "", now).unwrap();
    let timeline_len = closed.timeline.len();

    // Agent write on a closed record: PolicyViolation, record unchanged.
    let err = apply_agent_update(
        &closed,
        &handler,
        &AgentUpdate {
            resolution_notes: Some("One more thing".to_string()),
            ..Default::default()
        },
        now,
    )
    .unwrap_err();
    assert_eq!(err, PolicyViolation::TerminalState);

    // Consumer edit on a closed record: same.
    let err = apply_consumer_edit(
        &closed,
        &owner,
        &ConsumerEdit {
            title: Some("Reopened?".to_string()),
            description: None,
        },
        now,
    )
    .unwrap_err();
    assert_eq!(err, PolicyViolation::TerminalState);

    // Second confirmation: rejected, rating keeps its first value.
    let err = confirm_resolution(&closed, &owner, 1, "changed my mind", now).unwrap_err();
    assert!(matches!(
        err,
        OmbudError::Policy(PolicyViolation::TerminalState)
    ));

    assert_eq!(closed.status, ComplaintStatus::Closed);
    assert_eq!(closed.rating, Some(5));
    assert_eq!(closed.timeline.len(), timeline_len);
}

// =============================================================================
// GOLDEN TEST 4: rejected writes never leave partial state behind
// =============================================================================

#[test]
fn test_rejected_write_leaves_record_intact() {
    let owner = consumer();
    let record = submitted(&owner);
    let snapshot = record.clone();

    // Consumer tries to write agent fields.
    let err = apply_agent_update(
        &record,
        &owner,
        &AgentUpdate {
            resolution_notes: Some("I resolve this myself".to_string()),
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, PolicyViolation::FieldNotWritable { .. }));
    assert_eq!(record, snapshot);

    // Agent tries an illegal jump.
    let err = apply_agent_update(
        &record,
        &agent(),
        &AgentUpdate {
            status: Some(ComplaintStatus::Closed),
            ..Default::default()
        },
        Utc::now(),
    )
    .unwrap_err();
    assert!(matches!(err, PolicyViolation::IllegalTransition { .. }));
    assert_eq!(record, snapshot);
}

// =============================================================================
// GOLDEN TEST 5: reopen loop keeps the consumer lock in place
// =============================================================================

#[test]
fn test_reopen_does_not_restore_consumer_edit_rights() {
    let owner = consumer();
    let handler = agent();
    let now = Utc::now();

    let mut record = submitted(&owner);
    record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            resolution_notes: Some("First pass at a fix".to_string()),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    // Reopen.
    record = apply_agent_update(
        &record,
        &handler,
        &AgentUpdate {
            status: Some(ComplaintStatus::InProgress),
            ..Default::default()
        },
        now,
    )
    .unwrap();
    assert_eq!(record.status, ComplaintStatus::InProgress);

    let err = apply_consumer_edit(
        &record,
        &owner,
        &ConsumerEdit {
            title: Some("Still broken".to_string()),
            description: None,
        },
        now,
    )
    .unwrap_err();
    // At InProgress the consumer has no edit capability at all.
    assert!(matches!(err, PolicyViolation::FieldNotWritable { .. }));
}
