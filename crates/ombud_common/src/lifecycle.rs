//! Lifecycle policy: who may change what, in which state.
//!
//! The state machine is `Open -> InProgress -> Resolved -> Closed` with one
//! backward edge (`Resolved -> InProgress`, agent reopen) and `Closed` as an
//! absorbing terminal state. Both the daemon and the CLI consult the same
//! `capabilities_for` table, so role-conditional behavior lives in exactly
//! one place.
//!
//! Every accepted mutation appends exactly one timeline entry and bumps
//! `updated_at` to that entry's timestamp. A rejected mutation returns the
//! record untouched.

use crate::complaint::{ComplaintField, ComplaintRecord, ComplaintStatus, Priority};
use crate::error::PolicyViolation;
use crate::identity::{Identity, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// What a role may do to a complaint in a given status.
///
/// Pure function of `(role, status)`; record-level guards (ownership, the
/// one-way consumer edit lock, the resolution-notes guard) are applied on
/// top by the `apply_*` functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub can_edit_fields: BTreeSet<ComplaintField>,
    pub can_transition_to: BTreeSet<ComplaintStatus>,
}

/// Resolve the capability set for a role at a lifecycle state.
pub fn capabilities_for(role: Role, status: ComplaintStatus) -> Capabilities {
    use ComplaintField::*;
    use ComplaintStatus::*;

    let mut caps = Capabilities::default();
    match role {
        Role::Agent => {
            if status != Closed {
                caps.can_edit_fields =
                    BTreeSet::from([ResolutionNotes, Status, Priority, AssignedTo]);
                caps.can_transition_to = match status {
                    Open => BTreeSet::from([InProgress]),
                    InProgress => BTreeSet::from([Resolved]),
                    Resolved => BTreeSet::from([InProgress]),
                    Closed => BTreeSet::new(),
                };
            }
        }
        Role::Consumer => match status {
            Open => caps.can_edit_fields = BTreeSet::from([Title, Description]),
            Resolved => caps.can_transition_to = BTreeSet::from([Closed]),
            _ => {}
        },
        // Admins observe; they never mutate complaints.
        Role::Admin => {}
    }
    caps
}

/// An agent's "Save Changes": any subset of the agent-writable fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// A consumer's pre-resolution edit of the complaint text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsumerEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Apply an agent save to a record.
///
/// Writing resolution notes drives the status forward per the transition
/// table: notes on an `Open` record move it to `InProgress`, notes on a
/// `Resolved` record reopen it. An explicit status change and a notes write
/// in the same save count as one mutation and produce one timeline entry,
/// the status one.
pub fn apply_agent_update(
    record: &ComplaintRecord,
    actor: &Identity,
    update: &AgentUpdate,
    now: DateTime<Utc>,
) -> Result<ComplaintRecord, PolicyViolation> {
    if actor.tenant_id != record.tenant_id {
        return Err(PolicyViolation::WrongTenant);
    }
    if record.is_closed() {
        return Err(PolicyViolation::TerminalState);
    }

    let caps = capabilities_for(actor.role, record.status);

    let new_notes = update.resolution_notes.as_deref().map(str::trim);
    let notes_changed = new_notes.map_or(false, |n| n != record.resolution_notes);
    let requested_status = update.status.filter(|s| *s != record.status);
    let new_priority = update.priority.filter(|p| *p != record.priority);
    let new_assignee = update
        .assigned_to
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty() && record.assigned_to.as_deref() != Some(*a));

    let writes = [
        (notes_changed, ComplaintField::ResolutionNotes),
        (requested_status.is_some(), ComplaintField::Status),
        (new_priority.is_some(), ComplaintField::Priority),
        (new_assignee.is_some(), ComplaintField::AssignedTo),
    ];
    for (written, field) in writes {
        if written && !caps.can_edit_fields.contains(&field) {
            debug!(%field, role = %actor.role, status = %record.status, "field write denied");
            return Err(PolicyViolation::FieldNotWritable {
                field,
                role: actor.role,
                status: record.status,
            });
        }
    }

    let mut next_status = record.status;
    if let Some(target) = requested_status {
        if !caps.can_transition_to.contains(&target) {
            debug!(from = %record.status, to = %target, "transition denied");
            return Err(PolicyViolation::IllegalTransition {
                from: record.status,
                to: target,
                role: actor.role,
            });
        }
        next_status = target;
    } else if notes_changed {
        next_status = match record.status {
            ComplaintStatus::Open => ComplaintStatus::InProgress,
            // Editing notes again reopens a resolved complaint.
            ComplaintStatus::Resolved => ComplaintStatus::InProgress,
            other => other,
        };
    }

    if next_status == ComplaintStatus::Resolved && record.status != ComplaintStatus::Resolved {
        let final_notes = new_notes.unwrap_or(record.resolution_notes.as_str());
        if final_notes.is_empty() {
            return Err(PolicyViolation::MissingResolutionNotes);
        }
    }

    let status_changed = next_status != record.status;
    if !status_changed && !notes_changed && new_priority.is_none() && new_assignee.is_none() {
        // Nothing effectively changed: not a mutation, no timeline entry.
        return Ok(record.clone());
    }

    let event = if status_changed {
        format!("Status Updated to \"{next_status}\"")
    } else if notes_changed {
        if record.has_resolution_notes() {
            "Resolution Notes Updated".to_string()
        } else {
            "Resolution Notes Added".to_string()
        }
    } else if let Some(priority) = new_priority {
        format!("Priority Changed to \"{priority}\"")
    } else {
        format!("Assigned to {}", new_assignee.unwrap_or_default())
    };

    let mut next = record.with_timeline_entry(event, now);
    next.status = next_status;
    if notes_changed {
        next.resolution_notes = new_notes.unwrap_or_default().to_string();
    }
    if let Some(priority) = new_priority {
        next.priority = priority;
    }
    if let Some(assignee) = new_assignee {
        next.assigned_to = Some(assignee.to_string());
    } else if next.assigned_to.is_none() && (status_changed || notes_changed) {
        // First agent action claims the complaint.
        next.assigned_to = Some(actor.name.clone());
    }
    next.consumer_edit_locked = true;

    debug!(reference = %next.reference, status = %next.status, "agent update accepted");
    Ok(next)
}

/// Apply a consumer's title/description edit.
///
/// Allowed only for the owning consumer, only while the record is `Open`
/// and no agent has acted yet. The lock is one-way: once an agent has
/// written anything the consumer never regains edit rights.
pub fn apply_consumer_edit(
    record: &ComplaintRecord,
    actor: &Identity,
    edit: &ConsumerEdit,
    now: DateTime<Utc>,
) -> Result<ComplaintRecord, PolicyViolation> {
    if actor.tenant_id != record.tenant_id {
        return Err(PolicyViolation::WrongTenant);
    }
    if record.is_closed() {
        return Err(PolicyViolation::TerminalState);
    }
    if actor.id != record.owner_id {
        return Err(PolicyViolation::NotOwner);
    }

    let caps = capabilities_for(actor.role, record.status);

    let new_title = edit
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| *t != record.title);
    let new_description = edit
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| *d != record.description);

    let writes = [
        (new_title.is_some(), ComplaintField::Title),
        (new_description.is_some(), ComplaintField::Description),
    ];
    for (written, field) in writes {
        if written && !caps.can_edit_fields.contains(&field) {
            return Err(PolicyViolation::FieldNotWritable {
                field,
                role: actor.role,
                status: record.status,
            });
        }
    }

    if new_title.is_none() && new_description.is_none() {
        return Ok(record.clone());
    }

    if record.consumer_edit_locked || record.has_resolution_notes() {
        return Err(PolicyViolation::ConsumerEditLocked);
    }

    let mut next = record.with_timeline_entry("Complaint Details Updated", now);
    if let Some(title) = new_title {
        next.title = title.to_string();
    }
    if let Some(description) = new_description {
        next.description = description.to_string();
    }
    Ok(next)
}
