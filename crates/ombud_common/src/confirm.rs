//! Resolution confirmation flow.
//!
//! The bounded sub-workflow a consumer triggers to accept a resolution:
//! rate the handling, optionally leave feedback, and close the complaint.
//! This is the only path that ever sets `rating` and `feedback`.

use crate::complaint::{validate_rating, ComplaintRecord, ComplaintStatus};
use crate::error::{OmbudError, PolicyViolation};
use crate::identity::Identity;
use crate::lifecycle::capabilities_for;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Confirm a resolved complaint: set the rating, record feedback and close.
///
/// Fails with `ValidationError` for a rating outside `[1, 5]` and with
/// `PolicyViolation` for anything the lifecycle forbids: wrong state, wrong
/// actor, or a second confirmation of an already closed record (which must
/// never overwrite the existing rating).
pub fn confirm_resolution(
    record: &ComplaintRecord,
    actor: &Identity,
    rating: u8,
    feedback: &str,
    now: DateTime<Utc>,
) -> Result<ComplaintRecord, OmbudError> {
    validate_rating(rating)?;

    if actor.tenant_id != record.tenant_id {
        return Err(PolicyViolation::WrongTenant.into());
    }
    if record.is_closed() {
        // Terminal state: the first confirmation's rating stands.
        return Err(PolicyViolation::TerminalState.into());
    }
    if actor.id != record.owner_id {
        return Err(PolicyViolation::NotOwner.into());
    }

    let caps = capabilities_for(actor.role, record.status);
    if !caps.can_transition_to.contains(&ComplaintStatus::Closed) {
        return Err(PolicyViolation::IllegalTransition {
            from: record.status,
            to: ComplaintStatus::Closed,
            role: actor.role,
        }
        .into());
    }

    let mut next = record.with_timeline_entry("Resolution Confirmed by Consumer", now);
    next.status = ComplaintStatus::Closed;
    next.rating = Some(rating);
    let feedback = feedback.trim();
    next.feedback = (!feedback.is_empty()).then(|| feedback.to_string());

    debug!(reference = %next.reference, rating, "resolution confirmed");
    Ok(next)
}
