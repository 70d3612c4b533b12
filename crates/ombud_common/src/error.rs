//! Error taxonomy for the complaint desk.
//!
//! Four failure kinds cross the system: `ValidationError` (malformed input,
//! recoverable locally), `PolicyViolation` (illegal transition or
//! unauthorized write, record left unchanged), `Transport` (retryable
//! network/server failure) and `NotFound` (terminal for that view). None of
//! them is ever swallowed; every failure path leaves the prior record value
//! intact.

use crate::complaint::{ComplaintField, ComplaintStatus};
use crate::identity::Role;
use thiserror::Error;

/// Malformed input, caught before any policy or network work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("title must be at least 3 characters")]
    TitleTooShort,

    #[error("description must be at least 10 characters")]
    DescriptionTooShort,

    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
}

/// An illegal transition or unauthorized field write. The offending record
/// is always returned to the caller unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("status cannot change from \"{from}\" to \"{to}\" for role {role}")]
    IllegalTransition {
        from: ComplaintStatus,
        to: ComplaintStatus,
        role: Role,
    },

    #[error("{field} is not writable by role {role} while status is \"{status}\"")]
    FieldNotWritable {
        field: ComplaintField,
        role: Role,
        status: ComplaintStatus,
    },

    #[error("complaint is closed and can no longer be modified")]
    TerminalState,

    #[error("only the owning consumer may perform this action")]
    NotOwner,

    #[error("actor does not belong to the complaint's tenant")]
    WrongTenant,

    #[error("complaint can no longer be edited once an agent has acted on it")]
    ConsumerEditLocked,

    #[error("resolution notes are required before a complaint can be resolved")]
    MissingResolutionNotes,
}

/// Top-level error for the complaint desk.
///
/// `Validation` and `Policy` originate locally and carry structure;
/// `Rejected` is their flattened form when a server turned the same checks
/// down and only the message survives the wire.
#[derive(Error, Debug)]
pub enum OmbudError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("policy violation: {0}")]
    Policy(#[from] PolicyViolation),

    #[error("{0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl OmbudError {
    /// Stable wire identifier for the error kind, carried in API error
    /// bodies so clients can rebuild the taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Policy(_) => "policy_violation",
            Self::Rejected(_) => "policy_violation",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Transport(_) => "transport",
        }
    }

    /// Rebuild an error from a wire `{error, kind}` body. Unknown kinds
    /// degrade to `Transport` so they stay visibly retryable.
    pub fn from_wire(kind: &str, message: String) -> Self {
        match kind {
            "validation" | "policy_violation" => Self::Rejected(message),
            "not_found" => Self::NotFound(message),
            "unauthorized" => Self::Unauthorized(message),
            _ => Self::Transport(message),
        }
    }

    /// Only transport failures are safe to blindly re-attempt; the server
    /// is the idempotency authority for mutations.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let err = OmbudError::NotFound("complaint 42".to_string());
        let rebuilt = OmbudError::from_wire(err.kind(), err.to_string());
        assert!(matches!(rebuilt, OmbudError::NotFound(_)));
    }

    #[test]
    fn test_unknown_kind_degrades_to_transport() {
        let err = OmbudError::from_wire("gateway_timeout", "upstream died".to_string());
        assert!(matches!(err, OmbudError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_policy_violation_is_not_retryable() {
        let err = OmbudError::Policy(PolicyViolation::TerminalState);
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "policy_violation");
    }

    #[test]
    fn test_violation_messages_name_the_offender() {
        let v = PolicyViolation::FieldNotWritable {
            field: ComplaintField::ResolutionNotes,
            role: Role::Consumer,
            status: ComplaintStatus::Open,
        };
        assert!(v.to_string().contains("resolution notes"));
        assert!(v.to_string().contains("Consumer"));
    }
}
