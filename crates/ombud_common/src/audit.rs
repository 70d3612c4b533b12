//! Audit entry types.
//!
//! Every accepted mutation and every login produces one entry. Entries are
//! append-only for the lifetime of the log; the daemon persists them as
//! JSONL and serves them back per tenant.

use crate::identity::{Identity, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One append-only audit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub tenant_id: String,
    /// Display name of the acting identity.
    pub user: String,
    pub role: Role,
    /// Machine-readable action label, e.g. `complaint_created`.
    pub action: String,
    /// Human-readable context, e.g. the complaint reference.
    pub details: String,
}

impl AuditEntry {
    pub fn new(actor: &Identity, action: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            tenant_id: actor.tenant_id.clone(),
            user: actor.name.clone(),
            role: actor.role,
            action: action.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_captures_actor() {
        let actor = Identity::new("Sam Ortiz", Role::Agent, "acme");
        let entry = AuditEntry::new(&actor, "resolution_updated", "#Ref-1001");

        assert_eq!(entry.tenant_id, "acme");
        assert_eq!(entry.user, "Sam Ortiz");
        assert_eq!(entry.role, Role::Agent);
        assert_eq!(entry.action, "resolution_updated");
    }

    #[test]
    fn test_entry_serializes_as_jsonl_line() {
        let actor = Identity::new("Dana Vega", Role::Consumer, "acme");
        let entry = AuditEntry::new(&actor, "complaint_created", "#Ref-1001");

        let line = serde_json::to_string(&entry).unwrap();
        let back: AuditEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back, entry);
    }
}
