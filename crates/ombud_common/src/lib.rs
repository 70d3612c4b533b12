//! Shared types and lifecycle policy for the Ombud complaint desk.
//!
//! The daemon (`ombudd`) is the policy authority; the CLI (`ombudctl`)
//! consults the same capability tables as a UX mirror. Both sides link this
//! crate so the rules cannot drift apart.

pub mod api;
pub mod audit;
pub mod complaint;
pub mod confirm;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod query;

pub use audit::AuditEntry;
pub use complaint::{
    ComplaintCategory, ComplaintDraft, ComplaintField, ComplaintRecord, ComplaintStatus, Priority,
    TimelineEntry,
};
pub use confirm::confirm_resolution;
pub use error::{OmbudError, PolicyViolation, ValidationError};
pub use identity::{Identity, Role};
pub use lifecycle::{
    apply_agent_update, apply_consumer_edit, capabilities_for, AgentUpdate, Capabilities,
    ConsumerEdit,
};
pub use query::{query, ComplaintQuery, QueryPage, DEFAULT_PAGE_SIZE};
