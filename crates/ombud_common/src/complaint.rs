//! Complaint record model and field-level validation.
//!
//! A `ComplaintRecord` is the core entity tracked from submission to
//! resolution confirmation. Mutations never happen in place: every accepted
//! change produces a new record value with one more timeline entry, so two
//! structurally equal records always share the same history.

use crate::error::ValidationError;
use crate::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum title length accepted at intake.
pub const MIN_TITLE_CHARS: usize = 3;

/// Minimum description length accepted at intake.
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// Complaint category, fixed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintCategory {
    BillingOrPayments,
    ServiceQuality,
    TechnicalIssue,
    AccountOrAccess,
    ProductOrService,
    EmployeeConduct,
    DataPrivacyOrSecurity,
    Other,
}

impl std::fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BillingOrPayments => write!(f, "Billing / Payments"),
            Self::ServiceQuality => write!(f, "Service Quality"),
            Self::TechnicalIssue => write!(f, "Technical Issue"),
            Self::AccountOrAccess => write!(f, "Account / Access"),
            Self::ProductOrService => write!(f, "Product / Service"),
            Self::EmployeeConduct => write!(f, "Employee Conduct"),
            Self::DataPrivacyOrSecurity => write!(f, "Data Privacy / Security"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl std::str::FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "billingorpayments" | "billingpayments" | "billing" => Ok(Self::BillingOrPayments),
            "servicequality" => Ok(Self::ServiceQuality),
            "technicalissue" | "technical" => Ok(Self::TechnicalIssue),
            "accountoraccess" | "accountaccess" | "account" => Ok(Self::AccountOrAccess),
            "productorservice" | "productservice" | "product" => Ok(Self::ProductOrService),
            "employeeconduct" => Ok(Self::EmployeeConduct),
            "dataprivacyorsecurity" | "dataprivacysecurity" | "dataprivacy" => {
                Ok(Self::DataPrivacyOrSecurity)
            }
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Complaint priority. Set at creation, re-evaluated by agents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Lifecycle status. `Open` is initial, `Closed` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum ComplaintStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl std::fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Resolved => write!(f, "Resolved"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

/// Record fields the lifecycle policy gates per role and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplaintField {
    Title,
    Description,
    ResolutionNotes,
    Status,
    Priority,
    AssignedTo,
}

impl std::fmt::Display for ComplaintField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Description => write!(f, "description"),
            Self::ResolutionNotes => write!(f, "resolution notes"),
            Self::Status => write!(f, "status"),
            Self::Priority => write!(f, "priority"),
            Self::AssignedTo => write!(f, "assignee"),
        }
    }
}

/// One immutable audit line in a complaint's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

/// Intake payload for a new complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintDraft {
    pub category: ComplaintCategory,
    pub title: String,
    pub description: String,
}

impl ComplaintDraft {
    /// Validate the draft before it goes anywhere near the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_description(&self.description)
    }
}

/// Validate a complaint title.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::Required("title"));
    }
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    Ok(())
}

/// Validate a complaint description.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::Required("description"));
    }
    if description.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooShort);
    }
    Ok(())
}

/// Validate a resolution rating.
pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange)
    }
}

/// A consumer complaint tracked through the resolution lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    /// Opaque unique identifier, assigned at creation.
    pub id: Uuid,
    /// Human-readable display code, unique within the tenant.
    pub reference: String,
    pub tenant_id: String,
    /// The consumer who filed the complaint.
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub priority: Priority,
    pub status: ComplaintStatus,

    /// Empty until an agent records a resolution.
    #[serde(default)]
    pub resolution_notes: String,
    /// Handling agent, set on the first agent action.
    #[serde(default)]
    pub assigned_to: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Append-only history; holds at least the creation event.
    pub timeline: Vec<TimelineEntry>,

    /// Set exactly once, by the confirmation flow.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,

    /// One-way lock: flips when an agent first acts and never clears,
    /// even if the status later reverts.
    #[serde(default)]
    pub consumer_edit_locked: bool,
}

impl ComplaintRecord {
    /// Create a new record from a validated draft. Status starts at `Open`
    /// and the timeline is seeded with the mandatory creation event.
    pub fn create(
        draft: ComplaintDraft,
        owner: &Identity,
        reference: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference,
            tenant_id: owner.tenant_id.clone(),
            owner_id: owner.id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            priority: Priority::default(),
            status: ComplaintStatus::Open,
            resolution_notes: String::new(),
            assigned_to: None,
            created_at: now,
            updated_at: now,
            timeline: vec![TimelineEntry {
                event: "Complaint Submitted".to_string(),
                timestamp: now,
            }],
            rating: None,
            feedback: None,
            consumer_edit_locked: false,
        }
    }

    pub fn has_resolution_notes(&self) -> bool {
        !self.resolution_notes.trim().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.status == ComplaintStatus::Closed
    }

    /// Copy of this record with one more timeline entry and a refreshed
    /// `updated_at`. The only way history ever grows.
    pub fn with_timeline_entry(&self, event: impl Into<String>, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.timeline.push(TimelineEntry {
            event: event.into(),
            timestamp: at,
        });
        next.updated_at = at;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    fn consumer() -> Identity {
        Identity::new("Dana Vega", Role::Consumer, "acme")
    }

    fn draft() -> ComplaintDraft {
        ComplaintDraft {
            category: ComplaintCategory::TechnicalIssue,
            title: "VPN down".to_string(),
            description: "Cannot connect to VPN since Monday".to_string(),
        }
    }

    #[test]
    fn test_create_seeds_open_record() {
        let now = Utc::now();
        let record = ComplaintRecord::create(draft(), &consumer(), "#Ref-1001".to_string(), now);

        assert_eq!(record.status, ComplaintStatus::Open);
        assert_eq!(record.resolution_notes, "");
        assert_eq!(record.timeline.len(), 1);
        assert_eq!(record.timeline[0].event, "Complaint Submitted");
        assert_eq!(record.priority, Priority::Medium);
        assert_eq!(record.created_at, record.updated_at);
        assert!(!record.consumer_edit_locked);
    }

    #[test]
    fn test_with_timeline_entry_is_append_only() {
        let now = Utc::now();
        let record = ComplaintRecord::create(draft(), &consumer(), "#Ref-1001".to_string(), now);
        let later = now + chrono::Duration::minutes(5);

        let next = record.with_timeline_entry("Assigned to Support Team", later);

        assert_eq!(record.timeline.len(), 1, "original untouched");
        assert_eq!(next.timeline.len(), 2);
        assert_eq!(next.timeline[1].event, "Assigned to Support Team");
        assert_eq!(next.updated_at, later);
    }

    #[test]
    fn test_title_validation() {
        assert!(validate_title("VPN down").is_ok());
        assert_eq!(
            validate_title("  "),
            Err(ValidationError::Required("title"))
        );
        assert_eq!(validate_title("ab"), Err(ValidationError::TitleTooShort));
    }

    #[test]
    fn test_description_validation() {
        assert!(validate_description("Cannot connect to VPN").is_ok());
        assert_eq!(
            validate_description(""),
            Err(ValidationError::Required("description"))
        );
        assert_eq!(
            validate_description("too short"),
            Err(ValidationError::DescriptionTooShort)
        );
    }

    #[test]
    fn test_rating_validation() {
        for r in 1..=5 {
            assert!(validate_rating(r).is_ok());
        }
        assert_eq!(validate_rating(0), Err(ValidationError::RatingOutOfRange));
        assert_eq!(validate_rating(6), Err(ValidationError::RatingOutOfRange));
    }

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(ComplaintStatus::InProgress.to_string(), "In Progress");
        assert_eq!(
            "In Progress".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::InProgress
        );
        assert_eq!(
            "resolved".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::Resolved
        );
        assert!("unresolved".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn test_category_parse_accepts_display_form() {
        assert_eq!(
            "Billing / Payments".parse::<ComplaintCategory>().unwrap(),
            ComplaintCategory::BillingOrPayments
        );
        assert_eq!(
            "DataPrivacyOrSecurity".parse::<ComplaintCategory>().unwrap(),
            ComplaintCategory::DataPrivacyOrSecurity
        );
    }

    #[test]
    fn test_wire_vocabulary_is_canonical() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
        let json = serde_json::to_string(&ComplaintCategory::TechnicalIssue).unwrap();
        assert_eq!(json, "\"TechnicalIssue\"");
    }
}
