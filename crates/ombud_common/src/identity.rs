//! Identity types shared between the daemon and the control CLI.
//!
//! An `Identity` is read-only input to the lifecycle policy: it is produced
//! by the authentication boundary and never mutated by the core.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor role within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Role {
    /// Files complaints, edits them pre-resolution, confirms resolutions.
    #[default]
    Consumer,
    /// Triages complaints, writes resolution notes, drives the status.
    Agent,
    /// Tenant administration and audit surface; read-only for complaints.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Consumer => write!(f, "Consumer"),
            Self::Agent => write!(f, "Agent"),
            Self::Admin => write!(f, "Admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumer" => Ok(Self::Consumer),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated identity attached to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub tenant_id: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, role: Role, tenant_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role,
            tenant_id: tenant_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Consumer.to_string(), "Consumer");
        assert_eq!(Role::Agent.to_string(), "Agent");
        assert_eq!(Role::Admin.to_string(), "Admin");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("agent".parse::<Role>().unwrap(), Role::Agent);
        assert_eq!(" Consumer ".parse::<Role>().unwrap(), Role::Consumer);
        assert!("resolver".parse::<Role>().is_err());
    }
}
