//! REST wire types shared by the daemon and the CLI client.
//!
//! Payloads travel inside a `{"data": ...}` envelope; failures travel as
//! `{"error": "...", "kind": "..."}` so the client can rebuild the error
//! taxonomy without parsing prose.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// Success envelope. Clients read `.data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Failure body; `kind` matches `OmbudError::kind()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub kind: String,
}

/// `POST /api/authentication/login` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/authentication/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// `POST /api/complaints/{id}/confirm` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub rating: u8,
    #[serde(default)]
    pub feedback: String,
}

/// Tenant scoping header attached to every authenticated request.
pub const TENANT_HEADER: &str = "x-tenant-id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(Envelope::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body["data"][0], 1);
    }

    #[test]
    fn test_confirm_request_feedback_defaults_empty() {
        let req: ConfirmRequest = serde_json::from_str(r#"{"rating": 4}"#).unwrap();
        assert_eq!(req.rating, 4);
        assert_eq!(req.feedback, "");
    }
}
