//! HTTP client for the ombudd REST API.
//!
//! Maps HTTP failures back onto the shared error taxonomy: connection
//! problems become retryable `Transport` errors, non-2xx responses are
//! rebuilt from the `{error, kind}` body the daemon sends.

use ombud_common::api::{ApiError, ConfirmRequest, Envelope, LoginRequest, LoginResponse};
use ombud_common::audit::AuditEntry;
use ombud_common::complaint::{ComplaintDraft, ComplaintRecord};
use ombud_common::error::OmbudError;
use ombud_common::identity::Identity;
use ombud_common::lifecycle::{AgentUpdate, ConsumerEdit};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Issues monotonic ids for in-flight fetches so a stale response that
/// completes late can be recognized and discarded ("last response wins").
#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new fetch. Supersedes every previously issued id.
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True while no newer fetch has been issued since `id`.
    pub fn is_latest(&self, id: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == id
    }
}

/// Client for the complaint desk API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    tenant_id: Option<String>,
}

impl ApiClient {
    /// Unauthenticated client (login only).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
            tenant_id: None,
        }
    }

    /// Client carrying an authenticated session.
    pub fn with_session(
        base_url: impl Into<String>,
        token: impl Into<String>,
        identity: &Identity,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: Some(token.into()),
            tenant_id: Some(identity.tenant_id.clone()),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, OmbudError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut builder = self.http.request(method, &url);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(tenant) = &self.tenant_id {
            builder = builder.header("X-Tenant-Id", tenant);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| OmbudError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let envelope: Envelope<T> = response
                .json()
                .await
                .map_err(|e| OmbudError::Transport(format!("malformed response: {e}")))?;
            Ok(envelope.data)
        } else {
            match response.json::<ApiError>().await {
                Ok(api_err) => Err(OmbudError::from_wire(&api_err.kind, api_err.error)),
                Err(_) => Err(OmbudError::Transport(format!("HTTP {status}"))),
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, OmbudError> {
        self.request(
            Method::POST,
            "/api/authentication/login",
            Some(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    /// Best-effort server-side token revocation.
    pub async fn logout(&self) -> Result<(), OmbudError> {
        let url = format!(
            "{}/api/authentication/logout",
            self.base_url.trim_end_matches('/')
        );
        let mut builder = self.http.post(&url);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let response = builder
            .send()
            .await
            .map_err(|e| OmbudError::Transport(e.to_string()))?;
        if response.status() == StatusCode::NO_CONTENT || response.status().is_success() {
            Ok(())
        } else {
            Err(OmbudError::Transport(format!("HTTP {}", response.status())))
        }
    }

    pub async fn me(&self) -> Result<Identity, OmbudError> {
        self.request::<Identity>(Method::GET, "/api/authentication/me", None::<&()>)
            .await
    }

    pub async fn my_complaints(&self) -> Result<Vec<ComplaintRecord>, OmbudError> {
        self.request(Method::GET, "/api/complaints/my", None::<&()>)
            .await
    }

    pub async fn tenant_complaints(&self) -> Result<Vec<ComplaintRecord>, OmbudError> {
        self.request(Method::GET, "/api/complaints", None::<&()>)
            .await
    }

    pub async fn complaint(&self, id: Uuid) -> Result<ComplaintRecord, OmbudError> {
        self.request(Method::GET, &format!("/api/complaints/{id}"), None::<&()>)
            .await
    }

    pub async fn create_complaint(
        &self,
        draft: &ComplaintDraft,
    ) -> Result<ComplaintRecord, OmbudError> {
        self.request(Method::POST, "/api/complaints", Some(draft))
            .await
    }

    pub async fn update_resolution(
        &self,
        id: Uuid,
        update: &AgentUpdate,
    ) -> Result<ComplaintRecord, OmbudError> {
        self.request(
            Method::PUT,
            &format!("/api/complaints/{id}/resolution"),
            Some(update),
        )
        .await
    }

    pub async fn edit_complaint(
        &self,
        id: Uuid,
        edit: &ConsumerEdit,
    ) -> Result<ComplaintRecord, OmbudError> {
        self.request(Method::PUT, &format!("/api/complaints/{id}"), Some(edit))
            .await
    }

    pub async fn confirm(
        &self,
        id: Uuid,
        rating: u8,
        feedback: &str,
    ) -> Result<ComplaintRecord, OmbudError> {
        self.request(
            Method::POST,
            &format!("/api/complaints/{id}/confirm"),
            Some(&ConfirmRequest {
                rating,
                feedback: feedback.to_string(),
            }),
        )
        .await
    }

    pub async fn tenant_audit(&self) -> Result<Vec<AuditEntry>, OmbudError> {
        self.request(Method::GET, "/api/audit/tenant", None::<&()>)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_discards_stale_fetches() {
        let seq = FetchSequencer::new();

        let first = seq.begin();
        let second = seq.begin();

        // The older fetch completing late must not win.
        assert!(!seq.is_latest(first));
        assert!(seq.is_latest(second));

        let third = seq.begin();
        assert!(!seq.is_latest(second));
        assert!(seq.is_latest(third));
    }

    #[test]
    fn test_sequencer_ids_are_monotonic() {
        let seq = FetchSequencer::new();
        let ids: Vec<u64> = (0..5).map(|_| seq.begin()).collect();
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}
