//! Authentication boundary: seeded accounts, password digests, bearer tokens.
//!
//! The core never sees credentials; it only receives the resolved
//! `Identity`. Requests without a valid token are rejected before any
//! complaint handler runs.

use ombud_common::api::LoginResponse;
use ombud_common::error::OmbudError;
use ombud_common::identity::Identity;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::UserConfig;

/// One resolvable account.
struct UserAccount {
    email: String,
    password_sha256: String,
    identity: Identity,
}

/// Verifies credentials and maps bearer tokens back to identities.
pub struct AuthService {
    accounts: Vec<UserAccount>,
    tokens: RwLock<HashMap<String, Identity>>,
}

impl AuthService {
    /// Build the service from seeded config accounts. Identity ids are
    /// minted at startup and stay stable for the daemon's lifetime.
    pub fn from_config(users: &[UserConfig]) -> Self {
        let accounts = users
            .iter()
            .map(|u| UserAccount {
                email: u.email.to_lowercase(),
                password_sha256: u.password_sha256.to_lowercase(),
                identity: Identity::new(u.name.clone(), u.role, u.tenant_id.clone()),
            })
            .collect();
        Self {
            accounts,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Hex SHA-256 of a password, the digest format `ombudd.toml` stores.
    pub fn sha256_hex(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, OmbudError> {
        let email = email.trim().to_lowercase();
        let digest = Self::sha256_hex(password);

        let account = self
            .accounts
            .iter()
            .find(|a| a.email == email && a.password_sha256 == digest)
            .ok_or_else(|| {
                warn!(%email, "login rejected");
                OmbudError::Unauthorized("invalid email or password".to_string())
            })?;

        let token = Self::issue_token();
        self.tokens
            .write()
            .await
            .insert(token.clone(), account.identity.clone());

        info!(user = %account.identity.name, role = %account.identity.role, "login accepted");
        Ok(LoginResponse {
            token,
            user: account.identity.clone(),
        })
    }

    /// Resolve a bearer token to the identity it was issued for.
    pub async fn identity_for(&self, token: &str) -> Option<Identity> {
        self.tokens.read().await.get(token).cloned()
    }

    /// Invalidate a token (logout).
    pub async fn revoke(&self, token: &str) {
        self.tokens.write().await.remove(token);
    }

    fn issue_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Pull the bearer credential out of an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
