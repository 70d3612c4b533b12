//! Persisted session context.
//!
//! The CLI keeps `{server_url, token, user}` in a session file with an
//! explicit lifecycle: `init` + `save` on login, `teardown` on logout.
//! Commands receive the identity from here and pass it read-only into the
//! core; nothing below this layer touches storage.

use anyhow::{Context, Result};
use ombud_common::identity::Identity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const SESSION_FILE: &str = "session.json";

/// One authenticated CLI session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub server_url: String,
    pub token: String,
    pub user: Identity,
}

impl SessionContext {
    pub fn init(server_url: impl Into<String>, token: impl Into<String>, user: Identity) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
            user,
        }
    }

    /// Session file under the user's config directory.
    pub fn path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("ombud");
        Ok(dir.join(SESSION_FILE))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).context("Failed to write session file")?;
        Ok(())
    }

    /// Load the active session, or fail with a login hint.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context("Not logged in. Run: ombudctl login <email>")?;
        let session = serde_json::from_str(&content)
            .context("Session file is corrupt; log in again")?;
        Ok(session)
    }

    /// Remove the session file. Safe to call when none exists.
    pub fn teardown() -> Result<()> {
        let path = Self::path()?;
        if path.exists() {
            fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ombud_common::identity::Role;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ombud").join("session.json");

        let session = SessionContext::init(
            "http://127.0.0.1:5124",
            "deadbeef",
            Identity::new("Dana Vega", Role::Consumer, "acme"),
        );
        session.save_to(&path).unwrap();

        let loaded = SessionContext::load_from(&path).unwrap();
        assert_eq!(loaded.token, "deadbeef");
        assert_eq!(loaded.user.name, "Dana Vega");
        assert_eq!(loaded.server_url, "http://127.0.0.1:5124");
    }

    #[test]
    fn test_missing_session_mentions_login() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let err = SessionContext::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("login"));
    }
}
