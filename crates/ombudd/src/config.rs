//! Configuration management for ombudd.
//!
//! Loads settings from /etc/ombud/ombudd.toml or uses defaults. Seeded user
//! accounts (email, display name, role, tenant, password digest) live here
//! too; without at least one account every login attempt fails.

use anyhow::Result;
use ombud_common::identity::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/ombud/ombudd.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/ombud/ombudd.toml";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for the REST API
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory holding the append-only audit log
    #[serde(default = "default_audit_dir")]
    pub audit_dir: String,
}

fn default_listen_addr() -> String {
    // Same port the web client was built against.
    "127.0.0.1:5124".to_string()
}

fn default_audit_dir() -> String {
    "/var/log/ombud".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            audit_dir: default_audit_dir(),
        }
    }
}

/// One seeded user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: String,
    /// Hex-encoded SHA-256 digest of the password
    pub password_sha256: String,
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Config {
    /// Load config from file, or return defaults
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH)
            .or_else(|_| Self::load_from_path(DEFAULT_CONFIG_PATH))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:5124");
        assert_eq!(config.server.audit_dir, "/var/log/ombud");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
listen_addr = "0.0.0.0:8080"

[[users]]
email = "dana@example.com"
name = "Dana Vega"
role = "Consumer"
tenant_id = "acme"
password_sha256 = "deadbeef"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        // Defaults for missing fields
        assert_eq!(config.server.audit_dir, "/var/log/ombud");
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].role, Role::Consumer);
        assert_eq!(config.users[0].tenant_id, "acme");
    }

    #[test]
    fn test_empty_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:5124");
    }
}
