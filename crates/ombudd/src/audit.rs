//! Audit Logger - Append-only JSONL logging for accepted mutations and logins

use anyhow::{Context, Result};
use ombud_common::audit::AuditEntry;
use std::path::{Path, PathBuf};
use tokio::fs::{create_dir_all, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

const AUDIT_FILE: &str = "audit.jsonl";

/// Audit logger for recording all accepted actions
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    /// Create a new audit logger under the given directory
    pub async fn new(dir: &Path) -> Result<Self> {
        create_dir_all(dir)
            .await
            .context("Failed to create audit log directory")?;

        let log_path = dir.join(AUDIT_FILE);

        info!("Audit logger initialized: {}", log_path.display());

        Ok(Self { log_path })
    }

    /// Log an audit entry
    pub async fn log(&self, entry: &AuditEntry) -> Result<()> {
        let json = serde_json::to_string(entry)? + "\n";

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
            .context("Failed to open audit log")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write audit entry")?;

        file.sync_all().await.context("Failed to sync audit log")?;

        Ok(())
    }

    /// Read all audit entries
    pub async fn read_all(&self) -> Result<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let content = tokio::fs::read_to_string(&self.log_path)
            .await
            .context("Failed to read audit log")?;

        let entries: Vec<AuditEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        Ok(entries)
    }

    /// Entries scoped to one tenant, oldest first
    pub async fn read_for_tenant(&self, tenant_id: &str) -> Result<Vec<AuditEntry>> {
        let entries = self.read_all().await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.tenant_id == tenant_id)
            .collect())
    }

    /// Get the path to the audit log
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
