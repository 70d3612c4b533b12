//! Ombud Daemon - complaint desk REST service
//!
//! Loads seeded accounts, opens the audit log, and serves the complaint
//! lifecycle API until interrupted.

use anyhow::Result;
use ombudd::audit::AuditLogger;
use ombudd::auth::AuthService;
use ombudd::config::Config;
use ombudd::server::AppState;
use ombudd::store::ComplaintStore;
use std::path::Path;
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("ombudd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    if config.users.is_empty() {
        warn!("No user accounts configured; every login will be rejected");
    }

    let auth = AuthService::from_config(&config.users);
    let audit = AuditLogger::new(Path::new(&config.server.audit_dir)).await?;
    let store = ComplaintStore::new();

    let state = AppState::new(store, auth, audit);
    ombudd::server::run(state, &config.server.listen_addr).await
}
