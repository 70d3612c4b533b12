//! HTTP server for ombudd

use crate::audit::AuditLogger;
use crate::auth::AuthService;
use crate::routes;
use crate::store::ComplaintStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub store: RwLock<ComplaintStore>,
    pub auth: AuthService,
    pub audit: AuditLogger,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: ComplaintStore, auth: AuthService, audit: AuditLogger) -> Self {
        Self {
            store: RwLock::new(store),
            auth,
            audit,
            start_time: Instant::now(),
        }
    }
}

/// Build the full API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::auth_routes())
        .merge(routes::complaint_routes())
        .merge(routes::audit_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server
pub async fn run(state: AppState, listen_addr: &str) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("  Listening on http://{}", listen_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
