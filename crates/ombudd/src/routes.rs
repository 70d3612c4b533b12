//! API routes for ombudd.
//!
//! The daemon is the lifecycle authority: every mutation runs through the
//! same `ombud_common` policy functions the CLI mirrors, under the store's
//! write lock, so there is exactly one logical writer per record. Policy
//! rejections map to 403 (forbidden write, ownership) or 409 (illegal
//! transition, terminal state); validation to 400; auth failures to 401;
//! unknown ids to 404.

use crate::auth;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use ombud_common::api::{ApiError, ConfirmRequest, Envelope, LoginRequest, LoginResponse};
use ombud_common::audit::AuditEntry;
use ombud_common::complaint::{
    validate_description, validate_title, ComplaintDraft, ComplaintRecord,
};
use ombud_common::confirm::confirm_resolution;
use ombud_common::error::{OmbudError, PolicyViolation};
use ombud_common::identity::{Identity, Role};
use ombud_common::lifecycle::{apply_agent_update, apply_consumer_edit, AgentUpdate, ConsumerEdit};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

/// Error half of every handler result.
type Failure = (StatusCode, Json<ApiError>);

type ApiResult<T> = Result<Json<Envelope<T>>, Failure>;

// ============================================================================
// Routers
// ============================================================================

pub fn auth_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/authentication/login", post(login))
        .route("/api/authentication/logout", post(logout))
        .route("/api/authentication/me", get(me))
}

pub fn complaint_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/complaints", get(list_tenant_complaints).post(create_complaint))
        .route("/api/complaints/my", get(list_my_complaints))
        .route("/api/complaints/:id", get(get_complaint).put(edit_complaint))
        .route("/api/complaints/:id/resolution", put(update_resolution))
        .route("/api/complaints/:id/confirm", post(confirm_complaint))
}

pub fn audit_routes() -> Router<AppStateArc> {
    Router::new().route("/api/audit/tenant", get(tenant_audit))
}

// ============================================================================
// Shared plumbing
// ============================================================================

fn failure(status: StatusCode, kind: &str, message: impl Into<String>) -> Failure {
    (
        status,
        Json(ApiError {
            error: message.into(),
            kind: kind.to_string(),
        }),
    )
}

fn unauthorized(message: &str) -> Failure {
    failure(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Map a core error onto the HTTP surface.
fn reject(err: OmbudError) -> Failure {
    let status = match &err {
        OmbudError::Validation(_) => StatusCode::BAD_REQUEST,
        OmbudError::Policy(violation) => match violation {
            PolicyViolation::FieldNotWritable { .. }
            | PolicyViolation::NotOwner
            | PolicyViolation::WrongTenant
            | PolicyViolation::ConsumerEditLocked => StatusCode::FORBIDDEN,
            _ => StatusCode::CONFLICT,
        },
        OmbudError::Rejected(_) => StatusCode::CONFLICT,
        OmbudError::NotFound(_) => StatusCode::NOT_FOUND,
        OmbudError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        OmbudError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    failure(status, err.kind(), err.to_string())
}

/// Resolve the caller's identity or fail with 401. A present tenant header
/// must match the identity it was issued for.
async fn require_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, Failure> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("missing bearer credential"))?;
    let token = auth::bearer_token(header_value)
        .ok_or_else(|| unauthorized("missing bearer credential"))?;
    let identity = state
        .auth
        .identity_for(token)
        .await
        .ok_or_else(|| unauthorized("invalid or expired token"))?;

    if let Some(tenant) = headers
        .get(ombud_common::api::TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        if tenant != identity.tenant_id {
            return Err(unauthorized("tenant header does not match credential"));
        }
    }

    Ok(identity)
}

fn require_staff(identity: &Identity) -> Result<(), Failure> {
    match identity.role {
        Role::Agent | Role::Admin => Ok(()),
        Role::Consumer => Err(failure(
            StatusCode::FORBIDDEN,
            "policy_violation",
            "agent or admin role required",
        )),
    }
}

async fn record_audit(state: &AppState, entry: AuditEntry) {
    if let Err(e) = state.audit.log(&entry).await {
        warn!("Failed to write audit entry: {}", e);
    }
}

// ============================================================================
// Authentication
// ============================================================================

async fn login(
    State(state): State<AppStateArc>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let response = state
        .auth
        .login(&req.email, &req.password)
        .await
        .map_err(reject)?;

    record_audit(&state, AuditEntry::new(&response.user, "login", "")).await;
    Ok(Json(Envelope::new(response)))
}

async fn logout(State(state): State<AppStateArc>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(auth::bearer_token)
    {
        state.auth.revoke(token).await;
    }
    StatusCode::NO_CONTENT
}

async fn me(State(state): State<AppStateArc>, headers: HeaderMap) -> ApiResult<Identity> {
    let identity = require_identity(&state, &headers).await?;
    Ok(Json(Envelope::new(identity)))
}

// ============================================================================
// Complaints
// ============================================================================

async fn create_complaint(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(draft): Json<ComplaintDraft>,
) -> ApiResult<ComplaintRecord> {
    let identity = require_identity(&state, &headers).await?;
    if identity.role != Role::Consumer {
        return Err(failure(
            StatusCode::FORBIDDEN,
            "policy_violation",
            "only consumers may file complaints",
        ));
    }
    draft.validate().map_err(|e| reject(e.into()))?;

    let record = state
        .store
        .write()
        .await
        .create(draft, &identity, Utc::now());

    info!(reference = %record.reference, "complaint filed");
    record_audit(
        &state,
        AuditEntry::new(
            &identity,
            "complaint_created",
            format!("{}: \"{}\"", record.reference, record.title),
        ),
    )
    .await;

    Ok(Json(Envelope::new(record)))
}

async fn list_my_complaints(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<Vec<ComplaintRecord>> {
    let identity = require_identity(&state, &headers).await?;
    let records = state.store.read().await.list_for_owner(identity.id);
    Ok(Json(Envelope::new(records)))
}

async fn list_tenant_complaints(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<Vec<ComplaintRecord>> {
    let identity = require_identity(&state, &headers).await?;
    require_staff(&identity)?;
    let records = state.store.read().await.list_for_tenant(&identity.tenant_id);
    Ok(Json(Envelope::new(records)))
}

/// Visibility rule shared by the detail handlers: the owner sees their own
/// record, staff see their tenant's. Everything else is a 404, not a 403,
/// so record ids do not leak across tenants.
fn visible_to(record: &ComplaintRecord, identity: &Identity) -> bool {
    record.owner_id == identity.id
        || (record.tenant_id == identity.tenant_id
            && matches!(identity.role, Role::Agent | Role::Admin))
}

async fn get_complaint(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<ComplaintRecord> {
    let identity = require_identity(&state, &headers).await?;
    let store = state.store.read().await;
    let record = store
        .get(&id)
        .filter(|r| visible_to(r, &identity))
        .cloned()
        .ok_or_else(|| reject(OmbudError::NotFound(format!("complaint {id}"))))?;
    Ok(Json(Envelope::new(record)))
}

async fn update_resolution(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<AgentUpdate>,
) -> ApiResult<ComplaintRecord> {
    let identity = require_identity(&state, &headers).await?;

    // Hold the write lock across read-apply-replace: one writer per record.
    let mut store = state.store.write().await;
    let record = store
        .get(&id)
        .filter(|r| visible_to(r, &identity))
        .cloned()
        .ok_or_else(|| reject(OmbudError::NotFound(format!("complaint {id}"))))?;

    let next =
        apply_agent_update(&record, &identity, &update, Utc::now()).map_err(|e| reject(e.into()))?;

    let mutated = next.timeline.len() > record.timeline.len();
    if mutated {
        let event = next.timeline.last().map(|e| e.event.clone()).unwrap_or_default();
        store.replace(next.clone());
        drop(store);
        record_audit(
            &state,
            AuditEntry::new(
                &identity,
                "resolution_updated",
                format!("{}: {}", next.reference, event),
            ),
        )
        .await;
    }

    Ok(Json(Envelope::new(next)))
}

async fn edit_complaint(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(edit): Json<ConsumerEdit>,
) -> ApiResult<ComplaintRecord> {
    let identity = require_identity(&state, &headers).await?;

    if let Some(title) = edit.title.as_deref() {
        validate_title(title).map_err(|e| reject(e.into()))?;
    }
    if let Some(description) = edit.description.as_deref() {
        validate_description(description).map_err(|e| reject(e.into()))?;
    }

    let mut store = state.store.write().await;
    let record = store
        .get(&id)
        .filter(|r| visible_to(r, &identity))
        .cloned()
        .ok_or_else(|| reject(OmbudError::NotFound(format!("complaint {id}"))))?;

    let next =
        apply_consumer_edit(&record, &identity, &edit, Utc::now()).map_err(|e| reject(e.into()))?;

    let mutated = next.timeline.len() > record.timeline.len();
    if mutated {
        store.replace(next.clone());
        drop(store);
        record_audit(
            &state,
            AuditEntry::new(
                &identity,
                "complaint_edited",
                format!("{}: \"{}\"", next.reference, next.title),
            ),
        )
        .await;
    }

    Ok(Json(Envelope::new(next)))
}

async fn confirm_complaint(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<ComplaintRecord> {
    let identity = require_identity(&state, &headers).await?;

    let mut store = state.store.write().await;
    let record = store
        .get(&id)
        .filter(|r| visible_to(r, &identity))
        .cloned()
        .ok_or_else(|| reject(OmbudError::NotFound(format!("complaint {id}"))))?;

    let next = confirm_resolution(&record, &identity, req.rating, &req.feedback, Utc::now())
        .map_err(reject)?;

    store.replace(next.clone());
    drop(store);
    record_audit(
        &state,
        AuditEntry::new(
            &identity,
            "resolution_confirmed",
            format!("{}: rated {}", next.reference, req.rating),
        ),
    )
    .await;

    Ok(Json(Envelope::new(next)))
}

// ============================================================================
// Audit
// ============================================================================

async fn tenant_audit(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> ApiResult<Vec<AuditEntry>> {
    let identity = require_identity(&state, &headers).await?;
    require_staff(&identity)?;

    let entries = state
        .audit
        .read_for_tenant(&identity.tenant_id)
        .await
        .map_err(|e| {
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "transport",
                format!("audit log unavailable: {e}"),
            )
        })?;
    Ok(Json(Envelope::new(entries)))
}
