//! Command handlers for ombudctl.
//!
//! Mutating commands mirror the lifecycle policy locally before touching
//! the network: the same `ombud_common` checks the daemon enforces run
//! against the fetched record first, so a doomed request is rejected with
//! the precise violation instead of a round trip. The daemon remains the
//! authority; the mirror is UX.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use ombud_common::complaint::{
    validate_description, validate_rating, validate_title, ComplaintDraft, ComplaintRecord,
    ComplaintStatus, Priority,
};
use ombud_common::confirm::confirm_resolution;
use ombud_common::identity::Role;
use ombud_common::lifecycle::{apply_agent_update, apply_consumer_edit, AgentUpdate, ConsumerEdit};
use ombud_common::query::DEFAULT_PAGE_SIZE;
use std::io::Write;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::{ApiClient, FetchSequencer};
use crate::session::SessionContext;
use crate::view::{self, ListView, WATCH_INTERVAL};

/// Default daemon endpoint, matching ombudd's default listen address.
const DEFAULT_SERVER: &str = "http://127.0.0.1:5124";

fn authed_client(session: &SessionContext) -> ApiClient {
    ApiClient::with_session(&session.server_url, &session.token, &session.user)
}

fn is_staff(session: &SessionContext) -> bool {
    matches!(session.user.role, Role::Agent | Role::Admin)
}

/// Look a complaint up by UUID or by its `#Ref-NNNN` display code.
async fn fetch_target(
    client: &ApiClient,
    session: &SessionContext,
    target: &str,
) -> Result<ComplaintRecord> {
    if let Ok(id) = Uuid::parse_str(target) {
        return Ok(client.complaint(id).await?);
    }

    let needle = target.trim().trim_start_matches('#').to_lowercase();
    let records = if is_staff(session) {
        client.tenant_complaints().await?
    } else {
        client.my_complaints().await?
    };
    records
        .into_iter()
        .find(|r| r.reference.trim_start_matches('#').to_lowercase() == needle)
        .ok_or_else(|| anyhow!("No complaint matching {target}"))
}

// ============================================================================
// Session commands
// ============================================================================

pub async fn login(email: String, server: Option<String>, password: Option<String>) -> Result<()> {
    let server = server.unwrap_or_else(|| DEFAULT_SERVER.to_string());
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };

    let client = ApiClient::new(&server);
    let response = client.login(&email, &password).await?;

    let session = SessionContext::init(&server, &response.token, response.user.clone());
    session.save()?;

    println!(
        "Logged in as {} ({}) on tenant {}",
        response.user.name, response.user.role, response.user.tenant_id
    );
    Ok(())
}

pub async fn logout() -> Result<()> {
    match SessionContext::load() {
        Ok(session) => {
            // Best effort: the local teardown matters even if the daemon is
            // unreachable.
            let _ = authed_client(&session).logout().await;
            SessionContext::teardown()?;
            println!("Logged out");
        }
        Err(_) => println!("Not logged in"),
    }
    Ok(())
}

pub async fn whoami() -> Result<()> {
    let session = SessionContext::load()?;
    let identity = authed_client(&session).me().await?;
    println!(
        "{} ({}) on tenant {}",
        identity.name, identity.role, identity.tenant_id
    );
    Ok(())
}

// ============================================================================
// Consumer commands
// ============================================================================

pub async fn create(category: String, title: String, description: String) -> Result<()> {
    let session = SessionContext::load()?;

    let draft = ComplaintDraft {
        category: category.parse().map_err(anyhow::Error::msg)?,
        title,
        description,
    };
    // Malformed input never reaches the network.
    draft.validate()?;

    let record = authed_client(&session).create_complaint(&draft).await?;
    println!("Filed {}: \"{}\"", record.reference, record.title);
    Ok(())
}

pub async fn edit(
    target: String,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let session = SessionContext::load()?;
    let client = authed_client(&session);

    if let Some(title) = title.as_deref() {
        validate_title(title)?;
    }
    if let Some(description) = description.as_deref() {
        validate_description(description)?;
    }

    let record = fetch_target(&client, &session, &target).await?;
    let edit = ConsumerEdit { title, description };

    // Local policy mirror; the daemon re-checks on its own copy.
    apply_consumer_edit(&record, &session.user, &edit, Utc::now())?;

    let updated = client.edit_complaint(record.id, &edit).await?;
    println!("Updated {}", updated.reference);
    Ok(())
}

pub async fn confirm(target: String, rating: u8, feedback: Option<String>) -> Result<()> {
    let session = SessionContext::load()?;
    let client = authed_client(&session);

    validate_rating(rating)?;
    let feedback = feedback.unwrap_or_default();

    let record = fetch_target(&client, &session, &target).await?;
    confirm_resolution(&record, &session.user, rating, &feedback, Utc::now())?;

    let closed = client.confirm(record.id, rating, &feedback).await?;
    println!(
        "Resolution of {} confirmed, rated {}/5. Thank you for your feedback.",
        closed.reference, rating
    );
    Ok(())
}

// ============================================================================
// Agent commands
// ============================================================================

pub async fn resolve(
    target: String,
    notes: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    assign: Option<String>,
) -> Result<()> {
    let session = SessionContext::load()?;
    let client = authed_client(&session);

    let update = AgentUpdate {
        resolution_notes: notes,
        status: status
            .map(|s| s.parse::<ComplaintStatus>().map_err(anyhow::Error::msg))
            .transpose()?,
        priority: priority
            .map(|p| p.parse::<Priority>().map_err(anyhow::Error::msg))
            .transpose()?,
        assigned_to: assign,
    };

    let record = fetch_target(&client, &session, &target).await?;
    let preview = apply_agent_update(&record, &session.user, &update, Utc::now())?;
    if preview.timeline.len() == record.timeline.len() {
        println!("No changes to save for {}", record.reference);
        return Ok(());
    }

    let updated = client.update_resolution(record.id, &update).await?;
    println!(
        "Saved {}: {}",
        updated.reference,
        updated.timeline.last().map(|e| e.event.as_str()).unwrap_or("updated")
    );
    Ok(())
}

// ============================================================================
// Listing and detail
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub async fn list(
    search: Option<String>,
    status: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    page: Option<usize>,
    all: bool,
    watch: bool,
) -> Result<()> {
    let session = SessionContext::load()?;
    if all && !is_staff(&session) {
        return Err(anyhow!("--all requires an agent or admin session"));
    }
    let staff_view = all || is_staff(&session);

    // Filters first, explicit page selection last: setting a filter resets
    // the view to page 1, which is exactly the contract the engine
    // documents for its callers.
    let mut list_view = ListView::new();
    if let Some(search) = search {
        list_view.set_search_text(search);
    }
    if let Some(status) = status {
        list_view.set_status_filter(Some(status.parse().map_err(anyhow::Error::msg)?));
    }
    if let Some(category) = category {
        list_view.set_category_filter(Some(category.parse().map_err(anyhow::Error::msg)?));
    }
    if let Some(priority) = priority {
        list_view.set_priority_filter(Some(priority.parse().map_err(anyhow::Error::msg)?));
    }
    if let Some(page) = page {
        list_view.goto_page(page);
    }

    let client = authed_client(&session);
    if watch {
        return watch_loop(client, list_view, staff_view).await;
    }

    let records = if staff_view {
        client.tenant_complaints().await?
    } else {
        client.my_complaints().await?
    };
    view::print_complaint_page(&list_view.page_of(&records), Utc::now());
    Ok(())
}

/// Re-fetch on an interval and re-render. Fetches run detached and may
/// complete out of order; the sequencer keeps the last issued request as
/// the only one allowed to render ("last response wins").
async fn watch_loop(client: ApiClient, list_view: ListView, staff_view: bool) -> Result<()> {
    let client = Arc::new(client);
    let sequencer = Arc::new(FetchSequencer::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut ticker = tokio::time::interval(WATCH_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let id = sequencer.begin();
                let client = Arc::clone(&client);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let result = if staff_view {
                        client.tenant_complaints().await
                    } else {
                        client.my_complaints().await
                    };
                    let _ = tx.send((id, result));
                });
            }
            Some((id, result)) = rx.recv() => {
                if !sequencer.is_latest(id) {
                    // A newer fetch superseded this one while it was in
                    // flight; its data is stale and must not render.
                    continue;
                }
                match result {
                    Ok(records) => {
                        println!();
                        println!("As of {}", view::format_timestamp(Utc::now()));
                        view::print_complaint_page(&list_view.page_of(&records), Utc::now());
                    }
                    Err(e) if e.is_retryable() => eprintln!("Fetch failed, retrying: {e}"),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
}

pub async fn show(target: String) -> Result<()> {
    let session = SessionContext::load()?;
    let client = authed_client(&session);

    let record = fetch_target(&client, &session, &target).await?;
    view::print_complaint_detail(&record);
    view::print_action_hints(session.user.role, &record);
    Ok(())
}

// ============================================================================
// Audit
// ============================================================================

pub async fn audit(page: Option<usize>) -> Result<()> {
    let session = SessionContext::load()?;
    if !is_staff(&session) {
        return Err(anyhow!("audit requires an agent or admin session"));
    }

    let entries = authed_client(&session).tenant_audit().await?;
    view::print_audit_page(&entries, page.unwrap_or(1), DEFAULT_PAGE_SIZE);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
