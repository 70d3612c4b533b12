//! List view state and terminal rendering.
//!
//! `ListView` owns the caller side of the query engine's contract: any
//! change to the search text or a filter resets the page to 1, so results
//! never silently vanish on a stale page. Skipping that reset is how you
//! end up on an out-of-range page with an empty item list; the engine
//! returns it as-is and `print_complaint_page` points it out.

use chrono::{DateTime, Utc};
use ombud_common::complaint::{
    ComplaintCategory, ComplaintRecord, ComplaintStatus, Priority, TimelineEntry,
};
use ombud_common::query::{query, ComplaintQuery, QueryPage};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Recommended delay between keystrokes and re-querying in interactive
/// hosts. Filtering is deterministic whenever it runs; this only avoids
/// re-filtering on every keystroke.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Refresh cadence for `list --watch`.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// Client-side list state over the last-fetched snapshot.
#[derive(Debug, Clone, Default)]
pub struct ListView {
    query: ComplaintQuery,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &ComplaintQuery {
        &self.query
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.query.search_text {
            self.query.search_text = text;
            self.query.page = 1;
        }
    }

    pub fn set_status_filter(&mut self, status: Option<ComplaintStatus>) {
        if status != self.query.status {
            self.query.status = status;
            self.query.page = 1;
        }
    }

    pub fn set_category_filter(&mut self, category: Option<ComplaintCategory>) {
        if category != self.query.category {
            self.query.category = category;
            self.query.page = 1;
        }
    }

    pub fn set_priority_filter(&mut self, priority: Option<Priority>) {
        if priority != self.query.priority {
            self.query.priority = priority;
            self.query.page = 1;
        }
    }

    pub fn goto_page(&mut self, page: usize) {
        self.query.page = page.max(1);
    }

    /// Run the pure query engine over a records snapshot.
    pub fn page_of(&self, records: &[ComplaintRecord]) -> QueryPage {
        query(records, &self.query)
    }
}

/// One slot in the rendered pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerItem {
    Page(usize),
    Ellipsis,
}

/// Windowed pager: up to 7 pages are listed in full, beyond that the first
/// and last page plus a one-page window around the current one.
pub fn pager_items(total_pages: usize, current: usize) -> Vec<PagerItem> {
    let mut items = Vec::new();

    if total_pages <= 7 {
        for page in 1..=total_pages {
            items.push(PagerItem::Page(page));
        }
        return items;
    }

    items.push(PagerItem::Page(1));
    if current > 3 {
        items.push(PagerItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total_pages - 1);
    for page in start..=end {
        items.push(PagerItem::Page(page));
    }

    if current + 2 < total_pages {
        items.push(PagerItem::Ellipsis);
    }
    items.push(PagerItem::Page(total_pages));

    items
}

/// "5 mins ago" / "3 hours ago" / "2 Days ago", as the dashboard shows it.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    let hours = (now - then).num_hours().max(0);
    let days = (now - then).num_days().max(0);

    if minutes < 60 {
        format!("{} {} ago", minutes, if minutes == 1 { "min" } else { "mins" })
    } else if hours < 24 {
        format!("{} {} ago", hours, if hours == 1 { "hour" } else { "hours" })
    } else if days == 1 {
        "1 Day ago".to_string()
    } else {
        format!("{days} Days ago")
    }
}

/// "28 Nov 2025 – 14:32", the detail page's timestamp format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    format!("{} – {}", at.format("%-d %b %Y"), at.format("%H:%M"))
}

fn colored_status(status: ComplaintStatus) -> String {
    let label = status.to_string();
    match status {
        ComplaintStatus::Open => label.red().to_string(),
        ComplaintStatus::InProgress => label.yellow().to_string(),
        ComplaintStatus::Resolved => label.green().to_string(),
        ComplaintStatus::Closed => label.dimmed().to_string(),
    }
}

fn truncated(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

/// Render one page of complaints as a table plus the pager line.
pub fn print_complaint_page(page: &QueryPage, now: DateTime<Utc>) {
    if page.page_items.is_empty() {
        if page.total_count == 0 {
            println!("No complaints found");
        } else {
            println!(
                "Page {} is out of range ({} match{} on {} page{}); try page 1",
                page.page,
                page.total_count,
                if page.total_count == 1 { "" } else { "es" },
                page.total_pages,
                if page.total_pages == 1 { "" } else { "s" },
            );
        }
        return;
    }

    println!(
        "{:<11} {:<40} {:<13} {:<24} {:<8} {:<14}",
        "ID", "Title", "Status", "Category", "Priority", "Last Updated"
    );
    for record in &page.page_items {
        println!(
            "{:<11} {:<40} {:<22} {:<24} {:<8} {:<14}",
            record.reference.bold(),
            truncated(&record.title, 40),
            colored_status(record.status),
            record.category.to_string(),
            record.priority.to_string(),
            relative_time(record.updated_at, now),
        );
    }

    if page.total_pages > 1 {
        let pager: Vec<String> = pager_items(page.total_pages, page.page)
            .into_iter()
            .map(|item| match item {
                PagerItem::Ellipsis => "...".to_string(),
                PagerItem::Page(p) if p == page.page => format!("[{p}]"),
                PagerItem::Page(p) => p.to_string(),
            })
            .collect();
        println!();
        println!(
            "Page {} of {} ({} complaints)   {}",
            page.page,
            page.total_pages,
            page.total_count,
            pager.join(" ")
        );
    }
}

/// Render the full detail view of one complaint.
pub fn print_complaint_detail(record: &ComplaintRecord) {
    println!();
    println!("Complaint: {}", record.reference.bold());
    println!();
    println!("Description");
    println!("  {}", record.description.replace('\n', "\n  "));
    println!();
    println!("Resolution Notes");
    if record.has_resolution_notes() {
        println!("  {}", record.resolution_notes.replace('\n', "\n  "));
    } else {
        println!("  {}", "No resolution notes yet.".dimmed());
    }
    println!();
    println!("Details");
    println!("  Created On:     {}", format_timestamp(record.created_at));
    println!("  Current Status: {}", colored_status(record.status));
    println!(
        "  Assigned To:    {}",
        record.assigned_to.as_deref().unwrap_or("-")
    );
    println!("  Last Updated:   {}", format_timestamp(record.updated_at));
    println!("  Priority:       {}", record.priority);
    println!("  Category:       {}", record.category);
    if let Some(rating) = record.rating {
        let stars: String = "*".repeat(rating as usize);
        println!("  Rating:         {stars} ({rating}/5)");
    }
    if let Some(feedback) = &record.feedback {
        println!("  Feedback:       {feedback}");
    }
    println!();
    println!("Timeline");
    print_timeline(&record.timeline);
}

/// What the current session may still do with this record, straight from
/// the capability resolver the daemon uses. Keeps the view honest instead
/// of re-deriving role logic per screen.
pub fn print_action_hints(role: ombud_common::identity::Role, record: &ComplaintRecord) {
    let caps = ombud_common::lifecycle::capabilities_for(role, record.status);
    if caps.can_edit_fields.is_empty() && caps.can_transition_to.is_empty() {
        return;
    }

    println!();
    if !caps.can_edit_fields.is_empty() {
        let fields: Vec<String> = caps.can_edit_fields.iter().map(|f| f.to_string()).collect();
        println!("{} {}", "Editable:".dimmed(), fields.join(", "));
    }
    if !caps.can_transition_to.is_empty() {
        let targets: Vec<String> = caps.can_transition_to.iter().map(|s| s.to_string()).collect();
        println!("{} {}", "Can move to:".dimmed(), targets.join(", "));
    }
}

fn print_timeline(timeline: &[TimelineEntry]) {
    for entry in timeline {
        println!(
            "  * {}  {}",
            entry.event,
            format_timestamp(entry.timestamp).dimmed()
        );
    }
}

/// Render one page of audit entries, paginated client-side like the web
/// audit table.
pub fn print_audit_page(
    entries: &[ombud_common::audit::AuditEntry],
    page: usize,
    page_size: usize,
) {
    let page = page.max(1);
    let total_pages = ((entries.len() + page_size - 1) / page_size).max(1);
    let start = (page - 1).saturating_mul(page_size);
    let slice: Vec<_> = entries.iter().skip(start).take(page_size).collect();

    if slice.is_empty() {
        println!("No audit entries on page {page} ({total_pages} pages)");
        return;
    }

    println!(
        "{:<20} {:<18} {:<9} {:<22} {}",
        "Timestamp", "User", "Role", "Action", "Details"
    );
    for entry in slice {
        println!(
            "{:<20} {:<18} {:<9} {:<22} {}",
            format_timestamp(entry.timestamp),
            entry.user,
            entry.role.to_string(),
            entry.action,
            if entry.details.is_empty() { "-" } else { &entry.details },
        );
    }
    if total_pages > 1 {
        println!();
        println!("Page {page} of {total_pages}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use ombud_common::complaint::ComplaintDraft;
    use ombud_common::identity::{Identity, Role};

    fn records(n: usize) -> Vec<ComplaintRecord> {
        let owner = Identity::new("Dana Vega", Role::Consumer, "acme");
        (0..n)
            .map(|i| {
                ComplaintRecord::create(
                    ComplaintDraft {
                        category: ComplaintCategory::Other,
                        title: format!("Complaint {i}"),
                        description: "Something went wrong over here".to_string(),
                    },
                    &owner,
                    format!("#Ref-{}", 1001 + i),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut view = ListView::new();
        view.goto_page(3);
        assert_eq!(view.query().page, 3);

        view.set_status_filter(Some(ComplaintStatus::Resolved));
        assert_eq!(view.query().page, 1, "filter change resets to page 1");

        view.goto_page(2);
        view.set_search_text("vpn");
        assert_eq!(view.query().page, 1, "search change resets to page 1");
    }

    #[test]
    fn test_unchanged_filter_keeps_page() {
        let mut view = ListView::new();
        view.set_status_filter(Some(ComplaintStatus::Open));
        view.goto_page(2);

        view.set_status_filter(Some(ComplaintStatus::Open));
        assert_eq!(view.query().page, 2, "no-op filter change keeps the page");
    }

    #[test]
    fn test_skipping_the_reset_strands_the_caller() {
        // The documented failure mode: stay on page 3, narrow the filter,
        // and the engine hands back an empty out-of-range page.
        let all = records(25);
        let mut view = ListView::new();
        view.goto_page(3);
        assert_eq!(view.page_of(&all).page_items.len(), 5);

        let mut stale = view.clone();
        stale.query.search_text = "Complaint 7".to_string(); // bypasses the setter
        let page = stale.page_of(&all);
        assert_eq!(page.total_count, 1);
        assert!(page.page_items.is_empty());

        // Going through the setter instead lands on page 1 with the match.
        view.set_search_text("Complaint 7");
        let page = view.page_of(&all);
        assert_eq!(page.page_items.len(), 1);
    }

    #[test]
    fn test_pager_lists_small_page_counts_in_full() {
        assert_eq!(
            pager_items(3, 2),
            vec![PagerItem::Page(1), PagerItem::Page(2), PagerItem::Page(3)]
        );
        assert_eq!(pager_items(1, 1), vec![PagerItem::Page(1)]);
    }

    #[test]
    fn test_pager_windows_large_page_counts() {
        assert_eq!(
            pager_items(20, 10),
            vec![
                PagerItem::Page(1),
                PagerItem::Ellipsis,
                PagerItem::Page(9),
                PagerItem::Page(10),
                PagerItem::Page(11),
                PagerItem::Ellipsis,
                PagerItem::Page(20),
            ]
        );
        // Near the front edge there is no leading ellipsis.
        assert_eq!(
            pager_items(20, 2),
            vec![
                PagerItem::Page(1),
                PagerItem::Page(2),
                PagerItem::Page(3),
                PagerItem::Ellipsis,
                PagerItem::Page(20),
            ]
        );
        // Near the back edge there is no trailing ellipsis.
        assert_eq!(
            pager_items(20, 19),
            vec![
                PagerItem::Page(1),
                PagerItem::Ellipsis,
                PagerItem::Page(18),
                PagerItem::Page(19),
                PagerItem::Page(20),
            ]
        );
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "0 mins ago");
        assert_eq!(relative_time(now - ChronoDuration::minutes(1), now), "1 min ago");
        assert_eq!(relative_time(now - ChronoDuration::minutes(45), now), "45 mins ago");
        assert_eq!(relative_time(now - ChronoDuration::hours(3), now), "3 hours ago");
        assert_eq!(relative_time(now - ChronoDuration::days(1), now), "1 Day ago");
        assert_eq!(relative_time(now - ChronoDuration::days(6), now), "6 Days ago");
    }
}
