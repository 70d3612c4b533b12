//! Pure list/search/pagination engine over a complaint snapshot.
//!
//! `query` is a pure function of its inputs: the same records and the same
//! query always produce the same page. It never mutates state, so it is
//! safe to re-run concurrently with an in-flight mutation against the
//! last-fetched snapshot.
//!
//! Page state is the caller's: whenever any filter or the search text
//! changes, the caller must reset to page 1. The engine deliberately does
//! not do this itself; an out-of-range page simply yields an empty
//! `page_items`, which callers can detect and surface.

use crate::complaint::{ComplaintCategory, ComplaintRecord, ComplaintStatus, Priority};
use serde::{Deserialize, Serialize};

/// Page size used unless the caller configures another one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Search text, field filters and page selection for a complaint list.
///
/// Absent filters are no-ops; active filters AND together. Search matches
/// case-insensitively against `reference` and `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintQuery {
    #[serde(default)]
    pub search_text: String,
    #[serde(default)]
    pub status: Option<ComplaintStatus>,
    #[serde(default)]
    pub category: Option<ComplaintCategory>,
    #[serde(default)]
    pub priority: Option<Priority>,
    /// 1-indexed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ComplaintQuery {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            status: None,
            category: None,
            priority: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ComplaintQuery {
    /// True when any filter or search term is active.
    pub fn is_filtered(&self) -> bool {
        !self.search_text.trim().is_empty()
            || self.status.is_some()
            || self.category.is_some()
            || self.priority.is_some()
    }
}

/// One page of query results plus the totals the pager needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage {
    pub page_items: Vec<ComplaintRecord>,
    pub total_count: usize,
    /// At least 1, even for an empty match set.
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Run a query over a records snapshot.
pub fn query(records: &[ComplaintRecord], q: &ComplaintQuery) -> QueryPage {
    let needle = q.search_text.trim().to_lowercase();

    let matched: Vec<&ComplaintRecord> = records
        .iter()
        .filter(|r| {
            let matches_search = needle.is_empty()
                || r.reference.to_lowercase().contains(&needle)
                || r.title.to_lowercase().contains(&needle);
            let matches_status = q.status.map_or(true, |s| r.status == s);
            let matches_category = q.category.map_or(true, |c| r.category == c);
            let matches_priority = q.priority.map_or(true, |p| r.priority == p);
            matches_search && matches_status && matches_category && matches_priority
        })
        .collect();

    let page_size = if q.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        q.page_size
    };
    let page = q.page.max(1);
    let total_count = matched.len();
    let total_pages = ((total_count + page_size - 1) / page_size).max(1);

    let start = (page - 1).saturating_mul(page_size);
    let page_items = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    QueryPage {
        page_items,
        total_count,
        total_pages,
        page,
        page_size,
    }
}
