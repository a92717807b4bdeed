//! Plain-text rendering of the list and detail screens.
//!
//! Every function here is pure: it takes snapshots and returns the text
//! to print. The summary is always computed over the full action list;
//! tab and search only narrow the grid. Neither is drawn until the
//! initial fetch has succeeded.

use std::fmt::Write;

use bulkwatch_bridge::{FeedStatus, ViewState};
use bulkwatch_core::filter::{derive_view, page_count, paginate, DEFAULT_PAGE_SIZE};
use bulkwatch_core::{
    summarize, ActionSummary, BulkAction, BulkActionStatus, LogLine, LogStatus, ViewFilter,
};
use chrono::{DateTime, Utc};

const NOT_AVAILABLE: &str = "N/A";

/// Inputs for one draw of the list screen.
pub struct ListScreen<'a> {
    pub actions: &'a [BulkAction],
    pub filter: &'a ViewFilter<BulkActionStatus>,
    /// Zero-based grid page.
    pub page: usize,
    pub state: &'a ViewState,
    /// Live feed health; `None` for a one-shot draw.
    pub feed: Option<&'a FeedStatus>,
}

/// Inputs for one draw of the detail screen.
pub struct DetailScreen<'a> {
    pub action: Option<&'a BulkAction>,
    pub lines: &'a [LogLine],
    pub filter: &'a ViewFilter<LogStatus>,
    pub state: &'a ViewState,
    /// Live feed health; `None` for a one-shot draw.
    pub feed: Option<&'a FeedStatus>,
}

pub fn render_list(screen: &ListScreen<'_>) -> String {
    let mut out = String::new();
    if let Some(banner) = screen.feed.and_then(feed_banner) {
        let _ = writeln!(out, "{banner}\n");
    }

    match screen.state {
        ViewState::Loading => out.push_str("Loading...\n"),
        ViewState::Error(message) => {
            let _ = writeln!(out, "Failed to fetch actions: {message}");
        }
        ViewState::NotFound | ViewState::Loaded => {
            out.push_str(&render_summary(&summarize(screen.actions)));
            let _ = writeln!(
                out,
                "\nTab: {}  Search: {}\n",
                screen.filter.tab,
                display_query(&screen.filter.query)
            );
            let rows = derive_view(screen.actions, screen.filter);
            out.push_str(&render_action_grid(&rows, screen.page, DEFAULT_PAGE_SIZE));
        }
    }
    out
}

pub fn render_detail(screen: &DetailScreen<'_>) -> String {
    let mut out = String::new();
    if let Some(banner) = screen.feed.and_then(feed_banner) {
        let _ = writeln!(out, "{banner}\n");
    }

    let action = match (screen.state, screen.action) {
        (ViewState::Loading, _) => return out + "Loading...\n",
        (ViewState::Error(message), _) => {
            let _ = writeln!(out, "Failed to fetch action details: {message}");
            return out;
        }
        (ViewState::NotFound, _) | (ViewState::Loaded, None) => {
            return out + "No action details found\n";
        }
        (ViewState::Loaded, Some(action)) => action,
    };

    out.push_str(&render_action_card(action));
    let _ = writeln!(
        out,
        "\nLogs  Tab: {}  Search: {}\n",
        screen.filter.tab,
        display_query(&screen.filter.query)
    );
    let rows = derive_view(screen.lines, screen.filter);
    out.push_str(&render_log_table(&rows, screen.lines.len()));
    out
}

/// The five summary counters on one line.
pub fn render_summary(summary: &ActionSummary) -> String {
    format!(
        "Bulk Actions Summary\n\
         Total Actions: {}  Completed: {}  In Progress: {}  Pending: {}  Scheduled: {}\n",
        summary.total, summary.completed, summary.in_progress, summary.pending, summary.scheduled,
    )
}

/// One page of the action grid plus a page footer.
pub fn render_action_grid(rows: &[&BulkAction], page: usize, page_size: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:>13}  {:<19}  {:<12}  {:<11}  {}",
        "Action ID", "Total Records", "Created At", "Action Type", "Status", "Entity"
    );
    for action in paginate(rows, page, page_size) {
        let _ = writeln!(
            out,
            "{:<36}  {:>13}  {:<19}  {:<12}  {:<11}  {}",
            action.action_id,
            action.total_records,
            format_time(&action.created_at),
            action.action_type,
            action.status,
            action.entity,
        );
    }

    let pages = page_count(rows.len(), page_size).max(1);
    let _ = writeln!(
        out,
        "\nPage {} of {} ({} matching)",
        page + 1,
        pages,
        rows.len()
    );
    out
}

/// Labelled fields of one action. Missing values print as `N/A`.
pub fn render_action_card(action: &BulkAction) -> String {
    let fields = [
        ("Action ID", action.action_id.clone()),
        ("Status", action.status.to_string()),
        ("Created At", format_time(&action.created_at)),
        ("Total Records", action.total_records.to_string()),
        ("Is Scheduled", if action.is_scheduled { "Yes" } else { "No" }.to_string()),
        ("Scheduled Time", or_na(action.scheduled_time.as_ref().map(format_time))),
        ("Action Type", action.action_type.clone()),
        ("Entity", action.entity.clone()),
        ("Skipped Count", or_na(action.skipped_count)),
        ("Failed Count", or_na(action.failed_count)),
        ("Success Count", or_na(action.success_count)),
        ("Completed At", or_na(action.completed_at.as_ref().map(format_time))),
    ];

    let mut out = String::from("Action Details\n");
    for (label, value) in fields {
        let _ = writeln!(out, "  {label:<15} {value}");
    }
    out
}

/// Log rows in arrival order with a count footer.
pub fn render_log_table(rows: &[&LogLine], total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<40}  {:<8}  Created At", "Identifier", "Status");
    for line in rows {
        let _ = writeln!(
            out,
            "{:<40}  {:<8}  {}",
            line.identifier,
            line.status,
            format_time(&line.created_at)
        );
    }
    let _ = writeln!(out, "\n{} of {} lines", rows.len(), total);
    out
}

/// A one-line notice when live updates are not flowing.
pub fn feed_banner(feed: &FeedStatus) -> Option<String> {
    match feed {
        FeedStatus::Connecting | FeedStatus::Live => None,
        FeedStatus::Disconnected { reason } => {
            Some(format!("[!] Live updates disconnected ({reason}); data may be stale"))
        }
        FeedStatus::Disabled => Some("[i] Live updates disabled (fetch-only mode)".to_string()),
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn or_na(value: Option<impl ToString>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn display_query(query: &str) -> &str {
    if query.is_empty() {
        "-"
    } else {
        query
    }
}
