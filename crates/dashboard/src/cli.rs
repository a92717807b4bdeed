//! Command-line interface for `bulkwatch`.
//!
//! - `bulkwatch list` shows the summary panel and the action grid.
//! - `bulkwatch detail <actionId>` shows one action and its log lines.
//!
//! Both print once and exit unless `--watch` is given, in which case the
//! screen is redrawn on every change until Ctrl-C.

use bulkwatch_core::{BulkActionStatus, LogStatus, Tab};
use clap::{Parser, Subcommand};

/// Monitor bulk actions from the terminal.
#[derive(Debug, Parser)]
#[command(name = "bulkwatch", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List bulk actions with summary counts.
    List {
        /// Status tab: all, completed, in_progress, pending, scheduled.
        #[arg(long, default_value = "all")]
        tab: Tab<BulkActionStatus>,

        /// Case-insensitive match against the action ID.
        #[arg(long, default_value = "")]
        search: String,

        /// Page of the action grid, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Keep the view open and apply live updates.
        #[arg(long)]
        watch: bool,
    },

    /// Show one bulk action and stream its log lines.
    Detail {
        /// Public action identifier.
        action_id: String,

        /// Log status tab: all, queued, skipped, failed.
        #[arg(long, default_value = "all")]
        tab: Tab<LogStatus>,

        /// Case-insensitive match against the record identifier.
        #[arg(long, default_value = "")]
        search: String,

        /// Keep the view open and apply live updates.
        #[arg(long)]
        watch: bool,
    },
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn list_defaults() {
        let cli = Cli::try_parse_from(["bulkwatch", "list"]).unwrap();
        assert_matches!(
            cli.command,
            Command::List { tab: Tab::All, ref search, page: 1, watch: false } if search.is_empty()
        );
    }

    #[test]
    fn list_with_filters() {
        let cli = Cli::try_parse_from([
            "bulkwatch", "list", "--tab", "in_progress", "--search", "ba-", "--page", "2", "--watch",
        ])
        .unwrap();
        assert_matches!(
            cli.command,
            Command::List { tab: Tab::Only(BulkActionStatus::InProgress), page: 2, watch: true, .. }
        );
    }

    #[test]
    fn detail_takes_action_id_and_log_tab() {
        let cli = Cli::try_parse_from(["bulkwatch", "detail", "BA-7", "--tab", "failed"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Detail { ref action_id, tab: Tab::Only(LogStatus::Failed), .. } if action_id == "BA-7"
        );
    }

    #[test]
    fn unknown_tab_is_rejected() {
        assert!(Cli::try_parse_from(["bulkwatch", "list", "--tab", "Completed"]).is_err());
        assert!(Cli::try_parse_from(["bulkwatch", "detail", "x", "--tab", "pending"]).is_err());
    }
}
