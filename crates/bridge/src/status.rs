//! Feed health and view load state reported to the view layer.

use std::fmt;

/// Health of the live feeds behind one active view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Subscriptions are being opened.
    Connecting,
    /// All configured feeds are open.
    Live,
    /// A feed failed or was closed by the server; no retry is attempted.
    Disconnected { reason: String },
    /// No push credentials were configured and no other feed is open;
    /// data is fetched once.
    Disabled,
}

impl FeedStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Live => f.write_str("live"),
            Self::Disconnected { reason } => write!(f, "disconnected: {reason}"),
            Self::Disabled => f.write_str("live updates disabled"),
        }
    }
}

/// Outcome of a view's initial load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Error(String),
    /// The requested action does not exist on the backend.
    NotFound,
    Loaded,
}
