//! Domain model and pure projections for bulk action monitoring.
//!
//! Everything in this crate is synchronous and infallible once data has
//! been parsed: the [`store::ActionStore`] mirrors the backend's bulk
//! actions, [`summary`] derives counts from it, and [`filter`] narrows
//! actions or log lines for display. Transports live in
//! `bulkwatch-client`; lifecycle wiring lives in `bulkwatch-bridge`.

pub mod bulk_action;
pub mod error;
pub mod filter;
pub mod log_buffer;
pub mod log_line;
pub mod store;
pub mod summary;
pub mod types;

pub use bulk_action::{BulkAction, BulkActionStatus};
pub use error::CoreError;
pub use filter::{Filterable, StatusKey, Tab, ViewFilter};
pub use log_buffer::LogBuffer;
pub use log_line::{LogLine, LogStatus};
pub use store::ActionStore;
pub use summary::{summarize, ActionSummary};
