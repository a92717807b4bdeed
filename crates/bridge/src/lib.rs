//! Live update bridge between the transports and the in-memory views.
//!
//! A [`ListBridge`] or [`DetailBridge`] is created once per view kind and
//! activated each time the view is shown. Activation returns an
//! [`ActiveBridge`] that owns the push subscription (and, for the detail
//! view, the log stream) until it is deactivated or dropped. Every
//! mutation passes through an [`EventSink`] that checks the instance's
//! generation, so callbacks from a torn-down instance never reach the
//! shared [`StoreHandle`].

pub mod bridge;
pub mod handle;
pub mod sink;
pub mod slot;
pub mod status;

pub use bridge::{ActiveBridge, DetailBridge, ListBridge, Sources};
pub use handle::{LogHandle, StoreHandle};
pub use sink::{Applied, EventSink, ViewKind};
pub use slot::{GenerationGuard, ViewSlot};
pub use status::{FeedStatus, ViewState};
