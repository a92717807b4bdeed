//! Transport clients for the bulk action backend.
//!
//! Provides the REST API wrapper, a Pusher-protocol push channel
//! client, a Server-Sent Events log feed client, typed wire message
//! parsing, and the [`source`] traits the live update bridge is written
//! against so that tests can substitute in-memory transports.

pub mod api;
pub mod error;
pub mod events;
pub mod logs;
pub mod messages;
pub mod push;
pub mod source;
pub mod sse;

pub use api::{BackendApi, FetchError};
pub use error::StreamError;
pub use events::PushEvent;
pub use logs::{LogFeed, LogStreamClient};
pub use push::{PushClient, PushConnection, PusherConfig};
pub use source::{ActionSource, LogSource, LogStream, PushSource, PushStream};
