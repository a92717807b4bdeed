/// Errors from the push channel and log stream transports.
///
/// These never reach the action store: the bridge logs them, closes the
/// affected source, and reports the feed as disconnected.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StreamError {
    /// Failed to establish the connection or open the stream.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The peer sent something the protocol does not allow.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The connection failed after it was established.
    #[error("Transport error: {0}")]
    Transport(String),
}
