//! Push channel client speaking the Pusher WebSocket protocol.
//!
//! [`PushClient`] holds the connection settings for one Pusher app.
//! Call [`PushClient::connect`] to open a [`PushConnection`], then
//! [`PushConnection::subscribe`] and pull events with
//! [`PushConnection::next_event`]. Keepalive pings are answered while
//! pulling; there is no automatic reconnection.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::StreamError;
use crate::events::PushEvent;
use crate::messages::{
    parse_message, pong_frame, subscribe_frame, unsubscribe_frame, PusherMessage, PROTOCOL_VERSION,
};

/// Client name reported in the connection URL.
const CLIENT_NAME: &str = "bulkwatch";

/// How long to wait for `pusher:connection_established` after the
/// WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Credentials and location of a Pusher (or Pusher-compatible) app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PusherConfig {
    /// Public app key.
    pub key: String,
    /// Cluster/region, e.g. `eu` or `ap2`.
    pub cluster: String,
    /// Host override for self-hosted servers. May carry a `ws://` or
    /// `wss://` scheme; defaults to `wss://ws-{cluster}.pusher.com`.
    pub host: Option<String>,
}

impl PusherConfig {
    pub fn new(key: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cluster: cluster.into(),
            host: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Full WebSocket URL for this app.
    pub fn ws_url(&self) -> String {
        let origin = match &self.host {
            Some(host) if host.starts_with("ws://") || host.starts_with("wss://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("wss://{}", host.trim_end_matches('/')),
            None => format!("wss://ws-{}.pusher.com", self.cluster),
        };
        format!(
            "{origin}/app/{}?protocol={PROTOCOL_VERSION}&client={CLIENT_NAME}&version={}",
            self.key,
            env!("CARGO_PKG_VERSION"),
        )
    }
}

/// Connection settings for one Pusher app.
#[derive(Debug, Clone)]
pub struct PushClient {
    config: PusherConfig,
}

/// A live WebSocket connection to the push service.
pub struct PushConnection {
    /// Server-assigned socket id from the handshake.
    pub socket_id: String,
    /// Channel subscribed through this connection, if any.
    channel: Option<String>,
    ws_stream: WsStream,
}

impl PushClient {
    pub fn new(config: PusherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PusherConfig {
        &self.config
    }

    /// Open the WebSocket and wait for the protocol handshake.
    pub async fn connect(&self) -> Result<PushConnection, StreamError> {
        let url = self.config.ws_url();

        let (mut ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            StreamError::Connection(format!("Failed to connect to push service: {e}"))
        })?;

        let socket_id = tokio::time::timeout(HANDSHAKE_TIMEOUT, await_handshake(&mut ws_stream))
            .await
            .map_err(|_| StreamError::Connection("Timed out waiting for handshake".into()))??;

        tracing::info!(
            socket_id = %socket_id,
            cluster = %self.config.cluster,
            "Connected to push service",
        );

        Ok(PushConnection {
            socket_id,
            channel: None,
            ws_stream,
        })
    }
}

/// Read frames until `pusher:connection_established` arrives.
async fn await_handshake(ws_stream: &mut WsStream) -> Result<String, StreamError> {
    while let Some(frame) = ws_stream.next().await {
        let frame = frame.map_err(|e| StreamError::Connection(e.to_string()))?;
        let Message::Text(text) = frame else {
            continue;
        };
        match parse_message(&text) {
            Ok(PusherMessage::ConnectionEstablished { socket_id, .. }) => return Ok(socket_id),
            Ok(PusherMessage::Error { code, message }) => {
                return Err(StreamError::Connection(format!(
                    "Push service refused connection ({code:?}): {message}"
                )));
            }
            Ok(other) => {
                tracing::debug!(?other, "Ignoring frame before handshake");
            }
            Err(e) => {
                tracing::warn!(error = %e, raw_message = %text, "Malformed handshake frame");
            }
        }
    }
    Err(StreamError::Connection(
        "Connection closed before handshake".into(),
    ))
}

impl PushConnection {
    /// Subscribe to a public channel.
    ///
    /// The acknowledgement arrives asynchronously and is only logged.
    pub async fn subscribe(&mut self, channel: &str) -> Result<(), StreamError> {
        self.send_text(subscribe_frame(channel)).await?;
        self.channel = Some(channel.to_string());
        tracing::debug!(channel, "Subscription requested");
        Ok(())
    }

    /// Pull the next bulk action event.
    ///
    /// Answers pings and skips protocol chatter and malformed payloads.
    /// Returns `Ok(None)` once the server closes the connection and
    /// `Err` on a transport failure or a `pusher:error` frame.
    pub async fn next_event(&mut self) -> Result<Option<PushEvent>, StreamError> {
        while let Some(frame) = self.ws_stream.next().await {
            match frame.map_err(|e| StreamError::Transport(e.to_string()))? {
                Message::Text(text) => {
                    if let Some(event) = self.handle_text(&text).await? {
                        return Ok(Some(event));
                    }
                }
                Message::Binary(_) => {
                    tracing::trace!("Ignoring binary frame");
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Handled automatically by tungstenite.
                }
                Message::Close(frame) => {
                    tracing::info!(?frame, "Push service closed WebSocket");
                    return Ok(None);
                }
                Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    /// Unsubscribe and close the socket. Errors are logged, not returned:
    /// the connection is being discarded either way.
    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = self.send_text(unsubscribe_frame(&channel)).await {
                tracing::debug!(error = %e, channel = %channel, "Unsubscribe failed");
            }
        }
        if let Err(e) = self.ws_stream.close(None).await {
            tracing::debug!(error = %e, "WebSocket close failed");
        }
    }

    // ---- private helpers ----

    async fn handle_text(&mut self, text: &str) -> Result<Option<PushEvent>, StreamError> {
        let message = match parse_message(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, raw_message = %text, "Failed to parse push frame");
                return Ok(None);
            }
        };

        match message {
            PusherMessage::Ping => {
                self.send_text(pong_frame()).await?;
                Ok(None)
            }
            PusherMessage::Error { code, message } => Err(StreamError::Protocol(format!(
                "Push service error ({code:?}): {message}"
            ))),
            PusherMessage::SubscriptionSucceeded { channel } => {
                tracing::info!(channel = %channel, "Subscribed to push channel");
                Ok(None)
            }
            PusherMessage::Channel(event) => {
                if self.channel.as_deref() != Some(event.channel.as_str()) {
                    tracing::trace!(channel = %event.channel, "Event for another channel");
                    return Ok(None);
                }
                match PushEvent::from_channel_event(&event) {
                    Ok(Some(push_event)) => Ok(Some(push_event)),
                    Ok(None) => {
                        tracing::debug!(event = %event.event, "Ignoring unhandled push event");
                        Ok(None)
                    }
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            event = %event.event,
                            "Malformed bulk action payload",
                        );
                        Ok(None)
                    }
                }
            }
            other => {
                tracing::trace!(?other, "Ignoring protocol frame");
                Ok(None)
            }
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.ws_stream
            .send(Message::Text(text))
            .await
            .map_err(|e| StreamError::Transport(e.to_string()))
    }
}
