//! Pusher channels protocol frames.
//!
//! Every frame on the socket is a JSON object
//! `{"event": "<name>", "channel": "<channel>", "data": ...}` where
//! `data` is usually itself a JSON-encoded string. This module parses
//! inbound frames into [`PusherMessage`] and builds the few outbound
//! frames the client sends.

use serde::{Deserialize, Serialize};

/// Protocol revision requested in the connection URL.
pub const PROTOCOL_VERSION: u8 = 7;

pub const EVENT_CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
pub const EVENT_ERROR: &str = "pusher:error";
pub const EVENT_PING: &str = "pusher:ping";
pub const EVENT_PONG: &str = "pusher:pong";
pub const EVENT_SUBSCRIBE: &str = "pusher:subscribe";
pub const EVENT_UNSUBSCRIBE: &str = "pusher:unsubscribe";
pub const EVENT_SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";

/// Prefixes reserved for protocol-level events.
const RESERVED_PREFIXES: &[&str] = &["pusher:", "pusher_internal:"];

/// A raw frame as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PusherFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// All inbound frames the client distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum PusherMessage {
    /// Handshake completed; the server assigned a socket id.
    ConnectionEstablished {
        socket_id: String,
        /// Seconds of silence after which the server expects a ping.
        activity_timeout: Option<u64>,
    },

    /// A `pusher:subscribe` request was accepted.
    SubscriptionSucceeded { channel: String },

    /// Server keepalive; must be answered with a pong.
    Ping,

    /// Reply to a client ping.
    Pong,

    /// The server rejected something or is about to close the socket.
    Error { code: Option<u16>, message: String },

    /// Any other reserved protocol event.
    Internal { event: String },

    /// An application event published on a channel.
    Channel(ChannelEvent),
}

/// An application event delivered on a subscribed channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub channel: String,
    pub event: String,
    /// Decoded payload (string-encoded JSON has already been unwrapped).
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ConnectionData {
    socket_id: String,
    #[serde(default)]
    activity_timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Parse one inbound text frame.
///
/// Returns `Err` for malformed JSON or a reserved event whose payload
/// does not match the protocol. Callers should log and continue.
pub fn parse_message(text: &str) -> Result<PusherMessage, serde_json::Error> {
    let PusherFrame {
        event,
        channel,
        data,
    } = serde_json::from_str(text)?;

    let message = match event.as_str() {
        EVENT_CONNECTION_ESTABLISHED => {
            let data: ConnectionData = serde_json::from_value(decode_data(data)?)?;
            PusherMessage::ConnectionEstablished {
                socket_id: data.socket_id,
                activity_timeout: data.activity_timeout,
            }
        }
        EVENT_SUBSCRIPTION_SUCCEEDED => PusherMessage::SubscriptionSucceeded {
            channel: channel.unwrap_or_default(),
        },
        EVENT_PING => PusherMessage::Ping,
        EVENT_PONG => PusherMessage::Pong,
        EVENT_ERROR => {
            let data: ErrorPayload = serde_json::from_value(decode_data(data)?)?;
            PusherMessage::Error {
                code: data.code,
                message: data.message,
            }
        }
        name if is_reserved(name) => PusherMessage::Internal {
            event: name.to_string(),
        },
        name => PusherMessage::Channel(ChannelEvent {
            channel: channel.unwrap_or_default(),
            event: name.to_string(),
            data: decode_data(data)?,
        }),
    };

    Ok(message)
}

/// Unwrap Pusher's double encoding: a string payload holds JSON text.
///
/// Object payloads (sent by some Pusher-compatible servers) pass
/// through unchanged, as does `null`.
pub fn decode_data(data: serde_json::Value) -> Result<serde_json::Value, serde_json::Error> {
    match data {
        serde_json::Value::String(text) => serde_json::from_str(&text),
        other => Ok(other),
    }
}

fn is_reserved(event: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| event.starts_with(prefix))
}

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// `pusher:subscribe` for a public channel.
pub fn subscribe_frame(channel: &str) -> String {
    serde_json::json!({
        "event": EVENT_SUBSCRIBE,
        "data": { "channel": channel },
    })
    .to_string()
}

/// `pusher:unsubscribe` for a public channel.
pub fn unsubscribe_frame(channel: &str) -> String {
    serde_json::json!({
        "event": EVENT_UNSUBSCRIBE,
        "data": { "channel": channel },
    })
    .to_string()
}

/// Reply to a server `pusher:ping`.
pub fn pong_frame() -> String {
    serde_json::json!({ "event": EVENT_PONG, "data": {} }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_connection_established_with_string_data() {
        let json = r#"{"event":"pusher:connection_established","data":"{\"socket_id\":\"123.456\",\"activity_timeout\":120}"}"#;
        let msg = parse_message(json).unwrap();
        assert_eq!(
            msg,
            PusherMessage::ConnectionEstablished {
                socket_id: "123.456".into(),
                activity_timeout: Some(120),
            }
        );
    }

    #[test]
    fn parse_subscription_succeeded() {
        let json = r#"{"event":"pusher_internal:subscription_succeeded","channel":"bulk-action","data":"{}"}"#;
        match parse_message(json).unwrap() {
            PusherMessage::SubscriptionSucceeded { channel } => assert_eq!(channel, "bulk-action"),
            other => panic!("Expected SubscriptionSucceeded, got {other:?}"),
        }
    }

    #[test]
    fn parse_ping_without_data() {
        let json = r#"{"event":"pusher:ping"}"#;
        assert_eq!(parse_message(json).unwrap(), PusherMessage::Ping);
    }

    #[test]
    fn parse_error_with_object_data() {
        let json = r#"{"event":"pusher:error","data":{"code":4001,"message":"App key not in this cluster"}}"#;
        match parse_message(json).unwrap() {
            PusherMessage::Error { code, message } => {
                assert_eq!(code, Some(4001));
                assert_eq!(message, "App key not in this cluster");
            }
            other => panic!("Expected Error, got {other:?}"),
        }
    }

    #[test]
    fn parse_error_with_null_code() {
        let json = r#"{"event":"pusher:error","data":{"code":null,"message":"Existing subscription"}}"#;
        match parse_message(json).unwrap() {
            PusherMessage::Error { code, .. } => assert!(code.is_none()),
            other => panic!("Expected Error, got {other:?}"),
        }
    }

    #[test]
    fn parse_unknown_reserved_event_as_internal() {
        let json = r#"{"event":"pusher_internal:member_added","channel":"presence-x","data":"{}"}"#;
        match parse_message(json).unwrap() {
            PusherMessage::Internal { event } => assert_eq!(event, "pusher_internal:member_added"),
            other => panic!("Expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn parse_channel_event_unwraps_string_data() {
        let json = r#"{"event":"new-bulk-action","channel":"bulk-action","data":"{\"bulkAction\":{\"id\":1}}"}"#;
        match parse_message(json).unwrap() {
            PusherMessage::Channel(ev) => {
                assert_eq!(ev.channel, "bulk-action");
                assert_eq!(ev.event, "new-bulk-action");
                assert_eq!(ev.data["bulkAction"]["id"], 1);
            }
            other => panic!("Expected Channel, got {other:?}"),
        }
    }

    #[test]
    fn parse_channel_event_accepts_object_data() {
        let json = r#"{"event":"bulk-action-updated","channel":"bulk-action","data":{"bulkAction":{"id":2}}}"#;
        match parse_message(json).unwrap() {
            PusherMessage::Channel(ev) => assert_eq!(ev.data["bulkAction"]["id"], 2),
            other => panic!("Expected Channel, got {other:?}"),
        }
    }

    #[test]
    fn parse_channel_event_with_broken_string_data_fails() {
        let json = r#"{"event":"new-bulk-action","channel":"bulk-action","data":"{not json"}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn parse_invalid_json_returns_error() {
        assert!(parse_message("not json at all").is_err());
    }

    #[test]
    fn outbound_frames_are_well_formed() {
        let sub: serde_json::Value = serde_json::from_str(&subscribe_frame("bulk-action")).unwrap();
        assert_eq!(sub["event"], EVENT_SUBSCRIBE);
        assert_eq!(sub["data"]["channel"], "bulk-action");

        let unsub: serde_json::Value =
            serde_json::from_str(&unsubscribe_frame("bulk-action")).unwrap();
        assert_eq!(unsub["event"], EVENT_UNSUBSCRIBE);

        let pong: serde_json::Value = serde_json::from_str(&pong_frame()).unwrap();
        assert_eq!(pong["event"], EVENT_PONG);
    }
}
