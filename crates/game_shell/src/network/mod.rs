//! Network layer
//!
//! A transport-agnostic websocket state machine. The transport is any
//! [`Socket`] implementation; it reports connection events through a
//! [`SocketEventSink`] which the [`WebSocketManager`] drains on the host's
//! frame loop.

mod loopback;
mod websocket;

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use thiserror::Error;

pub use loopback::LoopbackSocket;
pub use websocket::{SendOutcome, WebSocketManager};

/// Network errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetError {
    /// `init` was never called
    #[error("No socket installed")]
    NoSocket,

    /// The connection is in a state that neither sends nor queues
    #[error("Cannot send while {0:?}")]
    NotConnected(NetNodeState),
}

/// Payload of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetData {
    /// Text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
}

impl NetData {
    /// Payload size in bytes
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// True for an empty payload
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for NetData {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for NetData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

/// Connection parameters; either `url` or `host` (+ `port`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConnectOptions {
    /// Server host
    pub host: Option<String>,
    /// Server port
    pub port: Option<u16>,
    /// Full url, takes precedence over host and port
    pub url: Option<String>,
    /// -1 reconnects forever, 0 never, N > 0 at most N times
    pub auto_reconnect: Option<i32>,
}

impl NetConnectOptions {
    /// Options for a full url
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the reconnect budget
    #[must_use]
    pub const fn auto_reconnect(mut self, budget: i32) -> Self {
        self.auto_reconnect = Some(budget);
        self
    }

    /// Address to connect to
    pub fn url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        let host = self.host.as_ref()?;
        Some(match self.port {
            Some(port) => format!("ws://{host}:{port}"),
            None => format!("ws://{host}"),
        })
    }
}

/// Connection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NetNodeState {
    /// No connection
    #[default]
    Closed,
    /// Transport connecting (or waiting to reconnect)
    Connecting,
    /// Connected, handshake in progress
    Checking,
    /// Ready to transfer data
    Working,
}

/// Which network prompt to toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetTipsType {
    /// First connection attempt
    Connecting,
    /// Reconnect after a drop
    ReConnecting,
    /// Waiting for a response
    Requesting,
}

/// Transport events, in the order the transport raised them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// Connection established
    Connected,
    /// Frame received
    Message(NetData),
    /// Transport error; a `Closed` event is expected to follow
    Error(String),
    /// Connection closed
    Closed {
        /// Close code
        code: u16,
        /// Close reason
        reason: String,
    },
}

/// Queue the transport pushes its events into
#[derive(Debug, Clone, Default)]
pub struct SocketEventSink {
    queue: Rc<RefCell<VecDeque<SocketEvent>>>,
}

impl SocketEventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an event
    pub fn push(&self, event: SocketEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Oldest unprocessed event
    pub fn pop(&self) -> Option<SocketEvent> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of unprocessed events
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

/// Pluggable transport
pub trait Socket {
    /// Start connecting; returns false when the attempt could not even start
    fn connect(&mut self, options: &NetConnectOptions, events: SocketEventSink) -> bool;

    /// Transmit a frame, returning the number of bytes handed to the transport
    fn send(&mut self, data: &NetData) -> usize;

    /// Close the connection; the transport reports `Closed` through the sink
    fn close(&mut self, code: Option<u16>, reason: Option<&str>);
}

/// Network prompts shown by the host UI
pub trait NetworkTips {
    /// Connecting prompt
    fn connect_tips(&mut self, show: bool);
    /// Reconnecting prompt
    fn reconnect_tips(&mut self, show: bool);
    /// Waiting-for-response prompt
    fn request_tips(&mut self, show: bool);
    /// Server returned an error code
    fn response_error_code(&mut self, _code: i32) {}
}

/// Protocol specific frames
pub trait ProtocolHelper {
    /// Keep-alive frame sent when the heartbeat timer fires
    fn heartbeat(&self) -> NetData;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_resolution() {
        assert_eq!(
            NetConnectOptions::with_url("wss://game.example/ws").url().as_deref(),
            Some("wss://game.example/ws")
        );

        let options = NetConnectOptions {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            ..NetConnectOptions::default()
        };
        assert_eq!(options.url().as_deref(), Some("ws://127.0.0.1:9000"));
        assert_eq!(NetConnectOptions::default().url(), None);
    }

    #[test]
    fn test_options_from_json() {
        let options: NetConnectOptions =
            serde_json::from_str(r#"{"host": "localhost", "port": 80, "auto_reconnect": -1}"#).unwrap();
        assert_eq!(options.auto_reconnect, Some(-1));
        assert_eq!(options.url().as_deref(), Some("ws://localhost:80"));
    }

    #[test]
    fn test_event_sink_is_fifo_and_shared() {
        let sink = SocketEventSink::new();
        let transport_side = sink.clone();
        transport_side.push(SocketEvent::Connected);
        transport_side.push(SocketEvent::Message("hi".into()));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.pop(), Some(SocketEvent::Connected));
        assert_eq!(sink.pop(), Some(SocketEvent::Message(NetData::Text("hi".to_string()))));
        assert!(sink.is_empty());
    }
}
