//! Capability interface shared by every transport adapter.
//!
//! # Architecture
//!
//! ```text
//! ClientAdapter (trait)
//!     │
//!     ├── SocketAdapter   raw duplex WebSocket, payloads passed through
//!     │
//!     └── StompAdapter    STOMP session, plus the PubSub extension trait
//! ```
//!
//! Adapters own a handle to their transport task (present only after
//! `connect()`), a shared [`CallbackRegistry`], and, for pub/sub, the topic to
//! subscription mapping. Connection status belongs to the transport task and
//! is read live through [`StatusReceiver`].

pub mod callbacks;
pub mod socket;
pub mod stomp;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::ClientError;

pub use callbacks::{
    Callback, CallbackRegistry, CloseCallback, CloseInfo, ConnectCallback, ErrorCallback, Event,
    EventKind, MessageCallback,
};
pub use socket::{SocketAdapter, DEFAULT_SOCKET_URL};
pub use stomp::{PubSub, StompAdapter, Topics};

/// Connection status, numerically mirroring the WebSocket `readyState` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NetworkStatus {
    /// Handshake in progress.
    Connecting = 0,
    /// Established; frames may flow.
    Open = 1,
    /// Close requested, waiting for the peer.
    Closing = 2,
    /// No connection.
    #[default]
    Closed = 3,
}

impl NetworkStatus {
    /// The numeric status code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether this status still owns a usable or pending connection.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

impl std::fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connecting => "CONNECTING",
            Self::Open => "OPEN",
            Self::Closing => "CLOSING",
            Self::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

/// Status published by a transport task.
pub type StatusSender = watch::Sender<NetworkStatus>;
/// Live view of a transport task's status.
pub type StatusReceiver = watch::Receiver<NetworkStatus>;

/// Create a status channel starting at `Connecting`.
pub(crate) fn status_channel() -> (StatusSender, StatusReceiver) {
    watch::channel(NetworkStatus::Connecting)
}

/// Operations every transport adapter supports.
///
/// Callback registration replaces the previous callback of the same kind.
/// Callbacks run on the transport task, in the order the transport delivers
/// events, and must not block.
#[async_trait]
pub trait ClientAdapter: Send + Sync {
    /// Establish the connection.
    ///
    /// Resolves once the transport reports the connection as established.
    /// There is no built-in timeout: a transport that never opens keeps this
    /// pending, so wrap it in `tokio::time::timeout` if that matters.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionFailed`] when the transport fails
    /// before opening; the same failure is also dispatched to `on_error`.
    async fn connect(&mut self) -> Result<(), ClientError>;

    /// Request teardown. A no-op when not connected.
    fn disconnect(&mut self);

    /// Hand `data` to the transport.
    ///
    /// # Errors
    ///
    /// Adapters that cannot send raw payloads return
    /// [`ClientError::Unsupported`].
    fn send(&self, data: &str) -> Result<(), ClientError>;

    /// Register the message callback.
    fn on_message(&self, callback: MessageCallback);

    /// Register the error callback.
    fn on_error(&self, callback: ErrorCallback);

    /// Register the close callback.
    fn on_close(&self, callback: CloseCallback);

    /// Register the connect-success callback.
    fn on_connect(&self, callback: ConnectCallback);

    /// Live connection status; `Closed` before the first `connect()`.
    fn network_status(&self) -> NetworkStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_mirror_ready_state() {
        assert_eq!(NetworkStatus::Connecting.code(), 0);
        assert_eq!(NetworkStatus::Open.code(), 1);
        assert_eq!(NetworkStatus::Closing.code(), 2);
        assert_eq!(NetworkStatus::Closed.code(), 3);
    }

    #[test]
    fn test_default_status_is_closed() {
        assert_eq!(NetworkStatus::default(), NetworkStatus::Closed);
        assert_eq!(NetworkStatus::Closed.to_string(), "CLOSED");
    }
}
