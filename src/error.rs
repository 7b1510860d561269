//! Error taxonomy shared by every adapter.
//!
//! Two families are kept apart:
//! transport failures (socket errors, broker ERROR frames) are delivered
//! through the `on_error` callback, while programming errors such as calling
//! `send` on the pub/sub adapter are returned at the call site as
//! [`ClientError::Unsupported`].

/// Errors produced by adapters, sessions, and the frame codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The active adapter does not support this operation.
    Unsupported(&'static str),
    /// The operation needs an established session and none exists.
    NotConnected,
    /// The transport failed before the connection was established.
    ConnectionFailed(String),
    /// Socket-level failure on an established connection.
    Transport(String),
    /// The broker answered with an ERROR frame.
    Broker(String),
    /// A STOMP frame could not be decoded.
    Frame(String),
    /// The transport task has ended.
    Closed,
}

impl ClientError {
    /// Returns `true` for errors that originate in the transport rather than
    /// in how the caller used the adapter.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::Transport(_) | Self::Broker(_) | Self::Closed
        )
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(op) => write!(f, "Operation not supported by this adapter: {op}"),
            Self::NotConnected => write!(f, "Not connected"),
            Self::ConnectionFailed(msg) => write!(f, "Connection failed: {msg}"),
            Self::Transport(msg) => write!(f, "Transport error: {msg}"),
            Self::Broker(msg) => write!(f, "Broker error: {msg}"),
            Self::Frame(msg) => write!(f, "Malformed frame: {msg}"),
            Self::Closed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for ClientError {}
