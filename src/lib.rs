//! Socket Client - transport-agnostic real-time messaging.
//!
//! One capability interface, [`ClientAdapter`], with two implementations:
//! a raw duplex WebSocket adapter and a STOMP publish/subscribe adapter.
//! Application code talks to a [`WebSocketClient`] facade and never learns
//! which transport sits underneath.
//!
//! # Architecture
//!
//! - **Facade** - [`WebSocketClient`] forwards to exactly one adapter
//! - **Adapters** - [`SocketAdapter`] (raw frames) and [`StompAdapter`]
//!   (topics, via the [`PubSub`] trait)
//! - **Transport tasks** - each live connection is one tokio task that owns
//!   the socket and publishes status through a `watch` channel
//! - **Plugins** - optional hooks, see [`plugin`]
//!
//! # Modules
//!
//! - [`adapter`] - capability interface and adapters
//! - [`stomp`] - STOMP frame codec and broker session
//! - [`ws`] - WebSocket connect and split halves
//! - [`echo`] - echo server used by `serve` and the tests
//! - [`config`] - configuration loading/saving

// Library modules
pub mod adapter;
pub mod client;
pub mod config;
pub mod echo;
pub mod error;
pub mod plugin;
pub mod stomp;
pub mod ws;

// Re-export commonly used types
pub use adapter::{
    ClientAdapter, CloseInfo, NetworkStatus, PubSub, SocketAdapter, StompAdapter, Topics,
};
pub use client::{SocketClient, StompClient, WebSocketClient};
pub use config::{BrokerConfig, Config};
pub use error::ClientError;
pub use plugin::{LoggingPlugin, Plugged, Plugin};
