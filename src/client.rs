//! Client facade over exactly one transport adapter.
//!
//! [`WebSocketClient`] forwards every call to the adapter it was built with.
//! [`SocketClient`] and [`StompClient`] pin the adapter type so callers do not
//! have to choose one explicitly.

use std::sync::Arc;

use crate::adapter::{
    ClientAdapter, CloseInfo, NetworkStatus, PubSub, SocketAdapter, StompAdapter, Topics,
};
use crate::config::{BrokerConfig, Config};
use crate::error::ClientError;

/// Facade holding one adapter for its whole lifetime.
///
/// The adapter cannot be swapped out or taken back:
///
/// ```compile_fail
/// let mut client = socket_client::SocketClient::default();
/// *client.adapter_mut() = socket_client::SocketAdapter::new("ws://elsewhere:1");
/// ```
///
/// ```compile_fail
/// let client = socket_client::SocketClient::default();
/// let _adapter = client.into_inner();
/// ```
#[derive(Debug, Default)]
pub struct WebSocketClient<A> {
    adapter: A,
}

/// Facade pinned to the raw socket adapter.
pub type SocketClient = WebSocketClient<SocketAdapter>;

/// Facade pinned to the pub/sub adapter.
pub type StompClient = WebSocketClient<StompAdapter>;

impl<A: ClientAdapter> WebSocketClient<A> {
    /// Wrap `adapter`.
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }

    /// See [`ClientAdapter::connect`].
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        self.adapter.connect().await
    }

    /// See [`ClientAdapter::disconnect`].
    pub fn disconnect(&mut self) {
        self.adapter.disconnect();
    }

    /// See [`ClientAdapter::send`].
    pub fn send(&self, data: &str) -> Result<(), ClientError> {
        self.adapter.send(data)
    }

    /// Replace the message callback.
    pub fn on_message<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.adapter.on_message(Arc::new(callback));
    }

    /// Replace the error callback.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.adapter.on_error(Arc::new(callback));
    }

    /// Replace the close callback.
    pub fn on_close<F>(&self, callback: F)
    where
        F: Fn(&CloseInfo) + Send + Sync + 'static,
    {
        self.adapter.on_close(Arc::new(callback));
    }

    /// Replace the connect callback.
    pub fn on_connect<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.adapter.on_connect(Arc::new(callback));
    }

    /// Live connection status.
    pub fn status(&self) -> NetworkStatus {
        self.adapter.network_status()
    }

    /// The held adapter, read-only.
    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

/// Pub/sub operations, present only when the held adapter implements
/// [`PubSub`]. A raw socket client has none of these.
impl<A: ClientAdapter + PubSub> WebSocketClient<A> {
    /// See [`PubSub::subscribe`].
    pub fn subscribe<T, F>(&mut self, topics: &T, callback: F) -> Result<(), ClientError>
    where
        T: Topics + ?Sized,
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.adapter.subscribe(topics, Arc::new(callback))
    }

    /// See [`PubSub::unsubscribe`].
    pub fn unsubscribe<T: Topics + ?Sized>(&mut self, topics: &T) {
        self.adapter.unsubscribe(topics);
    }

    /// See [`PubSub::publish`].
    pub fn publish(&self, topic: &str, body: &str) -> Result<(), ClientError> {
        self.adapter.publish(topic, body)
    }

    /// See [`PubSub::publish_with_headers`].
    pub fn publish_with_headers(
        &self,
        topic: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<(), ClientError> {
        self.adapter.publish_with_headers(topic, body, headers)
    }

    /// See [`PubSub::is_subscribed`].
    pub fn is_subscribed<T: Topics + ?Sized>(&self, topics: &T) -> bool {
        self.adapter.is_subscribed(topics)
    }
}

impl WebSocketClient<SocketAdapter> {
    /// Raw socket client for `url`.
    pub fn socket(url: impl Into<String>) -> Self {
        Self::new(SocketAdapter::new(url))
    }

    /// Raw socket client for the configured endpoint.
    pub fn from_config(config: &Config) -> Self {
        Self::socket(config.socket_url.clone())
    }
}

impl WebSocketClient<StompAdapter> {
    /// Pub/sub client for `config`.
    pub fn stomp(config: BrokerConfig) -> Self {
        Self::new(StompAdapter::new(config))
    }
}
