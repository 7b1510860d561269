//! Publish/subscribe adapter over a STOMP broker session.
//!
//! The adapter owns at most one active [`StompSession`] and a
//! topic-to-subscription map. After `disconnect()` the deactivated session is
//! kept until the next `connect()` so the reported status follows it through
//! CLOSING to CLOSED. A topic is a key in the map exactly while an active subscription for
//! it exists; removing the key drops the [`Subscription`], which tells the
//! broker to stop delivering.
//!
//! Callback semantics differ from the raw socket adapter:
//!
//! - `on_connect` fires each time the broker accepts the session
//! - `on_error` receives broker ERROR frames and transport failures
//! - `on_close` fires whenever a broker connection ends, including ones the
//!   session will reconnect from
//! - `on_message` observes every publication delivered to a topic callback
//!
//! Raw `send()` is not available here; use [`PubSub::publish`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{
    Callback, CallbackRegistry, ClientAdapter, CloseCallback, ConnectCallback, ErrorCallback,
    MessageCallback, NetworkStatus,
};
use crate::config::BrokerConfig;
use crate::error::ClientError;
use crate::stomp::{StompSession, Subscription};

/// Content type sent with `publish` when the caller gives no headers.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// One topic or a set of topics.
pub trait Topics {
    /// The named topics, in order.
    fn topic_list(&self) -> Vec<&str>;
}

impl Topics for str {
    fn topic_list(&self) -> Vec<&str> {
        vec![self]
    }
}

impl Topics for String {
    fn topic_list(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Topics for [&str] {
    fn topic_list(&self) -> Vec<&str> {
        self.to_vec()
    }
}

impl Topics for [String] {
    fn topic_list(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }
}

impl Topics for Vec<&str> {
    fn topic_list(&self) -> Vec<&str> {
        self.as_slice().topic_list()
    }
}

impl Topics for Vec<String> {
    fn topic_list(&self) -> Vec<&str> {
        self.as_slice().topic_list()
    }
}

impl<const N: usize> Topics for [&str; N] {
    fn topic_list(&self) -> Vec<&str> {
        self.as_slice().topic_list()
    }
}

impl<const N: usize> Topics for [String; N] {
    fn topic_list(&self) -> Vec<&str> {
        self.as_slice().topic_list()
    }
}

/// Operations only a publish/subscribe adapter supports.
pub trait PubSub {
    /// Subscribe `callback` to every topic not already subscribed.
    ///
    /// Already-subscribed topics keep their existing callback.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] if `connect()` has not created a session.
    fn subscribe<T: Topics + ?Sized>(
        &mut self,
        topics: &T,
        callback: MessageCallback,
    ) -> Result<(), ClientError>;

    /// Drop the subscription for each topic. Unknown topics are ignored.
    fn unsubscribe<T: Topics + ?Sized>(&mut self, topics: &T);

    /// Publish `body` on `topic` with `content-type: application/json`.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] unless the session is open.
    fn publish(&self, topic: &str, body: &str) -> Result<(), ClientError> {
        let headers = [("content-type".to_string(), DEFAULT_CONTENT_TYPE.to_string())];
        self.publish_with_headers(topic, body, &headers)
    }

    /// Publish `body` on `topic` with exactly `headers`.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConnected`] unless the session is open.
    fn publish_with_headers(
        &self,
        topic: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<(), ClientError>;

    /// Whether every named topic has an active subscription.
    /// Vacuously `true` for an empty set.
    fn is_subscribed<T: Topics + ?Sized>(&self, topics: &T) -> bool;
}

/// Adapter over a STOMP broker session.
#[derive(Debug)]
pub struct StompAdapter {
    config: BrokerConfig,
    callbacks: Arc<CallbackRegistry>,
    session: Option<StompSession>,
    /// Deactivated session, still winding down.
    retiring: Option<StompSession>,
    subscriptions: HashMap<String, Subscription>,
}

impl StompAdapter {
    /// Create an adapter for `config`. Nothing is opened until `connect()`.
    #[must_use]
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            config,
            callbacks: CallbackRegistry::new(),
            session: None,
            retiring: None,
            subscriptions: HashMap::new(),
        }
    }

    /// Broker settings used on the next `connect()`.
    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Topics with an active subscription, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<_> = self.subscriptions.keys().map(String::as_str).collect();
        topics.sort_unstable();
        topics
    }
}

impl Default for StompAdapter {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

#[async_trait]
impl ClientAdapter for StompAdapter {
    async fn connect(&mut self) -> Result<(), ClientError> {
        if let Some(session) = self.session.as_ref() {
            if !session.is_finished() {
                // Open, or still trying: wait on the existing session.
                return session.established().await;
            }
        }

        self.subscriptions.clear();
        self.session = None;
        self.retiring = None;

        log::info!("[Stomp] Activating session for {}", self.config.broker_url);
        let session = StompSession::activate(self.config.clone(), Arc::clone(&self.callbacks));
        let session = self.session.insert(session);
        session.established().await
    }

    fn disconnect(&mut self) {
        self.subscriptions.clear();
        match self.session.take() {
            Some(session) => {
                session.deactivate();
                self.retiring = Some(session);
            }
            None => log::debug!("[Stomp] disconnect() without a session, ignoring"),
        }
    }

    fn send(&self, _data: &str) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("send"))
    }

    fn on_message(&self, callback: MessageCallback) {
        self.callbacks.register(Callback::Message(callback));
    }

    fn on_error(&self, callback: ErrorCallback) {
        self.callbacks.register(Callback::Error(callback));
    }

    fn on_close(&self, callback: CloseCallback) {
        self.callbacks.register(Callback::Close(callback));
    }

    fn on_connect(&self, callback: ConnectCallback) {
        self.callbacks.register(Callback::Connect(callback));
    }

    fn network_status(&self) -> NetworkStatus {
        self.session
            .as_ref()
            .or(self.retiring.as_ref())
            .map_or(NetworkStatus::Closed, StompSession::status)
    }
}

impl PubSub for StompAdapter {
    fn subscribe<T: Topics + ?Sized>(
        &mut self,
        topics: &T,
        callback: MessageCallback,
    ) -> Result<(), ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotConnected)?;
        for topic in topics.topic_list() {
            if self.subscriptions.contains_key(topic) {
                log::debug!("[Stomp] Already subscribed to {}", topic);
                continue;
            }
            let subscription = session.subscribe(topic, Arc::clone(&callback));
            log::info!("[Stomp] Subscribing to {} ({})", topic, subscription.id());
            self.subscriptions.insert(topic.to_string(), subscription);
        }
        Ok(())
    }

    fn unsubscribe<T: Topics + ?Sized>(&mut self, topics: &T) {
        for topic in topics.topic_list() {
            if self.subscriptions.remove(topic).is_some() {
                log::info!("[Stomp] Unsubscribed from {}", topic);
            }
        }
    }

    fn publish_with_headers(
        &self,
        topic: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<(), ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotConnected)?;
        session.publish(topic, body, headers)
    }

    fn is_subscribed<T: Topics + ?Sized>(&self, topics: &T) -> bool {
        topics
            .topic_list()
            .into_iter()
            .all(|topic| self.subscriptions.contains_key(topic))
    }
}

impl Drop for StompAdapter {
    fn drop(&mut self) {
        self.subscriptions.clear();
        if let Some(session) = self.session.take() {
            session.deactivate();
        }
    }
}
