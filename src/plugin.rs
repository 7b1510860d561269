//! Optional lifecycle hooks around an adapter.
//!
//! Nothing here is wired in automatically: wrap an adapter in [`Plugged`] to
//! run a plugin list around `connect`, `send`, `disconnect`, and message
//! delivery. On a pub/sub adapter the send hooks run around `publish`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::{
    ClientAdapter, CloseCallback, ConnectCallback, ErrorCallback, MessageCallback, NetworkStatus,
    PubSub, Topics,
};
use crate::error::ClientError;

/// Lifecycle hooks. Every hook defaults to doing nothing.
pub trait Plugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Before the adapter connects.
    fn on_before_connect(&self) {}

    /// After the adapter reports the connection established.
    fn on_after_connect(&self) {}

    /// Transform an outgoing payload. Plugins run in order, each receiving the
    /// previous plugin's output.
    fn on_before_send(&self, data: String) -> String {
        data
    }

    /// After the payload was handed to the adapter.
    fn on_after_send(&self) {}

    /// Before teardown is requested.
    fn on_before_disconnect(&self) {}

    /// After teardown is requested.
    fn on_after_disconnect(&self) {}

    /// Observe an incoming payload before the message callback sees it.
    fn on_message(&self, _data: &str) {}
}

/// Logs every hook through `log`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPlugin;

impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "LoggingPlugin"
    }

    fn on_before_connect(&self) {
        log::info!("[LoggingPlugin] Connecting...");
    }

    fn on_after_connect(&self) {
        log::info!("[LoggingPlugin] Connected");
    }

    fn on_before_send(&self, data: String) -> String {
        log::info!("[LoggingPlugin] Sending: {}", data);
        data
    }

    fn on_after_send(&self) {
        log::info!("[LoggingPlugin] Sent");
    }

    fn on_before_disconnect(&self) {
        log::info!("[LoggingPlugin] Disconnecting...");
    }

    fn on_after_disconnect(&self) {
        log::info!("[LoggingPlugin] Disconnected");
    }

    fn on_message(&self, data: &str) {
        log::info!("[LoggingPlugin] Received: {}", data);
    }
}

type Plugins = Arc<[Box<dyn Plugin>]>;

/// An adapter with plugins run around it. Itself a [`ClientAdapter`].
pub struct Plugged<A> {
    inner: A,
    plugins: Plugins,
}

impl<A: ClientAdapter> Plugged<A> {
    /// Wrap `inner`, running `plugins` in the given order.
    pub fn new(inner: A, plugins: Vec<Box<dyn Plugin>>) -> Self {
        let plugins: Plugins = plugins.into();
        inner.on_message(observe_messages(Arc::clone(&plugins), None));
        Self { inner, plugins }
    }

    /// Plugin names, in run order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// The wrapped adapter.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn each(&self, hook: impl Fn(&dyn Plugin)) {
        for plugin in self.plugins.iter() {
            hook(plugin.as_ref());
        }
    }

    /// Run `data` through every `on_before_send`, in order.
    fn outgoing(&self, data: &str) -> String {
        self.plugins
            .iter()
            .fold(data.to_string(), |data, plugin| plugin.on_before_send(data))
    }
}

impl<A> std::fmt::Debug for Plugged<A>
where
    A: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        f.debug_struct("Plugged")
            .field("inner", &self.inner)
            .field("plugins", &names)
            .finish()
    }
}

/// Message callback that lets every plugin observe the payload first.
fn observe_messages(plugins: Plugins, callback: Option<MessageCallback>) -> MessageCallback {
    Arc::new(move |data: &str| {
        for plugin in plugins.iter() {
            plugin.on_message(data);
        }
        if let Some(callback) = &callback {
            callback(data);
        }
    })
}

#[async_trait]
impl<A: ClientAdapter> ClientAdapter for Plugged<A> {
    async fn connect(&mut self) -> Result<(), ClientError> {
        self.each(|p| p.on_before_connect());
        self.inner.connect().await?;
        self.each(|p| p.on_after_connect());
        Ok(())
    }

    fn disconnect(&mut self) {
        self.each(|p| p.on_before_disconnect());
        self.inner.disconnect();
        self.each(|p| p.on_after_disconnect());
    }

    fn send(&self, data: &str) -> Result<(), ClientError> {
        let data = self.outgoing(data);
        self.inner.send(&data)?;
        self.each(|p| p.on_after_send());
        Ok(())
    }

    fn on_message(&self, callback: MessageCallback) {
        self.inner
            .on_message(observe_messages(Arc::clone(&self.plugins), Some(callback)));
    }

    fn on_error(&self, callback: ErrorCallback) {
        self.inner.on_error(callback);
    }

    fn on_close(&self, callback: CloseCallback) {
        self.inner.on_close(callback);
    }

    fn on_connect(&self, callback: ConnectCallback) {
        self.inner.on_connect(callback);
    }

    fn network_status(&self) -> NetworkStatus {
        self.inner.network_status()
    }
}

impl<A: ClientAdapter + PubSub> PubSub for Plugged<A> {
    fn subscribe<T: Topics + ?Sized>(
        &mut self,
        topics: &T,
        callback: MessageCallback,
    ) -> Result<(), ClientError> {
        self.inner.subscribe(topics, callback)
    }

    fn unsubscribe<T: Topics + ?Sized>(&mut self, topics: &T) {
        self.inner.unsubscribe(topics);
    }

    fn publish_with_headers(
        &self,
        topic: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<(), ClientError> {
        let body = self.outgoing(body);
        self.inner.publish_with_headers(topic, &body, headers)?;
        self.each(|p| p.on_after_send());
        Ok(())
    }

    fn is_subscribed<T: Topics + ?Sized>(&self, topics: &T) -> bool {
        self.inner.is_subscribed(topics)
    }
}
