//! Raw duplex WebSocket adapter.
//!
//! Each `connect()` spawns one transport task that owns the socket. The task
//! publishes status through a `watch` channel and turns socket activity into
//! [`Event`]s dispatched through the adapter's [`CallbackRegistry`]. The
//! adapter keeps only a [`SocketHandle`]: the outgoing command queue, the
//! status receiver, and the task handle.
//!
//! Absent-handle policy: `send()` and `disconnect()` on an adapter that was
//! never connected (or whose socket already closed) do nothing. A
//! `disconnect()` during the handshake abandons it and reports a close.

// Rust guideline compliant 2026-02

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{
    status_channel, Callback, CallbackRegistry, ClientAdapter, CloseCallback, CloseInfo,
    ConnectCallback, ErrorCallback, Event, MessageCallback, NetworkStatus, StatusReceiver,
    StatusSender,
};
use crate::error::ClientError;
use crate::ws::{self, WsMessage, ABNORMAL_CLOSURE};

/// Endpoint used when none is configured.
pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8010";

/// Command from the adapter to its transport task.
#[derive(Debug)]
enum SocketCommand {
    /// Send a UTF-8 text frame.
    Text(String),
    /// Start the closing handshake.
    Close,
}

/// The adapter's view of a live transport task.
#[derive(Debug)]
struct SocketHandle {
    command_tx: mpsc::UnboundedSender<SocketCommand>,
    status: StatusReceiver,
    task: JoinHandle<()>,
}

impl SocketHandle {
    fn status(&self) -> NetworkStatus {
        *self.status.borrow()
    }
}

/// Adapter over a single duplex WebSocket connection.
#[derive(Debug)]
pub struct SocketAdapter {
    url: String,
    headers: Vec<(String, String)>,
    callbacks: Arc<CallbackRegistry>,
    handle: Option<SocketHandle>,
}

impl Default for SocketAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_URL)
    }
}

impl SocketAdapter {
    /// Create an adapter targeting `url`. Nothing is opened until `connect()`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            callbacks: CallbackRegistry::new(),
            handle: None,
        }
    }

    /// Add a header to the upgrade request sent on `connect()`.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The configured endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn spawn_transport(&mut self) -> oneshot::Receiver<Result<(), ClientError>> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = status_channel();
        let (opened_tx, opened_rx) = oneshot::channel();

        let task = tokio::spawn(run_socket(
            self.url.clone(),
            self.headers.clone(),
            Arc::clone(&self.callbacks),
            status_tx,
            opened_tx,
            command_rx,
        ));

        self.handle = Some(SocketHandle {
            command_tx,
            status: status_rx,
            task,
        });
        opened_rx
    }
}

#[async_trait]
impl ClientAdapter for SocketAdapter {
    async fn connect(&mut self) -> Result<(), ClientError> {
        if let Some(handle) = self.handle.take() {
            if handle.status() == NetworkStatus::Open {
                self.handle = Some(handle);
                return Ok(());
            }
            // Closing, closed, or a handshake whose connect() was abandoned.
            handle.task.abort();
        }

        log::info!("[Socket] Connecting to {}", self.url);
        let opened = self.spawn_transport();
        opened.await.map_err(|_| ClientError::Closed)?
    }

    /// Close the socket, or abandon a handshake still in progress.
    fn disconnect(&mut self) {
        let Some(handle) = self.handle.as_ref() else {
            log::debug!("[Socket] disconnect() without a connection, ignoring");
            return;
        };
        if handle.command_tx.send(SocketCommand::Close).is_err() {
            log::debug!("[Socket] Transport already finished");
        }
    }

    fn send(&self, data: &str) -> Result<(), ClientError> {
        match self.handle.as_ref() {
            Some(handle) if handle.status() == NetworkStatus::Open => {
                if handle
                    .command_tx
                    .send(SocketCommand::Text(data.to_string()))
                    .is_err()
                {
                    log::debug!("[Socket] Transport finished, dropping outgoing message");
                }
            }
            _ => log::debug!("[Socket] Not connected, dropping outgoing message"),
        }
        Ok(())
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
        self.handle
            .as_ref()
            .map_or(NetworkStatus::Closed, SocketHandle::status)
    }
}

impl Drop for SocketAdapter {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.command_tx.send(SocketCommand::Close);
        }
    }
}

/// Mark the socket closed and tell the caller why.
fn finish(callbacks: &CallbackRegistry, status_tx: &StatusSender, info: CloseInfo) {
    status_tx.send_replace(NetworkStatus::Closed);
    callbacks.dispatch(&Event::Close(info));
}

/// Transport task: own one socket from handshake to close.
async fn run_socket(
    url: String,
    headers: Vec<(String, String)>,
    callbacks: Arc<CallbackRegistry>,
    status_tx: StatusSender,
    opened_tx: oneshot::Sender<Result<(), ClientError>>,
    mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
) {
    let handshake = ws::connect(&url, &headers);
    tokio::pin!(handshake);
    let result = loop {
        tokio::select! {
            result = &mut handshake => break result,
            command = command_rx.recv() => match command {
                Some(SocketCommand::Text(_)) => {
                    log::debug!("[Socket] Not connected, dropping outgoing message");
                }
                Some(SocketCommand::Close) | None => {
                    log::info!("[Socket] Handshake with {} abandoned", url);
                    finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "connection aborted"));
                    let _ = opened_tx.send(Err(ClientError::Closed));
                    return;
                }
            },
        }
    };
    let (mut writer, mut reader) = match result {
        Ok(pair) => pair,
        Err(e) => {
            log::warn!("[Socket] Connection to {} failed: {:#}", url, e);
            let err = ClientError::ConnectionFailed(format!("{e:#}"));
            callbacks.dispatch(&Event::Error(err.clone()));
            finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "connection failed"));
            let _ = opened_tx.send(Err(err));
            return;
        }
    };

    log::info!("[Socket] Connected to {}", url);
    status_tx.send_replace(NetworkStatus::Open);
    callbacks.dispatch(&Event::Open);
    let _ = opened_tx.send(Ok(()));

    loop {
        tokio::select! {
            frame = reader.recv() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        callbacks.dispatch(&Event::Message(text));
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        callbacks.dispatch(&Event::Message(text));
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = writer.send_pong(data).await;
                    }
                    Some(Ok(WsMessage::Pong(_))) => {}
                    Some(Ok(WsMessage::Close { code, reason })) => {
                        log::info!("[Socket] Closed by peer ({})", code);
                        finish(&callbacks, &status_tx, CloseInfo::new(code, reason));
                        return;
                    }
                    Some(Err(e)) => {
                        log::warn!("[Socket] {:#}", e);
                        callbacks.dispatch(&Event::Error(ClientError::Transport(format!("{e:#}"))));
                        finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "read error"));
                        return;
                    }
                    None => {
                        finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "stream ended"));
                        return;
                    }
                }
            }
            Some(command) = command_rx.recv() => {
                match command {
                    SocketCommand::Text(text) => {
                        if let Err(e) = writer.send_text(&text).await {
                            log::warn!("[Socket] {:#}", e);
                            callbacks.dispatch(&Event::Error(ClientError::Transport(format!("{e:#}"))));
                            finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "write error"));
                            return;
                        }
                    }
                    SocketCommand::Close => {
                        if *status_tx.borrow() == NetworkStatus::Closing {
                            continue;
                        }
                        log::info!("[Socket] Closing connection to {}", url);
                        status_tx.send_replace(NetworkStatus::Closing);
                        if writer.send_close("client requested close").await.is_err() {
                            finish(&callbacks, &status_tx, CloseInfo::new(ABNORMAL_CLOSURE, "write error"));
                            return;
                        }
                        // The peer's close reply ends the loop through the read branch.
                    }
                }
            }
        }
    }
}
