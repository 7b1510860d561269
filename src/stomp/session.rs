//! STOMP broker session over the shared WebSocket primitive.
//!
//! # Architecture
//!
//! ```text
//!   StompSession                      Subscription (per destination)
//!        │  subscribe(dest, handler) ───────►  drop → UNSUBSCRIBE
//!        │  publish(dest, body, headers)
//!        │  deactivate()
//!        ▼
//!   Background session task
//!   (CONNECT, route MESSAGE by subscription id, heart-beat, reconnect)
//! ```
//!
//! # Protocol
//!
//! - CONNECT with `accept-version`, `host`, `heart-beat`, and the configured
//!   connect headers; the session is established on CONNECTED
//! - Active subscriptions are re-sent after every reconnect
//! - ERROR frames are reported through the error callback; the broker closes
//!   the socket afterwards and the reconnect delay applies
//! - `reconnect_delay_ms = 0` turns reconnection off
//! - Deactivating before CONNECTED abandons the attempt and drops the socket

// Rust guideline compliant 2026-02

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::frame::{self, Decoded, Frame};
use crate::adapter::{
    status_channel, CallbackRegistry, CloseInfo, Event, MessageCallback, NetworkStatus,
    StatusReceiver, StatusSender,
};
use crate::config::BrokerConfig;
use crate::error::ClientError;
use crate::ws::{self, WsMessage, WsReader, WsWriter, ABNORMAL_CLOSURE, NORMAL_CLOSURE};

/// Versions offered in CONNECT.
const ACCEPT_VERSION: &str = "1.2,1.1,1.0";

/// Command from the session handle to the session task.
#[derive(Debug)]
enum SessionCommand {
    Subscribe {
        id: String,
        destination: String,
        handler: Handler,
    },
    Unsubscribe {
        id: String,
    },
    Publish {
        destination: String,
        body: String,
        headers: Vec<(String, String)>,
    },
    Deactivate,
}

/// Message handler for one subscription.
#[derive(Clone)]
struct Handler(MessageCallback);

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

/// An active subscription to one destination.
///
/// Dropping it sends UNSUBSCRIBE and stops delivery to its handler.
#[derive(Debug)]
pub struct Subscription {
    id: String,
    destination: String,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
}

impl Subscription {
    /// Subscription id sent to the broker.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subscribed destination.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.command_tx.send(SessionCommand::Unsubscribe {
            id: std::mem::take(&mut self.id),
        });
    }
}

/// Handle to an active broker session.
///
/// Owns a background task that manages the connection lifecycle. Dropping the
/// handle deactivates the session.
#[derive(Debug)]
pub struct StompSession {
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    status: StatusReceiver,
    task: JoinHandle<()>,
}

impl StompSession {
    /// Start a session. Events are dispatched through `callbacks`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn activate(config: BrokerConfig, callbacks: Arc<CallbackRegistry>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status) = status_channel();

        let task = tokio::spawn(run_session(config, callbacks, status_tx, command_rx));

        Self {
            command_tx,
            status,
            task,
        }
    }

    /// Live session status.
    #[must_use]
    pub fn status(&self) -> NetworkStatus {
        *self.status.borrow()
    }

    /// Wait until the broker has accepted the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectionFailed`] when the session task ends
    /// without ever establishing (reconnection disabled, or deactivated).
    pub async fn established(&self) -> Result<(), ClientError> {
        let mut status = self.status.clone();
        status
            .wait_for(|s| *s == NetworkStatus::Open)
            .await
            .map(|_| ())
            .map_err(|_| ClientError::ConnectionFailed("session ended before CONNECTED".into()))
    }

    /// Subscribe `handler` to `destination`.
    ///
    /// The request is queued; the broker sees it as soon as the session is
    /// connected, and again after every reconnect.
    pub fn subscribe(&self, destination: &str, handler: MessageCallback) -> Subscription {
        let id = format!("sub-{}", uuid::Uuid::new_v4());
        let _ = self.command_tx.send(SessionCommand::Subscribe {
            id: id.clone(),
            destination: destination.to_string(),
            handler: Handler(handler),
        });
        Subscription {
            id,
            destination: destination.to_string(),
            command_tx: self.command_tx.clone(),
        }
    }

    /// Send `body` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotConnected`] unless the session is open, or
    /// [`ClientError::Closed`] when the session task has ended.
    pub fn publish(
        &self,
        destination: &str,
        body: &str,
        headers: &[(String, String)],
    ) -> Result<(), ClientError> {
        if self.status() != NetworkStatus::Open {
            return Err(ClientError::NotConnected);
        }
        self.command_tx
            .send(SessionCommand::Publish {
                destination: destination.to_string(),
                body: body.to_string(),
                headers: headers.to_vec(),
            })
            .map_err(|_| ClientError::Closed)
    }

    /// Disconnect from the broker and stop reconnecting.
    pub fn deactivate(&self) {
        let _ = self.command_tx.send(SessionCommand::Deactivate);
    }

    /// Whether the session task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StompSession {
    fn drop(&mut self) {
        self.deactivate();
    }
}

/// Negotiated heart-beat periods; zero means disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeartBeat {
    outgoing: Duration,
    incoming: Duration,
}

impl HeartBeat {
    /// Combine our `heart-beat` setting with the broker's CONNECTED header.
    fn negotiate(config: &BrokerConfig, server: Option<&str>) -> Self {
        let (server_out, server_in) = server
            .and_then(|value| value.split_once(','))
            .map(|(sx, sy)| {
                (
                    sx.trim().parse::<u64>().unwrap_or(0),
                    sy.trim().parse::<u64>().unwrap_or(0),
                )
            })
            .unwrap_or((0, 0));

        let pick = |ours: u64, theirs: u64| {
            if ours == 0 || theirs == 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(ours.max(theirs))
            }
        };

        Self {
            outgoing: pick(config.heartbeat_outgoing_ms, server_in),
            incoming: pick(config.heartbeat_incoming_ms, server_out),
        }
    }
}

/// Active subscriptions: id -> (destination, handler).
/// Kept across reconnections for automatic re-subscribe.
type Subscriptions = HashMap<String, (String, Handler)>;

/// Why a connection's message loop ended.
enum LoopExit {
    Deactivated,
    Lost(CloseInfo),
}

/// Session task: connect, serve, and reconnect until deactivated.
async fn run_session(
    config: BrokerConfig,
    callbacks: Arc<CallbackRegistry>,
    status_tx: StatusSender,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
) {
    let mut subscriptions = Subscriptions::new();
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);

    loop {
        status_tx.send_replace(NetworkStatus::Connecting);
        log::info!("[Stomp] Connecting to {}", config.broker_url);

        let connecting = open_connection(&config);
        tokio::pin!(connecting);
        let opened = loop {
            tokio::select! {
                result = &mut connecting => break Some(result),
                command = command_rx.recv() => {
                    if !apply_idle_command(&mut subscriptions, command) {
                        break None;
                    }
                }
            }
        };

        let exit = match opened {
            None => {
                log::info!("[Stomp] Connection attempt to {} abandoned", config.broker_url);
                LoopExit::Deactivated
            }
            Some(Ok((mut writer, mut reader, heart_beat))) => {
                status_tx.send_replace(NetworkStatus::Open);
                log::info!("[Stomp] Session established with {}", config.broker_url);
                callbacks.dispatch(&Event::Open);

                let exit = serve_connection(
                    &callbacks,
                    &status_tx,
                    &mut subscriptions,
                    &mut writer,
                    &mut reader,
                    &mut command_rx,
                    heart_beat,
                )
                .await;
                let _ = writer.close().await;
                exit
            }
            Some(Err(err)) => {
                log::warn!("[Stomp] Connection failed: {}", err);
                callbacks.dispatch(&Event::Error(err));
                LoopExit::Lost(CloseInfo::new(ABNORMAL_CLOSURE, "connection failed"))
            }
        };

        status_tx.send_replace(NetworkStatus::Closed);
        match exit {
            LoopExit::Deactivated => {
                callbacks.dispatch(&Event::Close(CloseInfo::new(NORMAL_CLOSURE, "deactivated")));
                log::info!("[Stomp] Session deactivated");
                return;
            }
            LoopExit::Lost(info) => {
                callbacks.dispatch(&Event::Close(info));
            }
        }

        if reconnect_delay.is_zero() {
            log::info!("[Stomp] Reconnect disabled, session ended");
            return;
        }

        log::info!(
            "[Stomp] Reconnecting in {:.1}s",
            reconnect_delay.as_secs_f32()
        );
        if !wait_reconnect(reconnect_delay, &mut subscriptions, &mut command_rx).await {
            log::info!("[Stomp] Session deactivated while waiting to reconnect");
            return;
        }
    }
}

/// Sleep out the reconnect delay while still accepting commands.
///
/// Returns `false` if the session was deactivated meanwhile.
async fn wait_reconnect(
    delay: Duration,
    subscriptions: &mut Subscriptions,
    command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
) -> bool {
    let deadline = tokio::time::sleep(delay);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => return true,
            command = command_rx.recv() => {
                if !apply_idle_command(subscriptions, command) {
                    return false;
                }
            }
        }
    }
}

/// Handle a command while no broker connection is open.
///
/// Subscriptions are recorded for the next connection; publishes are dropped.
/// Returns `false` on deactivation.
fn apply_idle_command(subscriptions: &mut Subscriptions, command: Option<SessionCommand>) -> bool {
    match command {
        Some(SessionCommand::Subscribe { id, destination, handler }) => {
            subscriptions.insert(id, (destination, handler));
            true
        }
        Some(SessionCommand::Unsubscribe { id }) => {
            subscriptions.remove(&id);
            true
        }
        Some(SessionCommand::Publish { destination, .. }) => {
            log::warn!("[Stomp] Dropping publish to {} while disconnected", destination);
            true
        }
        Some(SessionCommand::Deactivate) | None => false,
    }
}

/// Open the socket, send CONNECT, and wait for CONNECTED.
async fn open_connection(
    config: &BrokerConfig,
) -> Result<(WsWriter, WsReader, HeartBeat), ClientError> {
    let url = ws::http_to_ws_scheme(&config.broker_url);
    let (mut writer, mut reader) = ws::connect(&url, &[])
        .await
        .map_err(|e| ClientError::ConnectionFailed(format!("{e:#}")))?;

    let mut connect = Frame::new("CONNECT")
        .header("accept-version", ACCEPT_VERSION)
        .header("host", host_of(&url))
        .header(
            "heart-beat",
            format!(
                "{},{}",
                config.heartbeat_outgoing_ms, config.heartbeat_incoming_ms
            ),
        );
    for (name, value) in config.connect_headers() {
        connect = connect.header(name, value);
    }

    writer
        .send_text(&connect.encode())
        .await
        .map_err(|e| ClientError::ConnectionFailed(format!("{e:#}")))?;

    while let Some(message) = reader.recv().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                for item in frame::decode(&text)? {
                    let Decoded::Frame(frame) = item else {
                        continue;
                    };
                    match frame.command.as_str() {
                        "CONNECTED" => {
                            let heart_beat = HeartBeat::negotiate(config, frame.get("heart-beat"));
                            log::debug!(
                                "[Stomp] CONNECTED version={:?} heart-beat={:?}",
                                frame.get("version"),
                                heart_beat
                            );
                            return Ok((writer, reader, heart_beat));
                        }
                        "ERROR" => return Err(broker_error(&frame)),
                        other => log::debug!("[Stomp] Ignoring {} before CONNECTED", other),
                    }
                }
            }
            Ok(WsMessage::Ping(data)) => {
                let _ = writer.send_pong(data).await;
            }
            Ok(WsMessage::Close { code, reason }) => {
                return Err(ClientError::ConnectionFailed(format!(
                    "socket closed before CONNECTED ({code} {reason})"
                )));
            }
            Ok(_) => {}
            Err(e) => return Err(ClientError::ConnectionFailed(format!("{e:#}"))),
        }
    }

    Err(ClientError::ConnectionFailed(
        "socket ended before CONNECTED".into(),
    ))
}

/// Host part of a WebSocket URL, for the CONNECT `host` header.
fn host_of(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or(without_scheme);
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    host.split(':').next().unwrap_or(host).to_string()
}

fn broker_error(frame: &Frame) -> ClientError {
    let summary = frame.get("message").unwrap_or("ERROR frame");
    if frame.body.is_empty() {
        ClientError::Broker(summary.to_string())
    } else {
        ClientError::Broker(format!("{summary}: {}", frame.body))
    }
}

async fn send_frame(writer: &mut WsWriter, frame: &Frame) -> Result<(), ClientError> {
    writer
        .send_text(&frame.encode())
        .await
        .map_err(|e| ClientError::Transport(format!("{e:#}")))
}

fn subscribe_frame(id: &str, destination: &str) -> Frame {
    Frame::new("SUBSCRIBE")
        .header("id", id)
        .header("destination", destination)
        .header("ack", "auto")
}

/// Serve one established connection until it is lost or deactivated.
async fn serve_connection(
    callbacks: &CallbackRegistry,
    status_tx: &StatusSender,
    subscriptions: &mut Subscriptions,
    writer: &mut WsWriter,
    reader: &mut WsReader,
    command_rx: &mut mpsc::UnboundedReceiver<SessionCommand>,
    heart_beat: HeartBeat,
) -> LoopExit {
    for (id, (destination, _)) in subscriptions.iter() {
        if let Err(e) = send_frame(writer, &subscribe_frame(id, destination)).await {
            return lost(callbacks, e);
        }
        log::debug!("[Stomp] Subscribed {} -> {}", id, destination);
    }

    // tokio intervals cannot have a zero period; disabled ticks are guarded below.
    let tick_period = |d: Duration| if d.is_zero() { Duration::from_secs(3600) } else { d };
    let mut outgoing_tick = tokio::time::interval(tick_period(heart_beat.outgoing));
    outgoing_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut incoming_tick = tokio::time::interval(tick_period(heart_beat.incoming));
    incoming_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            message = reader.recv() => {
                last_activity = Instant::now();
                match message {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_text(callbacks, subscriptions, &text);
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = writer.send_pong(data).await;
                    }
                    Some(Ok(WsMessage::Close { code, reason })) => {
                        log::info!("[Stomp] Socket closed by broker ({})", code);
                        return LoopExit::Lost(CloseInfo::new(code, reason));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return lost(callbacks, ClientError::Transport(format!("{e:#}")));
                    }
                    None => {
                        return LoopExit::Lost(CloseInfo::new(ABNORMAL_CLOSURE, "stream ended"));
                    }
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(SessionCommand::Subscribe { id, destination, handler }) => {
                        let frame = subscribe_frame(&id, &destination);
                        subscriptions.insert(id.clone(), (destination.clone(), handler));
                        if let Err(e) = send_frame(writer, &frame).await {
                            return lost(callbacks, e);
                        }
                        log::debug!("[Stomp] Subscribed {} -> {}", id, destination);
                    }
                    Some(SessionCommand::Unsubscribe { id }) => {
                        if subscriptions.remove(&id).is_some() {
                            let frame = Frame::new("UNSUBSCRIBE").header("id", id.as_str());
                            if let Err(e) = send_frame(writer, &frame).await {
                                return lost(callbacks, e);
                            }
                            log::debug!("[Stomp] Unsubscribed {}", id);
                        }
                    }
                    Some(SessionCommand::Publish { destination, body, headers }) => {
                        let mut frame = Frame::new("SEND").header("destination", destination.as_str());
                        for (name, value) in headers {
                            frame = frame.header(name, value);
                        }
                        let frame = frame
                            .header("content-length", body.len().to_string())
                            .body(body);
                        if let Err(e) = send_frame(writer, &frame).await {
                            return lost(callbacks, e);
                        }
                        log::trace!("[Stomp] Published to {}", destination);
                    }
                    Some(SessionCommand::Deactivate) | None => {
                        status_tx.send_replace(NetworkStatus::Closing);
                        let _ = send_frame(writer, &Frame::new("DISCONNECT")).await;
                        let _ = writer.send_close("deactivated").await;
                        return LoopExit::Deactivated;
                    }
                }
            }

            _ = outgoing_tick.tick(), if !heart_beat.outgoing.is_zero() => {
                if let Err(e) = writer.send_text("\n").await {
                    return lost(callbacks, ClientError::Transport(format!("{e:#}")));
                }
            }

            _ = incoming_tick.tick(), if !heart_beat.incoming.is_zero() => {
                if last_activity.elapsed() > heart_beat.incoming * 2 {
                    log::warn!(
                        "[Stomp] No broker traffic for {}s, dropping connection",
                        last_activity.elapsed().as_secs()
                    );
                    return LoopExit::Lost(CloseInfo::new(ABNORMAL_CLOSURE, "heart-beat timeout"));
                }
            }
        }
    }
}

/// Report a transport failure and end the connection.
fn lost(callbacks: &CallbackRegistry, err: ClientError) -> LoopExit {
    log::warn!("[Stomp] {}", err);
    callbacks.dispatch(&Event::Error(err));
    LoopExit::Lost(CloseInfo::new(ABNORMAL_CLOSURE, "transport error"))
}

/// Route one text message to subscription handlers and callbacks.
fn handle_text(callbacks: &CallbackRegistry, subscriptions: &Subscriptions, text: &str) {
    let items = match frame::decode(text) {
        Ok(items) => items,
        Err(e) => {
            callbacks.dispatch(&Event::Error(e));
            return;
        }
    };

    for item in items {
        let Decoded::Frame(frame) = item else {
            continue;
        };
        match frame.command.as_str() {
            "MESSAGE" => {
                let Some(id) = frame.get("subscription") else {
                    log::debug!("[Stomp] MESSAGE without subscription header");
                    continue;
                };
                match subscriptions.get(id) {
                    Some((_, Handler(handler))) => {
                        handler(&frame.body);
                        callbacks.dispatch(&Event::Message(frame.body));
                    }
                    None => log::trace!("[Stomp] MESSAGE for unknown subscription {}", id),
                }
            }
            "ERROR" => {
                let err = broker_error(&frame);
                log::error!("[Stomp] {}", err);
                callbacks.dispatch(&Event::Error(err));
            }
            "RECEIPT" => log::trace!("[Stomp] RECEIPT {:?}", frame.get("receipt-id")),
            other => log::trace!("[Stomp] Unhandled frame {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(out_ms: u64, in_ms: u64) -> BrokerConfig {
        BrokerConfig {
            heartbeat_outgoing_ms: out_ms,
            heartbeat_incoming_ms: in_ms,
            ..BrokerConfig::default()
        }
    }

    #[test]
    fn test_heartbeat_disabled_by_either_side() {
        let hb = HeartBeat::negotiate(&config(0, 0), Some("10000,10000"));
        assert_eq!(hb.outgoing, Duration::ZERO);
        assert_eq!(hb.incoming, Duration::ZERO);

        let hb = HeartBeat::negotiate(&config(5000, 5000), Some("0,0"));
        assert_eq!(hb.outgoing, Duration::ZERO);
        assert_eq!(hb.incoming, Duration::ZERO);
    }

    #[test]
    fn test_heartbeat_takes_larger_period() {
        let hb = HeartBeat::negotiate(&config(4000, 8000), Some("10000,2000"));
        assert_eq!(hb.outgoing, Duration::from_millis(4000));
        assert_eq!(hb.incoming, Duration::from_millis(10000));
    }

    #[test]
    fn test_heartbeat_missing_header() {
        let hb = HeartBeat::negotiate(&config(4000, 4000), None);
        assert_eq!(hb.outgoing, Duration::ZERO);
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("wss://broker.example/websocket/connect"), "broker.example");
        assert_eq!(host_of("ws://localhost:61614"), "localhost");
        assert_eq!(host_of("ws://user@broker.example:80/stomp"), "broker.example");
    }

    #[test]
    fn test_broker_error_includes_body() {
        let frame = Frame::new("ERROR").header("message", "denied").body("bad token");
        assert_eq!(broker_error(&frame), ClientError::Broker("denied: bad token".into()));
    }

    #[test]
    fn test_message_routed_to_subscription_handler() {
        let callbacks = CallbackRegistry::new();
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let mut subscriptions = Subscriptions::new();
        subscriptions.insert(
            "sub-1".into(),
            (
                "/topic/a".into(),
                Handler(Arc::new(move |body: &str| sink.lock().unwrap().push(body.to_string()))),
            ),
        );

        let text = Frame::new("MESSAGE")
            .header("subscription", "sub-1")
            .header("destination", "/topic/a")
            .body("hello")
            .encode();
        handle_text(&callbacks, &subscriptions, &text);

        let other = Frame::new("MESSAGE")
            .header("subscription", "sub-2")
            .body("ignored")
            .encode();
        handle_text(&callbacks, &subscriptions, &other);

        assert_eq!(*received.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_session_without_reconnect_ends_on_failure() {
        let config = BrokerConfig {
            broker_url: "ws://127.0.0.1:1/stomp".into(),
            reconnect_delay_ms: 0,
            ..BrokerConfig::default()
        };
        let session = StompSession::activate(config, CallbackRegistry::new());
        let result = session.established().await;
        assert!(matches!(result, Err(ClientError::ConnectionFailed(_))));
        assert_eq!(session.status(), NetworkStatus::Closed);
    }

    #[tokio::test]
    async fn test_deactivate_while_connecting_ends_session() {
        // Accepts TCP and never completes the upgrade.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let config = BrokerConfig::new(format!("ws://{addr}/stomp"));
        let session = StompSession::activate(config, CallbackRegistry::new());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(session.status(), NetworkStatus::Connecting);

        session.deactivate();
        let result = tokio::time::timeout(Duration::from_secs(5), session.established())
            .await
            .expect("session kept connecting after deactivate");
        assert!(matches!(result, Err(ClientError::ConnectionFailed(_))));
        assert_eq!(session.status(), NetworkStatus::Closed);
    }
}
