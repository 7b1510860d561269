//! Shared helpers for integration tests.
//!
//! `TestBroker` is a minimal in-process STOMP broker on an ephemeral port:
//! CONNECT/CONNECTED, SUBSCRIBE, UNSUBSCRIBE, SEND routed as MESSAGE to every
//! matching subscription, and DISCONNECT. Every frame it receives is logged so
//! tests can assert on what the client put on the wire.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use socket_client::stomp::{Decoded, Frame};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Receive the next item or fail the test after [`WAIT`].
pub async fn recv_within<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Assert nothing arrives for a short while.
pub async fn assert_quiet<T: std::fmt::Debug>(rx: &mut mpsc::UnboundedReceiver<T>) {
    assert_quiet_for(rx, Duration::from_millis(200)).await;
}

/// Assert nothing arrives within `window`.
pub async fn assert_quiet_for<T: std::fmt::Debug>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    window: Duration,
) {
    if let Ok(Some(item)) = tokio::time::timeout(window, rx.recv()).await {
        panic!("unexpected event: {item:?}");
    }
}

/// TCP endpoint that accepts connections and never answers.
///
/// Each accepted stream is drained until the client hangs up; `hangups`
/// yields once per connection the client closed.
pub struct SilentEndpoint {
    addr: SocketAddr,
    pub hangups: mpsc::UnboundedReceiver<()>,
}

impl SilentEndpoint {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, hangups) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    while matches!(stream.read(&mut buf).await, Ok(n) if n > 0) {}
                    let _ = tx.send(());
                });
            }
        });
        Self { addr, hangups }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/websocket/connect", self.addr)
    }
}

struct Route {
    client: u64,
    id: String,
    destination: String,
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct BrokerState {
    received: Vec<Frame>,
    routes: Vec<Route>,
    next_client: u64,
    next_message: u64,
    connections: u64,
}

/// In-process STOMP broker.
pub struct TestBroker {
    addr: SocketAddr,
    state: Arc<Mutex<BrokerState>>,
    kick_tx: broadcast::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl TestBroker {
    /// Bind to an ephemeral port and start accepting.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(BrokerState::default()));
        let (kick_tx, _) = broadcast::channel(4);

        let accept_state = Arc::clone(&state);
        let accept_kick = kick_tx.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let state = Arc::clone(&accept_state);
                let kick_rx = accept_kick.subscribe();
                tokio::spawn(serve_client(stream, state, kick_rx));
            }
        });

        Self {
            addr,
            state,
            kick_tx,
            task,
        }
    }

    /// WebSocket URL of the broker endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}/websocket/connect", self.addr)
    }

    /// Every frame received so far, in arrival order.
    pub fn received(&self) -> Vec<Frame> {
        self.state.lock().unwrap().received.clone()
    }

    /// Frames received with `command`.
    pub fn received_commands(&self, command: &str) -> Vec<Frame> {
        self.received()
            .into_iter()
            .filter(|f| f.command == command)
            .collect()
    }

    /// Number of CONNECT frames answered.
    pub fn connections(&self) -> u64 {
        self.state.lock().unwrap().connections
    }

    /// Wait until at least `count` frames with `command` have arrived.
    pub async fn wait_for(&self, command: &str, count: usize) -> Vec<Frame> {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            let frames = self.received_commands(command);
            if frames.len() >= count {
                return frames;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {count} {command} frame(s), got {}",
                frames.len()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Drop every client connection without a close handshake.
    pub fn kick_all(&self) {
        let _ = self.kick_tx.send(());
    }
}

impl Drop for TestBroker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve_client(
    stream: TcpStream,
    state: Arc<Mutex<BrokerState>>,
    mut kick_rx: broadcast::Receiver<()>,
) {
    let Ok(ws) = accept_async(stream).await else {
        return;
    };
    let (mut sink, mut source) = ws.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let client = {
        let mut state = state.lock().unwrap();
        state.next_client += 1;
        state.next_client
    };

    'conn: loop {
        tokio::select! {
            incoming = source.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => continue,
                };
                let Ok(items) = socket_client::stomp::frame::decode(&text) else {
                    break;
                };
                for item in items {
                    let Decoded::Frame(frame) = item else {
                        continue;
                    };
                    if !handle_frame(&state, client, &out_tx, frame) {
                        break 'conn;
                    }
                }
            }
            _ = kick_rx.recv() => {
                writer.abort();
                break;
            }
        }
    }

    state.lock().unwrap().routes.retain(|r| r.client != client);
    drop(out_tx);
    let _ = writer.await;
}

/// Returns `false` when the connection should end.
fn handle_frame(
    state: &Mutex<BrokerState>,
    client: u64,
    out: &mpsc::UnboundedSender<String>,
    frame: Frame,
) -> bool {
    let mut state = state.lock().unwrap();
    state.received.push(frame.clone());

    match frame.command.as_str() {
        "CONNECT" | "STOMP" => {
            if frame.get("authorization") == Some("reject") {
                let error = Frame::new("ERROR")
                    .header("message", "Access denied")
                    .body("invalid credentials");
                let _ = out.send(error.encode());
                return false;
            }
            state.connections += 1;
            let connected = Frame::new("CONNECTED")
                .header("version", "1.2")
                .header("heart-beat", "0,0");
            let _ = out.send(connected.encode());
        }
        "SUBSCRIBE" => {
            let id = frame.get("id").unwrap_or_default().to_string();
            let destination = frame.get("destination").unwrap_or_default().to_string();
            state.routes.push(Route {
                client,
                id,
                destination,
                tx: out.clone(),
            });
        }
        "UNSUBSCRIBE" => {
            let id = frame.get("id").unwrap_or_default().to_string();
            state.routes.retain(|r| !(r.client == client && r.id == id));
        }
        "SEND" => {
            let destination = frame.get("destination").unwrap_or_default().to_string();
            state.next_message += 1;
            let message_id = state.next_message.to_string();
            for route in state.routes.iter().filter(|r| r.destination == destination) {
                let message = Frame::new("MESSAGE")
                    .header("subscription", route.id.as_str())
                    .header("message-id", message_id.as_str())
                    .header("destination", destination.as_str())
                    .body(frame.body.as_str());
                let _ = route.tx.send(message.encode());
            }
        }
        "DISCONNECT" => return false,
        _ => {}
    }
    true
}
