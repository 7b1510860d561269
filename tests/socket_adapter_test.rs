//! Raw socket adapter against the in-process echo server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{assert_quiet, assert_quiet_for, recv_within, SilentEndpoint};
use socket_client::adapter::Event;
use socket_client::echo::{EchoServer, ECHO_PREFIX, GREETING};
use socket_client::{ClientAdapter, ClientError, CloseInfo, NetworkStatus, SocketAdapter, SocketClient};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

async fn start_echo() -> String {
    let server = EchoServer::bind("127.0.0.1:0").await.unwrap();
    let url = server.url().unwrap();
    server.spawn();
    url
}

/// Route every callback of `adapter` into one event channel.
fn record(adapter: &impl ClientAdapter) -> mpsc::UnboundedReceiver<Event> {
    let (tx, rx) = mpsc::unbounded_channel();

    let events = tx.clone();
    adapter.on_connect(Arc::new(move || {
        let _ = events.send(Event::Open);
    }));
    let events = tx.clone();
    adapter.on_message(Arc::new(move |msg: &str| {
        let _ = events.send(Event::Message(msg.to_string()));
    }));
    let events = tx.clone();
    adapter.on_error(Arc::new(move |err: &ClientError| {
        let _ = events.send(Event::Error(err.clone()));
    }));
    adapter.on_close(Arc::new(move |info: &CloseInfo| {
        let _ = tx.send(Event::Close(info.clone()));
    }));
    rx
}

#[tokio::test]
async fn test_echo_round_trip() {
    let url = start_echo().await;
    let mut adapter = SocketAdapter::new(url);
    let mut events = record(&adapter);

    adapter.connect().await.unwrap();
    assert_eq!(adapter.network_status(), NetworkStatus::Open);
    assert_eq!(recv_within(&mut events).await, Event::Open);
    assert_eq!(
        recv_within(&mut events).await,
        Event::Message(GREETING.to_string())
    );

    adapter.send("ping").unwrap();
    assert_eq!(
        recv_within(&mut events).await,
        Event::Message(format!("{ECHO_PREFIX}ping"))
    );

    adapter.disconnect();
    match recv_within(&mut events).await {
        Event::Close(info) => assert_eq!(info.code, 1000),
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(adapter.network_status(), NetworkStatus::Closed);
}

#[tokio::test]
async fn test_connect_while_open_is_noop() {
    let url = start_echo().await;
    let mut adapter = SocketAdapter::new(url);
    let mut events = record(&adapter);

    adapter.connect().await.unwrap();
    adapter.connect().await.unwrap();

    assert_eq!(recv_within(&mut events).await, Event::Open);
    assert_eq!(
        recv_within(&mut events).await,
        Event::Message(GREETING.to_string())
    );
    // A second handshake would greet again.
    assert_quiet(&mut events).await;
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let url = start_echo().await;
    let mut adapter = SocketAdapter::new(url);
    let mut events = record(&adapter);

    adapter.connect().await.unwrap();
    adapter.disconnect();
    loop {
        if let Event::Close(_) = recv_within(&mut events).await {
            break;
        }
    }
    assert_eq!(adapter.network_status(), NetworkStatus::Closed);

    adapter.connect().await.unwrap();
    assert_eq!(adapter.network_status(), NetworkStatus::Open);
    adapter.send("again").unwrap();
    loop {
        if recv_within(&mut events).await == Event::Message(format!("{ECHO_PREFIX}again")) {
            break;
        }
    }
}

#[tokio::test]
async fn test_callback_registration_replaces() {
    let url = start_echo().await;
    let mut adapter = SocketAdapter::new(url);

    let (first_tx, mut first_rx) = mpsc::unbounded_channel::<String>();
    let (second_tx, mut second_rx) = mpsc::unbounded_channel::<String>();
    adapter.on_message(Arc::new(move |msg: &str| {
        let _ = first_tx.send(msg.to_string());
    }));
    adapter.on_message(Arc::new(move |msg: &str| {
        let _ = second_tx.send(msg.to_string());
    }));

    adapter.connect().await.unwrap();
    assert_eq!(recv_within(&mut second_rx).await, GREETING);
    assert_quiet(&mut first_rx).await;
}

#[tokio::test]
async fn test_echo_broadcasts_to_every_client() {
    let url = start_echo().await;
    let mut sender = SocketAdapter::new(url.clone());
    let mut listener = SocketAdapter::new(url);
    let mut sender_events = record(&sender);
    let mut listener_events = record(&listener);

    sender.connect().await.unwrap();
    listener.connect().await.unwrap();
    for events in [&mut sender_events, &mut listener_events] {
        assert_eq!(recv_within(events).await, Event::Open);
        assert_eq!(recv_within(events).await, Event::Message(GREETING.to_string()));
    }

    sender.send("hello").unwrap();
    let expected = Event::Message(format!("{ECHO_PREFIX}hello"));
    assert_eq!(recv_within(&mut sender_events).await, expected);
    assert_eq!(recv_within(&mut listener_events).await, expected);
}

#[tokio::test]
async fn test_connect_failure_returns_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let mut adapter = SocketAdapter::new(format!("ws://{addr}"));
    let mut events = record(&adapter);

    let result = adapter.connect().await;
    assert!(matches!(result, Err(ClientError::ConnectionFailed(_))));
    assert!(matches!(
        recv_within(&mut events).await,
        Event::Error(ClientError::ConnectionFailed(_))
    ));
    assert!(matches!(recv_within(&mut events).await, Event::Close(_)));
    assert_eq!(adapter.network_status(), NetworkStatus::Closed);
}

#[tokio::test]
async fn test_stalled_handshake_keeps_connect_pending() {
    let endpoint = SilentEndpoint::start().await;
    let mut adapter = SocketAdapter::new(endpoint.url());

    let pending = tokio::time::timeout(Duration::from_millis(300), adapter.connect()).await;
    assert!(pending.is_err(), "connect resolved against a silent endpoint");
    assert_eq!(adapter.network_status(), NetworkStatus::Connecting);
}

#[tokio::test]
async fn test_disconnect_abandons_pending_handshake() {
    let mut endpoint = SilentEndpoint::start().await;
    let mut adapter = SocketAdapter::new(endpoint.url());
    let mut events = record(&adapter);

    let pending = tokio::time::timeout(Duration::from_millis(300), adapter.connect()).await;
    assert!(pending.is_err());

    adapter.disconnect();
    match recv_within(&mut events).await {
        Event::Close(info) => assert_eq!(info.code, 1006),
        other => panic!("expected close, got {other:?}"),
    }
    assert_eq!(adapter.network_status(), NetworkStatus::Closed);
    recv_within(&mut endpoint.hangups).await;
}

#[tokio::test]
async fn test_late_upgrade_after_disconnect_never_opens() {
    // Completes the upgrade only after the client has given up.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(400)).await;
                let _ = tokio_tungstenite::accept_async(stream).await;
            });
        }
    });

    let mut adapter = SocketAdapter::new(format!("ws://{addr}"));
    let mut events = record(&adapter);
    let pending = tokio::time::timeout(Duration::from_millis(200), adapter.connect()).await;
    assert!(pending.is_err());

    adapter.disconnect();
    assert!(matches!(recv_within(&mut events).await, Event::Close(_)));
    assert_quiet_for(&mut events, Duration::from_millis(600)).await;
    assert_eq!(adapter.network_status(), NetworkStatus::Closed);
}

#[tokio::test]
async fn test_send_before_connect_never_reaches_server() {
    let url = start_echo().await;
    let mut adapter = SocketAdapter::new(url);
    let mut events = record(&adapter);

    adapter.send("early").unwrap();
    adapter.connect().await.unwrap();

    assert_eq!(recv_within(&mut events).await, Event::Open);
    assert_eq!(
        recv_within(&mut events).await,
        Event::Message(GREETING.to_string())
    );
    assert_quiet(&mut events).await;
}

#[tokio::test]
async fn test_facade_forwards_to_socket_adapter() {
    let url = start_echo().await;
    let mut client = SocketClient::socket(url);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    client.on_message(move |msg| {
        let _ = tx.send(msg.to_string());
    });

    client.connect().await.unwrap();
    assert_eq!(client.status(), NetworkStatus::Open);
    assert_eq!(recv_within(&mut rx).await, GREETING);

    client.send("via facade").unwrap();
    assert_eq!(recv_within(&mut rx).await, format!("{ECHO_PREFIX}via facade"));

    client.disconnect();
    let deadline = tokio::time::Instant::now() + common::WAIT;
    while client.status() != NetworkStatus::Closed {
        assert!(tokio::time::Instant::now() < deadline, "socket never closed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
