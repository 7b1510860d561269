//! Echo collaborator for the raw socket adapter.
//!
//! Greets every client on connect, then re-broadcasts each text frame it
//! receives to all open clients with [`ECHO_PREFIX`] prepended. Used by the
//! `serve` subcommand and by the integration tests.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Sent to each client right after the handshake.
pub const GREETING: &str = "서버에 연결되었습니다!";

/// Prepended to every echoed message.
pub const ECHO_PREFIX: &str = "서버 응답: ";

/// Broadcast backlog per client before it starts missing echoes.
const BROADCAST_CAPACITY: usize = 256;

/// A bound echo server. Call [`EchoServer::run`] to start accepting.
#[derive(Debug)]
pub struct EchoServer {
    listener: TcpListener,
    broadcast_tx: broadcast::Sender<String>,
}

impl EchoServer {
    /// Bind to `addr`. Use port 0 for an ephemeral port.
    pub async fn bind(addr: impl tokio::net::ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind echo server")?;
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self {
            listener,
            broadcast_tx,
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// `ws://` URL clients should connect to.
    pub fn url(&self) -> Result<String> {
        Ok(format!("ws://{}", self.local_addr()?))
    }

    /// Accept clients until the task is dropped or aborted.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            log::info!("[Echo] Listening on ws://{}", addr);
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let broadcast_tx = self.broadcast_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, peer, broadcast_tx).await {
                            log::warn!("[Echo] Client {} error: {:#}", peer, e);
                        }
                    });
                }
                Err(e) => log::error!("[Echo] Accept error: {}", e),
            }
        }
    }

    /// Spawn [`EchoServer::run`] on the current runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    broadcast_tx: broadcast::Sender<String>,
) -> Result<()> {
    let ws_stream = accept_async(stream).await.context("Handshake failed")?;
    let (mut write, mut read) = ws_stream.split();
    // Subscribe before greeting so no echo sent after this point is missed.
    let mut broadcast_rx = broadcast_tx.subscribe();

    log::info!("[Echo] Client {} connected", peer);
    write.send(Message::Text(GREETING.to_string())).await?;

    loop {
        tokio::select! {
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        log::debug!("[Echo] {} says: {}", peer, text);
                        let _ = broadcast_tx.send(format!("{ECHO_PREFIX}{text}"));
                    }
                    Some(Ok(Message::Binary(data))) => {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        let _ = broadcast_tx.send(format!("{ECHO_PREFIX}{text}"));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
            echo = broadcast_rx.recv() => {
                match echo {
                    Ok(text) => write.send(Message::Text(text)).await?,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        log::warn!("[Echo] Client {} lagged, missed {} echoes", peer, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = write.close().await;
    log::info!("[Echo] Client {} disconnected", peer);
    Ok(())
}
