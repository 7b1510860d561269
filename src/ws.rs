//! Duplex WebSocket primitive.
//!
//! The one place in the crate that touches `tokio-tungstenite` on the client
//! side. Both adapters build on it: the raw socket adapter forwards frames
//! unchanged, the STOMP session speaks its protocol over the text frames.
//!
//! [`connect`] performs the handshake and hands back a ([`WsWriter`],
//! [`WsReader`]) pair so a transport task can `tokio::select!` over reads and
//! outgoing commands independently.

// Rust guideline compliant 2026-02

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

/// Close code reported when the stream ends without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Close code used for caller-requested closes.
pub const NORMAL_CLOSURE: u16 = 1000;

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Frame received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
    /// Ping frame with payload.
    Ping(Vec<u8>),
    /// Pong frame with payload.
    Pong(Vec<u8>),
    /// Close frame.
    Close {
        /// Close status code (1005 when the peer sent none).
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },
}

/// Write half of a connection.
#[derive(Debug)]
pub struct WsWriter {
    sink: futures_util::stream::SplitSink<WsStream, tungstenite::Message>,
}

impl WsWriter {
    /// Send a UTF-8 text frame.
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.sink
            .send(tungstenite::Message::Text(text.to_string()))
            .await
            .context("WebSocket send_text failed")
    }

    /// Answer a ping.
    pub async fn send_pong(&mut self, data: Vec<u8>) -> Result<()> {
        self.sink
            .send(tungstenite::Message::Pong(data))
            .await
            .context("WebSocket send_pong failed")
    }

    /// Start the closing handshake with a normal close code.
    ///
    /// The peer's close reply still arrives through [`WsReader::recv`].
    pub async fn send_close(&mut self, reason: &str) -> Result<()> {
        let frame = tungstenite::protocol::CloseFrame {
            code: NORMAL_CLOSURE.into(),
            reason: reason.to_string().into(),
        };
        self.sink
            .send(tungstenite::Message::Close(Some(frame)))
            .await
            .context("WebSocket send_close failed")
    }

    /// Flush pending writes and close the sink.
    pub async fn close(&mut self) -> Result<()> {
        self.sink.close().await.context("WebSocket close failed")
    }
}

/// Read half of a connection.
#[derive(Debug)]
pub struct WsReader {
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WsReader {
    /// Receive the next frame; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Result<WsMessage>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(anyhow::anyhow!("WebSocket read error: {e}"))),
            };
            let frame = match message {
                tungstenite::Message::Text(text) => WsMessage::Text(text.to_string()),
                tungstenite::Message::Binary(data) => WsMessage::Binary(data.to_vec()),
                tungstenite::Message::Ping(data) => WsMessage::Ping(data.to_vec()),
                tungstenite::Message::Pong(data) => WsMessage::Pong(data.to_vec()),
                tungstenite::Message::Close(close_frame) => {
                    let (code, reason) = close_frame
                        .map(|cf| (cf.code.into(), cf.reason.to_string()))
                        .unwrap_or((1005, String::new()));
                    WsMessage::Close { code, reason }
                }
                tungstenite::Message::Frame(_) => continue,
            };
            return Some(Ok(frame));
        }
    }
}

/// Open a WebSocket connection to `url`, adding each `(name, value)` header
/// to the upgrade request.
///
/// # Errors
///
/// Fails on an invalid URL or header, or when the handshake fails.
pub async fn connect(url: &str, headers: &[(String, String)]) -> Result<(WsWriter, WsReader)> {
    use tungstenite::client::IntoClientRequest;

    let mut request = url
        .into_client_request()
        .with_context(|| format!("invalid WebSocket URL: {url}"))?;

    for (name, value) in headers {
        let header_name = tungstenite::http::HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name: {name}"))?;
        let header_value = tungstenite::http::HeaderValue::from_str(value)
            .with_context(|| format!("invalid header value for {name}"))?;
        request.headers_mut().insert(header_name, header_value);
    }

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .with_context(|| format!("WebSocket connect to {url} failed"))?;

    let (sink, stream) = ws_stream.split();

    Ok((WsWriter { sink }, WsReader { stream }))
}

/// Rewrite an `http(s)://` URL to the matching `ws(s)://` scheme.
#[must_use]
pub fn http_to_ws_scheme(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        url.to_string()
    }
}
