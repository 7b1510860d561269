//! STOMP 1.2 text frame codec.
//!
//! Wire format:
//!
//! ```text
//! COMMAND\n
//! header:value\n
//! ...\n
//! \n
//! body\0
//! ```
//!
//! A bare end-of-line is a heart-beat. Header names and values are escaped
//! (`\\`, `\n`, `\r`, `\c`) on every command except CONNECT and CONNECTED.

use crate::error::ClientError;

/// Terminates every frame.
const NULL: char = '\0';

/// A decoded item from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete frame.
    Frame(Frame),
    /// A heart-beat (bare end-of-line).
    HeartBeat,
}

/// One STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame command, e.g. `SEND` or `MESSAGE`.
    pub command: String,
    /// Headers in wire order. Repeated names keep the first occurrence as
    /// authoritative, see [`Frame::header`].
    pub headers: Vec<(String, String)>,
    /// Frame body.
    pub body: String,
}

impl Frame {
    /// Create a frame with no headers and an empty body.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of header `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn escapes_headers(&self) -> bool {
        self.command != "CONNECT" && self.command != "CONNECTED"
    }

    /// Serialize to the text frame sent over the socket.
    #[must_use]
    pub fn encode(&self) -> String {
        let escape = self.escapes_headers();
        let mut out = String::with_capacity(self.command.len() + self.body.len() + 64);
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push(NULL);
        out
    }
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String, ClientError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(ClientError::Frame(format!(
                    "invalid header escape: \\{}",
                    other.map(String::from).unwrap_or_default()
                )))
            }
        }
    }
    Ok(out)
}

/// Decode every frame and heart-beat in one text message.
///
/// # Errors
///
/// Returns [`ClientError::Frame`] for a frame without a command, a header
/// without a colon, a bad escape, or a missing NULL terminator.
pub fn decode(text: &str) -> Result<Vec<Decoded>, ClientError> {
    let mut items = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
            items.push(Decoded::HeartBeat);
            rest = after;
            continue;
        }
        let (frame, after) = decode_one(rest)?;
        items.push(Decoded::Frame(frame));
        rest = after;
    }

    Ok(items)
}

fn next_line(input: &str) -> Option<(&str, &str)> {
    let end = input.find('\n')?;
    let line = input[..end].strip_suffix('\r').unwrap_or(&input[..end]);
    Some((line, &input[end + 1..]))
}

fn decode_one(input: &str) -> Result<(Frame, &str), ClientError> {
    let (command, mut rest) =
        next_line(input).ok_or_else(|| ClientError::Frame("missing command line".into()))?;
    if command.is_empty() {
        return Err(ClientError::Frame("empty command".into()));
    }

    let mut frame = Frame::new(command);
    let escaped = frame.escapes_headers();

    loop {
        let (line, after) =
            next_line(rest).ok_or_else(|| ClientError::Frame("unterminated headers".into()))?;
        rest = after;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ClientError::Frame(format!("header without colon: {line}")))?;
        let (name, value) = if escaped {
            (unescape_header(name)?, unescape_header(value)?)
        } else {
            (name.to_string(), value.to_string())
        };
        frame.headers.push((name, value));
    }

    let body_len = match frame.get("content-length") {
        Some(len) => {
            let len: usize = len
                .trim()
                .parse()
                .map_err(|_| ClientError::Frame(format!("bad content-length: {len}")))?;
            if rest.len() < len || !rest.is_char_boundary(len) {
                return Err(ClientError::Frame("body shorter than content-length".into()));
            }
            len
        }
        None => rest
            .find(NULL)
            .ok_or_else(|| ClientError::Frame("missing NULL terminator".into()))?,
    };

    frame.body = rest[..body_len].to_string();
    let after_body = rest[body_len..]
        .strip_prefix(NULL)
        .ok_or_else(|| ClientError::Frame("missing NULL terminator".into()))?;

    Ok((frame, after_body))
}
