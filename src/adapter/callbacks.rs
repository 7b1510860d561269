//! Callback slots consulted by transport tasks.
//!
//! Each adapter owns one [`CallbackRegistry`] and shares it (behind an `Arc`)
//! with its transport task. The task never captures a caller's closure
//! directly; it dispatches an [`Event`] and the registry looks up whatever is
//! registered for that kind *at dispatch time*. Callers can therefore register
//! before or after `connect()` without missing events.
//!
//! # Deadlock Prevention
//!
//! The callback is cloned out under the lock and invoked after the lock is
//! released, so a callback may call `send()`, `disconnect()`, or re-register
//! callbacks on the same adapter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ClientError;

/// Callback for connection establishment.
pub type ConnectCallback = Arc<dyn Fn() + Send + Sync>;
/// Callback for an incoming message payload.
pub type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Callback for transport-originated errors.
pub type ErrorCallback = Arc<dyn Fn(&ClientError) + Send + Sync>;
/// Callback for connection close.
pub type CloseCallback = Arc<dyn Fn(&CloseInfo) + Send + Sync>;

/// Why a connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// WebSocket close code (1000 normal, 1006 abnormal).
    pub code: u16,
    /// Close reason, possibly empty.
    pub reason: String,
}

impl CloseInfo {
    /// Build a close record.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Kind of transport event a callback can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Connection established.
    Connect,
    /// Message received.
    Message,
    /// Transport error.
    Error,
    /// Connection closed.
    Close,
}

/// An event raised by a transport task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Connection established.
    Open,
    /// Opaque message payload.
    Message(String),
    /// Transport or broker error.
    Error(ClientError),
    /// Connection closed.
    Close(CloseInfo),
}

impl Event {
    /// The callback slot this event is routed to.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Open => EventKind::Connect,
            Self::Message(_) => EventKind::Message,
            Self::Error(_) => EventKind::Error,
            Self::Close(_) => EventKind::Close,
        }
    }
}

/// A registered callback, tagged with its kind.
#[derive(Clone)]
pub enum Callback {
    /// See [`ConnectCallback`].
    Connect(ConnectCallback),
    /// See [`MessageCallback`].
    Message(MessageCallback),
    /// See [`ErrorCallback`].
    Error(ErrorCallback),
    /// See [`CloseCallback`].
    Close(CloseCallback),
}

impl Callback {
    /// The slot this callback occupies.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Connect(_) => EventKind::Connect,
            Self::Message(_) => EventKind::Message,
            Self::Error(_) => EventKind::Error,
            Self::Close(_) => EventKind::Close,
        }
    }

    fn invoke(&self, event: &Event) {
        match (self, event) {
            (Self::Connect(cb), Event::Open) => cb(),
            (Self::Message(cb), Event::Message(data)) => cb(data),
            (Self::Error(cb), Event::Error(err)) => cb(err),
            (Self::Close(cb), Event::Close(info)) => cb(info),
            _ => {}
        }
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Callback").field(&self.kind()).finish()
    }
}

/// One optional callback per [`EventKind`]; registering replaces.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    slots: Mutex<HashMap<EventKind, Callback>>,
}

impl CallbackRegistry {
    /// Create an empty, shareable registry.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store `callback` in its slot, replacing any earlier registration.
    pub fn register(&self, callback: Callback) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(callback.kind(), callback);
    }

    /// Empty the slot for `kind`.
    pub fn clear(&self, kind: EventKind) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&kind);
    }

    /// Whether a callback is registered for `kind`.
    #[must_use]
    pub fn is_registered(&self, kind: EventKind) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.contains_key(&kind)
    }

    /// Invoke the current callback for the event's kind, if any.
    ///
    /// Returns `true` when a callback ran.
    pub fn dispatch(&self, event: &Event) -> bool {
        let callback = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(&event.kind()).cloned()
        };
        match callback {
            Some(callback) => {
                callback.invoke(event);
                true
            }
            None => false,
        }
    }
}
