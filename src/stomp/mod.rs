//! STOMP 1.2 over WebSocket: frame codec and broker session.

pub mod frame;
pub mod session;

pub use frame::{Decoded, Frame};
pub use session::{StompSession, Subscription};
