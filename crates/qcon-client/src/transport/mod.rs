//! Abstract duplex message transport.
//!
//! The game protocol assumes a message-oriented channel: one logical line
//! per message, delivered in order. The WebSocket implementation lives in
//! [`websocket`]; tests substitute an in-memory queue.

pub mod websocket;

use qcon_core::error::ConsoleResult;

/// A bidirectional, ordered, message-oriented channel.
#[allow(async_fn_in_trait)]
pub trait Transport: Send {
    /// Send one outbound message.
    async fn send(&mut self, text: &str) -> ConsoleResult<()>;

    /// Receive the next inbound message. `None` means the channel closed.
    async fn recv(&mut self) -> ConsoleResult<Option<String>>;

    /// Close the channel for an intentional shutdown.
    ///
    /// After this, `recv` reports a clean end of stream instead of an error,
    /// so teardown never surfaces reconnect/error side effects.
    async fn close(&mut self) -> ConsoleResult<()>;
}
