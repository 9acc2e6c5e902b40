//! qcon-client: Session library for the Quest Console.
//!
//! Owns the connection lifecycle: the WebSocket transport, the serialized
//! inbound message handling with its prompt gate, and the output sink
//! abstraction the rendered lines are pushed into.

pub mod session;
pub mod sink;
pub mod transport;

// Re-export commonly used items at crate root.
pub use session::{ConsoleSession, SessionState, PROMPT_LINE};
pub use sink::{BufferSink, OutputSink};
pub use transport::{websocket::WebSocketTransport, Transport};
