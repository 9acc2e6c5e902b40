//! qcon-core: Shared protocol library for the Quest Console.
//!
//! Provides the markup renderer (render nodes + directive tokenizer), the
//! wire protocol (control tokens, outbound event messages, game identifier
//! derivation), and the shared error type.

pub mod error;
pub mod markup;
pub mod protocol;

// Re-export commonly used items at crate root.
pub use error::{ConsoleError, ConsoleResult};
pub use markup::{render, Node, ParsedLine, SpanKind};
pub use protocol::{game_id_from_path, ClientEvent, Inbound, EVENT_NEW_CONNECTION};
