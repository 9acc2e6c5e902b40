//! Wire protocol between the console and the game server.
//!
//! Outbound traffic is one JSON message per player action or lifecycle
//! event. Inbound traffic is one plain string per message: either a reserved
//! control token, interpreted before any markup parsing, or a markup-bearing
//! text line handed to [`crate::markup::render`].

use serde::{Deserialize, Serialize};

use crate::error::ConsoleResult;

/// Inbound control token: wipe the console output.
pub const CLEAR_OUTPUT: &str = "#clear";
/// Inbound control token: retract the last pending prompt without rendering.
pub const RETRACT_PROMPT: &str = "#remove_prompt";

/// Outbound lifecycle event sent once, immediately after the channel opens.
pub const EVENT_NEW_CONNECTION: &str = "new_connection";

/// One outbound message: `{ "game": ..., "event": ... }`.
///
/// `event` is either [`EVENT_NEW_CONNECTION`] or the literal text the player
/// submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEvent {
    pub game: String,
    pub event: String,
}

impl ClientEvent {
    pub fn new(game: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            event: event.into(),
        }
    }

    /// Encode as the JSON wire form.
    pub fn encode(&self) -> ConsoleResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Classification of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Clear the output sink's entire contents.
    ClearOutput,
    /// Retract the most recently rendered pending prompt.
    RetractPrompt,
    /// A markup-bearing text line.
    Line(String),
}

impl Inbound {
    /// Classify one raw inbound message. Control tokens match on whole-message
    /// equality; everything else is a text line.
    pub fn classify(raw: String) -> Self {
        match raw.as_str() {
            CLEAR_OUTPUT => Inbound::ClearOutput,
            RETRACT_PROMPT => Inbound::RetractPrompt,
            _ => Inbound::Line(raw),
        }
    }
}

/// Derive the session's game identifier from a URL path.
///
/// The identifier is the path with leading and trailing slashes removed,
/// fixed for the session's lifetime: `/dungeon/` and `/dungeon` both yield
/// `dungeon`.
pub fn game_id_from_path(path: &str) -> String {
    path.trim_matches('/').to_string()
}
