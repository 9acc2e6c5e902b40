//! The console session: serialized message handling and the prompt gate.
//!
//! One task owns the session, so inbound messages are handled one at a time
//! in transport order. A line carrying the prompt marker raises a gate:
//! every later message is held back until the player presses enter, with one
//! exception — the retract token, which the server sends to take back its
//! own prompt and which therefore never waits on the gate. The cooperative
//! poll loops of a browser event loop become a `select!` rendezvous here;
//! the observable ordering is identical.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use qcon_core::error::ConsoleResult;
use qcon_core::markup::{self, Node};
use qcon_core::protocol::{ClientEvent, Inbound, EVENT_NEW_CONNECTION};

use crate::sink::OutputSink;
use crate::transport::Transport;

/// The literal line appended below a prompt-requesting line.
pub const PROMPT_LINE: &str = "Press enter to continue...";

/// Connection lifecycle of a session. Terminal on `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport is up but the opening event has not been sent yet.
    Connecting,
    /// The opening event was sent; traffic flows.
    Open,
    /// The channel is gone, by either side's choice.
    Closed,
}

/// A console session over one transport, writing into one output sink.
pub struct ConsoleSession<T, S> {
    transport: T,
    sink: S,
    /// Path-derived game identifier; immutable for the session's lifetime.
    game: String,
    state: SessionState,
    /// True exactly while a rendered prompt awaits the player's enter.
    awaiting_ack: bool,
    /// Messages that arrived while the gate was up, in arrival order.
    deferred: VecDeque<Inbound>,
}

impl<T: Transport, S: OutputSink> ConsoleSession<T, S> {
    /// Create a session over an open transport.
    pub fn new(transport: T, sink: S, game: impl Into<String>) -> Self {
        Self {
            transport,
            sink,
            game: game.into(),
            state: SessionState::Connecting,
            awaiting_ack: false,
            deferred: VecDeque::new(),
        }
    }

    /// The session's game identifier.
    pub fn game(&self) -> &str {
        &self.game
    }

    /// Current connection state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a rendered prompt is waiting for the player's enter.
    pub fn awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    /// Drive the session until the server closes the channel or the input
    /// surface goes away.
    ///
    /// `input` carries one submitted player line per message; the sender
    /// dropping it is the teardown signal (the player left).
    pub async fn run(&mut self, mut input: mpsc::Receiver<String>) -> ConsoleResult<()> {
        self.announce().await?;

        loop {
            tokio::select! {
                biased;

                submitted = input.recv() => match submitted {
                    Some(line) => self.submit_input(&line).await?,
                    None => {
                        // Intentional shutdown: close quietly, no
                        // close-event side effects.
                        tracing::debug!("input surface gone, closing session");
                        self.transport.close().await?;
                        break;
                    }
                },

                inbound = self.transport.recv() => match inbound? {
                    Some(raw) => self.handle_message(raw),
                    None => {
                        tracing::info!("server closed the channel");
                        break;
                    }
                },
            }
        }

        self.state = SessionState::Closed;
        Ok(())
    }

    /// Send the opening lifecycle event.
    pub async fn announce(&mut self) -> ConsoleResult<()> {
        let event = ClientEvent::new(self.game.as_str(), EVENT_NEW_CONNECTION).encode()?;
        self.transport.send(&event).await?;
        self.state = SessionState::Open;
        Ok(())
    }

    /// Handle one inbound message.
    ///
    /// The retract token is interpreted before the gate and never waits on
    /// it. Everything else is held back while a prompt is pending and
    /// rendered once the gate clears, in arrival order.
    pub fn handle_message(&mut self, raw: String) {
        let msg = Inbound::classify(raw);

        if matches!(msg, Inbound::RetractPrompt) {
            tracing::debug!("server retracted its prompt");
            self.retract_prompt();
            self.drain_deferred();
            return;
        }

        if self.awaiting_ack {
            tracing::trace!("prompt pending, deferring message");
            self.deferred.push_back(msg);
            return;
        }

        self.apply(msg);
    }

    /// Handle one submitted player line.
    ///
    /// A pending prompt is dismissed first, whether or not the line carries
    /// text; empty input sends nothing.
    pub async fn submit_input(&mut self, line: &str) -> ConsoleResult<()> {
        self.retract_prompt();

        if !line.is_empty() {
            let event = ClientEvent::new(self.game.as_str(), line).encode()?;
            self.transport.send(&event).await?;
        }

        self.drain_deferred();
        Ok(())
    }

    fn apply(&mut self, msg: Inbound) {
        match msg {
            Inbound::RetractPrompt => self.retract_prompt(),
            Inbound::ClearOutput => {
                tracing::debug!("clearing console output");
                self.sink.clear();
            }
            Inbound::Line(line) => self.render_line(&line),
        }
    }

    fn render_line(&mut self, line: &str) {
        let parsed = markup::render(line);
        let requests_prompt = parsed.requests_prompt;
        self.sink.push_line(parsed.nodes);

        if requests_prompt {
            self.sink.push_line(vec![Node::text(PROMPT_LINE)]);
            self.awaiting_ack = true;
        }
    }

    /// Remove the pending prompt line and clear the gate.
    ///
    /// Idempotent: with no prompt pending this is a no-op and the sink is
    /// not touched.
    fn retract_prompt(&mut self) {
        if self.awaiting_ack {
            self.sink.remove_last_line();
            self.awaiting_ack = false;
        }
    }

    /// Render messages that arrived while the gate was up, stopping again as
    /// soon as a drained line raises a new prompt.
    fn drain_deferred(&mut self) {
        while !self.awaiting_ack {
            let Some(msg) = self.deferred.pop_front() else {
                break;
            };
            self.apply(msg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::BufferSink;
    use qcon_core::markup::plain_text;

    /// In-memory transport: records sends, replays a scripted inbound queue.
    #[derive(Default)]
    struct MockTransport {
        sent: Vec<String>,
        inbound: VecDeque<String>,
        closed: bool,
    }

    impl MockTransport {
        fn with_inbound(messages: &[&str]) -> Self {
            Self {
                inbound: messages.iter().map(|m| m.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Transport for MockTransport {
        async fn send(&mut self, text: &str) -> ConsoleResult<()> {
            self.sent.push(text.to_string());
            Ok(())
        }

        async fn recv(&mut self) -> ConsoleResult<Option<String>> {
            Ok(self.inbound.pop_front())
        }

        async fn close(&mut self) -> ConsoleResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    fn session() -> ConsoleSession<MockTransport, BufferSink> {
        ConsoleSession::new(MockTransport::default(), BufferSink::new(), "dungeon")
    }

    fn line_texts(sink: &BufferSink) -> Vec<String> {
        sink.lines().iter().map(|nodes| plain_text(nodes)).collect()
    }

    #[tokio::test]
    async fn announce_sends_new_connection() {
        let mut session = session();
        session.announce().await.unwrap();
        assert_eq!(
            session.transport.sent,
            vec![r#"{"game":"dungeon","event":"new_connection"}"#]
        );
        assert_eq!(session.state(), SessionState::Open);
    }

    #[tokio::test]
    async fn text_line_is_rendered_to_sink() {
        let mut session = session();
        session.handle_message("you wake up".into());
        assert_eq!(line_texts(&session.sink), vec!["you wake up"]);
        assert!(!session.awaiting_ack());
    }

    #[tokio::test]
    async fn prompt_line_appends_prompt_and_raises_gate() {
        let mut session = session();
        session.handle_message("a dragon appears$prompt".into());
        assert_eq!(
            line_texts(&session.sink),
            vec!["a dragon appears", PROMPT_LINE]
        );
        assert!(session.awaiting_ack());
    }

    #[tokio::test]
    async fn later_message_waits_for_acknowledgment() {
        let mut session = session();
        session.handle_message("a dragon appears$prompt".into());
        session.handle_message("it breathes fire".into());

        // B must not render ahead of the unacknowledged prompt.
        assert_eq!(
            line_texts(&session.sink),
            vec!["a dragon appears", PROMPT_LINE]
        );

        // Player presses enter: the prompt line goes away, then B renders.
        session.submit_input("").await.unwrap();
        assert_eq!(
            line_texts(&session.sink),
            vec!["a dragon appears", "it breathes fire"]
        );
        assert!(!session.awaiting_ack());
    }

    #[tokio::test]
    async fn retract_token_unblocks_deferred_messages() {
        let mut session = session();
        session.handle_message("a dragon appears$prompt".into());
        session.handle_message("it breathes fire".into());
        session.handle_message("#remove_prompt".into());

        // The retract removed exactly the prompt line and released B.
        assert_eq!(
            line_texts(&session.sink),
            vec!["a dragon appears", "it breathes fire"]
        );
        assert!(!session.awaiting_ack());
    }

    #[tokio::test]
    async fn retract_with_no_pending_prompt_is_noop() {
        let mut session = session();
        session.handle_message("you wake up".into());
        session.handle_message("#remove_prompt".into());
        assert_eq!(line_texts(&session.sink), vec!["you wake up"]);
    }

    #[tokio::test]
    async fn gate_clearing_is_idempotent() {
        let mut session = session();
        session.handle_message("continue?$prompt".into());
        session.handle_message("#remove_prompt".into());
        session.handle_message("#remove_prompt".into());

        // The second clear must not remove a second line.
        assert_eq!(line_texts(&session.sink), vec!["continue?"]);
    }

    #[tokio::test]
    async fn clear_token_wipes_sink() {
        let mut session = session();
        session.handle_message("one".into());
        session.handle_message("two".into());
        session.handle_message("#clear".into());
        assert!(session.sink.lines().is_empty());
    }

    #[tokio::test]
    async fn clear_token_also_waits_behind_gate() {
        let mut session = session();
        session.handle_message("read this$prompt".into());
        session.handle_message("#clear".into());

        // Still on screen: the gate holds the clear back too.
        assert_eq!(line_texts(&session.sink), vec!["read this", PROMPT_LINE]);

        session.submit_input("").await.unwrap();
        assert!(session.sink.lines().is_empty());
    }

    #[tokio::test]
    async fn input_dismisses_prompt_then_sends_event() {
        let mut session = session();
        session.handle_message("well?$prompt".into());
        session.submit_input("yes").await.unwrap();

        assert_eq!(line_texts(&session.sink), vec!["well?"]);
        assert_eq!(
            session.transport.sent,
            vec![r#"{"game":"dungeon","event":"yes"}"#]
        );
    }

    #[tokio::test]
    async fn empty_input_sends_nothing() {
        let mut session = session();
        session.submit_input("").await.unwrap();
        assert!(session.transport.sent.is_empty());
    }

    #[tokio::test]
    async fn deferred_messages_render_in_arrival_order() {
        let mut session = session();
        session.handle_message("a$prompt".into());
        session.handle_message("b".into());
        session.handle_message("c".into());
        session.submit_input("").await.unwrap();
        assert_eq!(line_texts(&session.sink), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn draining_stops_at_the_next_prompt() {
        let mut session = session();
        session.handle_message("a$prompt".into());
        session.handle_message("b$prompt".into());
        session.handle_message("c".into());
        session.submit_input("").await.unwrap();

        // b's prompt re-raises the gate; c stays deferred.
        assert_eq!(line_texts(&session.sink), vec!["a", "b", PROMPT_LINE]);
        assert!(session.awaiting_ack());

        session.submit_input("").await.unwrap();
        assert_eq!(line_texts(&session.sink), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn run_announces_then_drains_until_server_close() {
        let transport = MockTransport::with_inbound(&["hello there", "#clear", "fresh start"]);
        let mut session = ConsoleSession::new(transport, BufferSink::new(), "dungeon");

        let (_input_tx, input_rx) = mpsc::channel(8);
        session.run(input_rx).await.unwrap();

        assert_eq!(
            session.transport.sent,
            vec![r#"{"game":"dungeon","event":"new_connection"}"#]
        );
        assert_eq!(line_texts(&session.sink), vec!["fresh start"]);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn run_closes_transport_when_input_surface_drops() {
        let mut session = session();
        let (input_tx, input_rx) = mpsc::channel::<String>(8);
        drop(input_tx);

        session.run(input_rx).await.unwrap();
        assert!(session.transport.closed);
        assert_eq!(session.state(), SessionState::Closed);
    }
}
