//! Terminal output sink — renders node trees as styled ANSI text.
//!
//! Color and italic spans map onto ANSI styling, centered lines are padded
//! against the terminal width, and a margin span ends with a fixed gap.
//! Removing the pending prompt line wipes the row it was printed on.

use std::io::{self, Write};

use crossterm::style::{Attribute, Color, Stylize};
use crossterm::{cursor, execute, terminal};

use qcon_client::sink::OutputSink;
use qcon_core::markup::{plain_text, Node, SpanKind};

/// Gap printed after a margin span's content.
const MARGIN_GAP: &str = "  ";

/// Sink that prints rendered lines to stdout.
pub struct AnsiSink {
    /// Terminal width used for centering, sampled at startup.
    width: usize,
}

impl AnsiSink {
    pub fn new() -> Self {
        Self {
            width: terminal_width(),
        }
    }
}

impl Default for AnsiSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for AnsiSink {
    fn push_line(&mut self, nodes: Vec<Node>) {
        let mut out = String::new();

        if is_centered(&nodes) {
            let text_width = plain_text(&nodes).chars().count();
            let pad = self.width.saturating_sub(text_width) / 2;
            out.push_str(&" ".repeat(pad));
        }

        append_styled(&mut out, &nodes, RunStyle::default());
        println!("{out}");
        let _ = io::stdout().flush();
    }

    fn remove_last_line(&mut self) {
        // Best effort: move up one row and wipe it.
        let _ = execute!(
            io::stdout(),
            cursor::MoveUp(1),
            terminal::Clear(terminal::ClearType::CurrentLine),
            cursor::MoveToColumn(0),
        );
    }

    fn clear(&mut self) {
        let _ = execute!(
            io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0),
        );
    }
}

/// The current terminal width in columns.
///
/// Falls back to 80 if the size cannot be determined.
fn terminal_width() -> usize {
    terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80)
}

/// Styling accumulated while descending into nested spans.
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    fg: Option<Color>,
    italic: bool,
}

/// Whether the line carries a centered span at the top level.
fn is_centered(nodes: &[Node]) -> bool {
    nodes
        .iter()
        .any(|node| matches!(node, Node::Styled { kind: SpanKind::Center, .. }))
}

fn append_styled(out: &mut String, nodes: &[Node], style: RunStyle) {
    for node in nodes {
        match node {
            Node::Text(text) => push_run(out, text, style),
            Node::Styled { kind, children } => {
                let mut inner = style;
                match kind {
                    SpanKind::Color(name) => {
                        if let Some(color) = color_by_name(name) {
                            inner.fg = Some(color);
                        }
                    }
                    SpanKind::Italic => inner.italic = true,
                    SpanKind::MarginRight | SpanKind::Center => {}
                }
                append_styled(out, children, inner);
                if matches!(kind, SpanKind::MarginRight) {
                    out.push_str(MARGIN_GAP);
                }
            }
        }
    }
}

fn push_run(out: &mut String, text: &str, style: RunStyle) {
    if style.fg.is_none() && !style.italic {
        out.push_str(text);
        return;
    }

    let mut styled = text.to_string().stylize();
    if let Some(color) = style.fg {
        styled = styled.with(color);
    }
    if style.italic {
        styled = styled.attribute(Attribute::Italic);
    }
    out.push_str(&styled.to_string());
}

/// Map a server color name onto a terminal color.
///
/// Unknown names leave the text unstyled rather than guessing.
fn color_by_name(name: &str) -> Option<Color> {
    match name {
        "red" => Some(Color::Red),
        "dark_red" => Some(Color::DarkRed),
        "green" => Some(Color::Green),
        "dark_green" => Some(Color::DarkGreen),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        "grey" | "gray" => Some(Color::Grey),
        _ => None,
    }
}
