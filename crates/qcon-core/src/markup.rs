//! Markup rendering for game server text lines.
//!
//! The server styles its output with `$`-directives embedded in plain text:
//! `$color_red`, `$italic`, `$mr` and `$center` open a styled span, a bare
//! `$` closes the innermost open span, and `$prompt` marks the line as
//! requesting a "press enter" acknowledgment. The directives come from the
//! server, not the player, so parsing never fails: unknown directives are
//! dropped, a closer with nothing open is dropped, and spans still open at
//! end of line are closed automatically.

/// Character that starts a directive.
const DIRECTIVE_START: char = '$';
/// Separates a directive command from its parameter, as in `color_red`.
const PARAM_SEP: char = '_';

/// Directive commands that open a styled span.
const CMD_COLOR: &str = "color";
const CMD_ITALIC: &str = "italic";
const CMD_MARGIN_RIGHT: &str = "mr";
const CMD_CENTER: &str = "center";
/// Whole-line marker requesting a prompt; stripped wherever it occurs.
const CMD_PROMPT: &str = "prompt";

/// The styling a span applies to its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// Foreground color by name (`red`, `green`, ...).
    Color(String),
    Italic,
    MarginRight,
    Center,
}

/// One node of a rendered line: a literal text run or a styled span.
///
/// Spans nest; `children` preserves insertion order and may be empty. Trees
/// produced by [`render`] are always well-formed — open/close pairing is
/// resolved at parse time and no dangling markers survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Styled { kind: SpanKind, children: Vec<Node> },
}

impl Node {
    /// A plain text node.
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    /// A styled span wrapping `children`.
    pub fn styled(kind: SpanKind, children: Vec<Node>) -> Self {
        Node::Styled { kind, children }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(content),
            Node::Styled { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// The result of rendering one raw server line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Top-level render nodes, in order.
    pub nodes: Vec<Node>,
    /// Whether the line asks the player to press enter before continuing.
    pub requests_prompt: bool,
}

impl ParsedLine {
    /// The line's text with all styling stripped.
    pub fn plain_text(&self) -> String {
        plain_text(&self.nodes)
    }
}

/// Flatten a node sequence to its literal text.
pub fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.collect_text(&mut out);
    }
    out
}

/// Transient token produced while scanning a directive.
///
/// `consumed` counts the bytes after the `$`, including the terminating
/// space if one ended the name.
struct Directive<'a> {
    command: &'a str,
    parameter: &'a str,
    consumed: usize,
    /// Whether a space terminated the name.
    sep: bool,
}

/// Scan the directive starting right after a `$`.
///
/// The name runs to the first space, the next `$`, or end of line. A name
/// containing `_` splits at the first one into command and parameter;
/// otherwise the parameter is empty.
fn scan_directive(rest: &str) -> Directive<'_> {
    let end = rest
        .find(|c| c == ' ' || c == DIRECTIVE_START)
        .unwrap_or(rest.len());
    let name = &rest[..end];
    let sep = rest[end..].starts_with(' ');

    let (command, parameter) = match name.find(PARAM_SEP) {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (name, ""),
    };

    Directive {
        command,
        parameter,
        consumed: end + usize::from(sep),
        sep,
    }
}

/// Builds the node tree while the scanner walks the line.
#[derive(Default)]
struct TreeBuilder {
    top: Vec<Node>,
    open: Vec<(SpanKind, Vec<Node>)>,
    buf: String,
}

impl TreeBuilder {
    fn push_char(&mut self, ch: char) {
        self.buf.push(ch);
    }

    /// The node list currently receiving output.
    fn current(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some((_, children)) => children,
            None => &mut self.top,
        }
    }

    fn flush(&mut self) {
        if !self.buf.is_empty() {
            let text = Node::Text(std::mem::take(&mut self.buf));
            self.current().push(text);
        }
    }

    fn open_span(&mut self, kind: SpanKind) {
        self.flush();
        self.open.push((kind, Vec::new()));
    }

    /// Close the innermost open span. Closers are LIFO markers, not
    /// tag-matched: whichever span opened last is the one that closes.
    /// A closer with nothing open is dropped.
    fn close_span(&mut self) {
        self.flush();
        if let Some((kind, children)) = self.open.pop() {
            self.current().push(Node::Styled { kind, children });
        }
    }

    /// Auto-close anything still open, innermost first, and yield the tree.
    fn finish(mut self) -> Vec<Node> {
        self.flush();
        while !self.open.is_empty() {
            self.close_span();
        }
        self.top
    }
}

/// Render one raw server line into a tree of nodes.
///
/// Never fails: malformed markup degrades to best-effort text rather than
/// corrupting output.
pub fn render(line: &str) -> ParsedLine {
    let mut tree = TreeBuilder::default();
    let mut requests_prompt = false;

    let mut idx = 0;
    while idx < line.len() {
        let rest = &line[idx..];
        let Some(ch) = rest.chars().next() else { break };
        if ch != DIRECTIVE_START {
            tree.push_char(ch);
            idx += ch.len_utf8();
            continue;
        }

        let dir = scan_directive(&rest[1..]);
        match dir.command {
            CMD_COLOR => tree.open_span(SpanKind::Color(dir.parameter.into())),
            CMD_ITALIC => tree.open_span(SpanKind::Italic),
            CMD_MARGIN_RIGHT => tree.open_span(SpanKind::MarginRight),
            CMD_CENTER => tree.open_span(SpanKind::Center),
            CMD_PROMPT => {
                // The marker is stripped; the surrounding text is untouched,
                // so a trailing separator stays in place.
                requests_prompt = true;
                idx += 1 + dir.consumed - usize::from(dir.sep);
                continue;
            }
            "" => tree.close_span(),
            // Unrecognized: consumed silently, produces no output.
            _ => {}
        }
        idx += 1 + dir.consumed;
    }

    ParsedLine {
        nodes: tree.finish(),
        requests_prompt,
    }
}
