//! Terminal presentation behind a rendering port

pub mod markdown;
pub mod terminal;

pub use terminal::TerminalUi;

use crate::error::Result;

/// Severity of a static message; selects the panel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Success,
    Warning,
    Error,
    System,
}

/// Where conversation output goes.
///
/// A reply is delivered as `begin_reply`, any number of fragments in arrival
/// order, then `end_reply` with the concatenated text (empty if the reply
/// failed). Renderers that need the whole text buffer it themselves.
pub trait Renderer {
    /// Show a titled static message
    fn message(&mut self, notice: Notice, title: &str, body: &str);

    fn begin_reply(&mut self);

    fn reply_fragment(&mut self, fragment: &str);

    fn end_reply(&mut self, reply: &str);
}

/// A renderer that can also read chat input
pub trait ChatConsole: Renderer {
    /// Next line of input, `None` once input is exhausted
    fn read_input(&mut self, label: &str) -> Result<Option<String>>;

    fn clear(&mut self);
}
