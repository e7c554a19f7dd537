//! Terminal abstraction used by intake and the consultation loop.

use async_trait::async_trait;

/// One read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C while waiting for input.
    Interrupted,
    /// Input stream closed (Ctrl-D / EOF).
    Closed,
}

/// Interactive surface the core talks to.
///
/// The terminal implementation lives in the binary; tests use scripted consoles.
#[async_trait]
pub trait Console: Send {
    /// Prompts and reads one line.
    async fn read_line(&mut self, prompt: &str) -> InputEvent;

    /// Prints an informational line.
    fn say(&mut self, text: &str);

    /// Renders an assistant reply prefixed by `label`.
    async fn render_reply(&mut self, label: &str, text: &str);

    /// Clears the screen. No-op by default.
    fn clear(&mut self) {}
}
