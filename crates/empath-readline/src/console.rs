//! Terminal console backed by rustyline.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use crossterm::{cursor::MoveTo, execute, terminal};
use empath_core::config::ConsoleConfig;
use empath_core::session::{Console, InputEvent, is_termination_command};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

/// Rustyline helper that highlights termination commands while typing.
#[derive(Clone, Default)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = String;
}

impl Hinter for CliHelper {
    type Hint = String;
}

impl Validator for CliHelper {}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if is_termination_command(line) {
            Owned(line.bright_yellow().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

/// Interactive terminal: rustyline input, colored output and a typing effect.
pub struct TerminalConsole {
    editor: Editor<CliHelper, DefaultHistory>,
    typing_delay: Duration,
    clear_screen: bool,
}

impl TerminalConsole {
    pub fn new(config: &ConsoleConfig) -> rustyline::Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CliHelper));

        Ok(Self {
            editor,
            typing_delay: Duration::from_millis(config.typing_delay_ms),
            clear_screen: config.clear_screen,
        })
    }

    /// Prints a framed heading.
    pub fn heading(&mut self, text: &str) {
        println!("{}", text.bright_magenta().bold());
    }

    /// Prints an error line in red.
    pub fn error(&mut self, text: &str) {
        println!("{}", text.red());
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self, prompt: &str) -> InputEvent {
        // rustyline blocks on the terminal; keep other runtime tasks (the
        // Ctrl-C watcher) running on the remaining workers.
        let result = tokio::task::block_in_place(|| self.editor.readline(prompt));

        match result {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                InputEvent::Line(line)
            }
            Err(ReadlineError::Interrupted) => InputEvent::Interrupted,
            Err(ReadlineError::Eof) => InputEvent::Closed,
            Err(err) => {
                tracing::warn!("Readline failed: {:?}", err);
                InputEvent::Closed
            }
        }
    }

    fn say(&mut self, text: &str) {
        println!("{}", text);
    }

    async fn render_reply(&mut self, label: &str, text: &str) {
        let mut stdout = std::io::stdout();
        print!("{}", format!("{label}: ").bright_cyan().bold());

        if self.typing_delay.is_zero() {
            print!("{}", text);
        } else {
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                let _ = stdout.write_all(ch.encode_utf8(&mut buf).as_bytes());
                let _ = stdout.flush();
                tokio::time::sleep(self.typing_delay).await;
            }
        }

        println!();
        let _ = stdout.flush();
    }

    fn clear(&mut self) {
        if !self.clear_screen {
            return;
        }
        if let Err(err) = execute!(
            std::io::stdout(),
            terminal::Clear(terminal::ClearType::All),
            MoveTo(0, 0)
        ) {
            tracing::debug!("Failed to clear screen: {}", err);
        }
    }
}
