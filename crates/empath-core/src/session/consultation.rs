//! Sequential request/response loop over the established session.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backend::ChatSession;
use super::console::{Console, InputEvent};
use crate::error::EmpathError;

/// Label printed in front of every reply during the consultation.
pub const AI_LABEL: &str = "Dr. Serene";
pub const FAREWELL_MESSAGE: &str = "\nEmpath AI: Take care. Please follow up if symptoms persist.";
pub const INTERRUPTED_MESSAGE: &str = "\n\nDr. Serene: Consultation ended.";

const TERMINATION_COMMANDS: &[&str] = &["quit", "exit", "bye"];

/// Returns true for `quit`, `exit` or `bye` in any case, ignoring surrounding whitespace.
pub fn is_termination_command(input: &str) -> bool {
    let input = input.trim();
    TERMINATION_COMMANDS
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

/// How the consultation ended. Every outcome is a normal (exit code 0) ending.
#[derive(Debug, Clone)]
pub enum ConsultationOutcome {
    /// The user typed a termination command.
    Farewell,
    /// Ctrl-C, closed input or cancellation of a pending call.
    Interrupted,
    /// A send failed; the session is not reused.
    TransportFailed(EmpathError),
}

/// Owns the live session for the rest of the process.
pub struct ConsultationLoop {
    session: Box<dyn ChatSession>,
    patient_name: String,
    turns_sent: usize,
}

impl ConsultationLoop {
    pub fn new(session: Box<dyn ChatSession>, patient_name: impl Into<String>) -> Self {
        Self {
            session,
            patient_name: patient_name.into(),
            turns_sent: 0,
        }
    }

    /// Number of user messages delivered after the persona prompt.
    pub fn turns_sent(&self) -> usize {
        self.turns_sent
    }

    /// Runs until the user quits, interrupts, or a send fails.
    ///
    /// Cancelling `cancel` while a send is pending drops the outstanding call;
    /// cancelling during the typing effect stops the reply mid-way.
    pub async fn run(
        &mut self,
        console: &mut dyn Console,
        cancel: &CancellationToken,
    ) -> ConsultationOutcome {
        let prompt = format!("\n{}: ", self.patient_name);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => InputEvent::Interrupted,
                event = console.read_line(&prompt) => event,
            };

            let line = match event {
                InputEvent::Line(line) => line,
                InputEvent::Interrupted | InputEvent::Closed => {
                    return self.interrupted(console);
                }
            };

            let input = line.trim();
            if is_termination_command(input) {
                info!("Consultation closed by user after {} turn(s)", self.turns_sent);
                console.say(FAREWELL_MESSAGE);
                return ConsultationOutcome::Farewell;
            }
            if input.is_empty() {
                continue;
            }

            debug!("Sending turn {} to '{}'", self.turns_sent + 1, self.session.model_id());
            let pending = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.session.send_message(input) => Some(result),
            };
            let Some(result) = pending else {
                return self.interrupted(console);
            };

            match result {
                Ok(reply) => {
                    self.turns_sent += 1;
                    let rendered = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => false,
                        _ = console.render_reply(AI_LABEL, &reply) => true,
                    };
                    if !rendered {
                        return self.interrupted(console);
                    }
                }
                Err(err) => {
                    let err = EmpathError::transport(err.detail());
                    warn!("Consultation aborted: {}", err);
                    console.say(&format!("\nError during consultation: {}", err.detail()));
                    return ConsultationOutcome::TransportFailed(err);
                }
            }
        }
    }

    fn interrupted(&self, console: &mut dyn Console) -> ConsultationOutcome {
        info!("Consultation interrupted after {} turn(s)", self.turns_sent);
        console.say(INTERRUPTED_MESSAGE);
        ConsultationOutcome::Interrupted
    }
}
