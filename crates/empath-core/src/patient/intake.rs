//! Interactive intake of the patient's name and complaint.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::profile::UserProfile;
use super::triage::is_medical_context;
use crate::session::console::{Console, InputEvent};

/// Result of running the intake questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Completed(UserProfile),
    /// The user pressed Ctrl-C or closed input before finishing.
    Interrupted,
}

/// Asks for name, complaint and, when triage flags it, extra detail.
///
/// Cancelling `cancel` ends the intake at the next or pending prompt.
pub async fn collect_profile(
    console: &mut dyn Console,
    cancel: &CancellationToken,
) -> IntakeOutcome {
    console.say("\nBefore we begin the consultation, I need a few details.");
    let Some(name) = ask(console, cancel, "What is your name? ").await else {
        return IntakeOutcome::Interrupted;
    };
    // Normalize early so the greeting uses the placeholder too.
    let name = UserProfile::new(&name, "", None).name;
    console.say(&format!("\nHello, {name}."));

    console.say("Please describe your symptoms or health concern in detail:");
    let Some(problem) = ask(console, cancel, "> ").await else {
        return IntakeOutcome::Interrupted;
    };

    let mut details = None;
    if is_medical_context(&problem) {
        debug!("Triage flagged complaint as medical, requesting details");
        console.say("\nI see. To help me assess this better, could you provide more specifics?");
        console.say("e.g., How long have you had this? Are there specific stages or prior diagnoses?");
        let Some(answer) = ask(console, cancel, "> ").await else {
            return IntakeOutcome::Interrupted;
        };
        details = Some(answer);
        console.say("\nThank you. Analyzing inputs...");
    } else {
        console.say("\nThank you. Analyzing...");
    }

    IntakeOutcome::Completed(UserProfile::new(name, problem, details))
}

async fn ask(
    console: &mut dyn Console,
    cancel: &CancellationToken,
    prompt: &str,
) -> Option<String> {
    let event = tokio::select! {
        biased;
        _ = cancel.cancelled() => InputEvent::Interrupted,
        event = console.read_line(prompt) => event,
    };

    match event {
        InputEvent::Line(line) => Some(line.trim().to_string()),
        InputEvent::Interrupted | InputEvent::Closed => None,
    }
}
