use serde::{Deserialize, Serialize};

use super::prompt::build_persona_prompt;

/// Name used when the patient leaves the name prompt blank.
pub const DEFAULT_PATIENT_NAME: &str = "Patient";

/// Health context collected once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub problem: String,
    /// Follow-up detail, only present when triage asked for it and it was answered.
    pub extra_details: Option<String>,
}

impl UserProfile {
    /// Builds a profile, normalizing whitespace.
    ///
    /// A blank name becomes [`DEFAULT_PATIENT_NAME`]; blank details become `None`.
    pub fn new(
        name: impl AsRef<str>,
        problem: impl AsRef<str>,
        extra_details: Option<String>,
    ) -> Self {
        let name = name.as_ref().trim();
        let name = if name.is_empty() {
            DEFAULT_PATIENT_NAME.to_string()
        } else {
            name.to_string()
        };

        Self {
            name,
            problem: problem.as_ref().trim().to_string(),
            extra_details: extra_details
                .map(|details| details.trim().to_string())
                .filter(|details| !details.is_empty()),
        }
    }

    /// The persona-priming prompt for this patient.
    pub fn persona_prompt(&self) -> String {
        build_persona_prompt(&self.name, &self.problem, self.extra_details.as_deref())
    }
}
