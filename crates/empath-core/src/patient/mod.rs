//! Patient-facing domain: profile intake, keyword triage and the persona prompt.

pub mod intake;
pub mod profile;
pub mod prompt;
pub mod triage;

pub use intake::{IntakeOutcome, collect_profile};
pub use profile::{DEFAULT_PATIENT_NAME, UserProfile};
pub use prompt::build_persona_prompt;
pub use triage::{MEDICAL_KEYWORDS, is_medical_context};
