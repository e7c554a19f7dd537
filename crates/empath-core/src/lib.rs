pub mod config;
pub mod error;
pub mod patient;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::{EmpathError, Result};
pub use patient::{UserProfile, build_persona_prompt, is_medical_context};
pub use session::{
    ChatBackend, ChatSession, ConsultationLoop, ConsultationOutcome, EstablishedSession,
    ModelFallbackSelector,
};
