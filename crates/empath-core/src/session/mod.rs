//! Remote chat sessions: backend traits, model fallback and the consultation loop.

pub mod backend;
pub mod console;
pub mod consultation;
pub mod fallback;

pub use backend::{ChatBackend, ChatSession, GENERATE_CONTENT_METHOD, ModelInfo, ModelListing};
pub use console::{Console, InputEvent};
pub use consultation::{
    AI_LABEL, ConsultationLoop, ConsultationOutcome, FAREWELL_MESSAGE, INTERRUPTED_MESSAGE,
    is_termination_command,
};
pub use fallback::{EstablishedSession, ModelFallbackSelector};
