//! Remote chat backends implementing the `empath-core` session traits.

pub mod gemini_api_backend;

pub use gemini_api_backend::{GeminiApiBackend, GeminiChatSession};
