//! Traits describing the remote chat API consumed by the core.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Generation method a model must support to be usable for chat.
pub const GENERATE_CONTENT_METHOD: &str = "generateContent";

/// A model as reported by the remote listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub supported_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_chat(&self) -> bool {
        self.supported_methods
            .iter()
            .any(|method| method == GENERATE_CONTENT_METHOD)
    }
}

/// Outcome of the best-effort model listing run after every candidate failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelListing {
    /// Names of models that support `generateContent`.
    Available(Vec<String>),
    /// The listing itself failed; holds the plain-text reason.
    Unavailable(String),
}

/// Entry point to a hosted chat API, configured with a credential.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Lists models visible to the configured credential.
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    /// Creates a chat context bound to `model_id` with empty history.
    async fn start_chat(&self, model_id: &str) -> Result<Box<dyn ChatSession>>;
}

/// A live conversation with one model.
///
/// History is owned by the session; callers only send and receive text.
#[async_trait]
pub trait ChatSession: Send {
    fn model_id(&self) -> &str;

    /// Sends the next user message and returns the reply text.
    async fn send_message(&mut self, text: &str) -> Result<String>;
}
