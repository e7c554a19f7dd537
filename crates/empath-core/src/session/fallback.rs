//! Ordered, first-success model fallback used to open the consultation.

use tracing::{info, warn};

use super::backend::{ChatBackend, ChatSession, ModelListing};
use crate::error::{EmpathError, Result};

/// A session that accepted the persona prompt.
pub struct EstablishedSession {
    pub session: Box<dyn ChatSession>,
    pub model_id: String,
    /// The model's answer to the persona prompt.
    pub initial_reply: String,
}

impl std::fmt::Debug for EstablishedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstablishedSession")
            .field("model_id", &self.model_id)
            .field("initial_reply", &self.initial_reply)
            .finish_non_exhaustive()
    }
}

/// Tries candidate models in priority order until one answers.
///
/// There is no per-candidate retry: each model gets exactly one attempt.
#[derive(Debug, Clone)]
pub struct ModelFallbackSelector {
    candidates: Vec<String>,
}

impl ModelFallbackSelector {
    pub fn new(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    /// Opens a session on the first candidate that answers `prompt_text`.
    ///
    /// When every candidate fails, the remote model listing is fetched once
    /// for diagnostics and `NoModelAvailable` is returned regardless of
    /// whether the listing succeeded.
    pub async fn establish_session(
        &self,
        backend: &dyn ChatBackend,
        prompt_text: &str,
    ) -> Result<EstablishedSession> {
        let mut last_error = String::from("no candidate models configured");

        for model_id in &self.candidates {
            match Self::try_candidate(backend, model_id, prompt_text).await {
                Ok(established) => {
                    info!("Consultation established on model '{}'", model_id);
                    return Ok(established);
                }
                Err(err) => {
                    warn!("Candidate model failed: {}", err);
                    last_error = err.detail();
                }
            }
        }

        let listing = Self::list_available_models(backend).await;
        Err(EmpathError::NoModelAvailable {
            last_error,
            listing,
        })
    }

    async fn try_candidate(
        backend: &dyn ChatBackend,
        model_id: &str,
        prompt_text: &str,
    ) -> Result<EstablishedSession> {
        let mut session = backend
            .start_chat(model_id)
            .await
            .map_err(|e| EmpathError::model_unavailable(model_id, e.detail()))?;

        let reply = session
            .send_message(prompt_text)
            .await
            .map_err(|e| EmpathError::model_unavailable(model_id, e.detail()))?;

        if reply.trim().is_empty() {
            return Err(EmpathError::model_unavailable(
                model_id,
                "model returned an empty response",
            ));
        }

        Ok(EstablishedSession {
            session,
            model_id: model_id.to_string(),
            initial_reply: reply,
        })
    }

    async fn list_available_models(backend: &dyn ChatBackend) -> ModelListing {
        match backend.list_models().await {
            Ok(models) => ModelListing::Available(
                models
                    .into_iter()
                    .filter(|model| model.supports_chat())
                    .map(|model| model.name)
                    .collect(),
            ),
            Err(err) => {
                warn!("Model listing failed: {}", err);
                ModelListing::Unavailable(err.detail())
            }
        }
    }
}
