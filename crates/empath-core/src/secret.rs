//! Secret management service trait.
//!
//! Defines the interface for loading the API credential.

use crate::config::SecretConfig;
use crate::error::{EmpathError, Result};

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations must never log the key or embed it in error messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}

/// Resolves the Gemini credential.
///
/// A non-blank `env_override` wins over the file. Returns the key and the
/// optional preferred model from `secret.json`.
pub fn resolve_gemini_credential(
    secrets: &SecretConfig,
    env_override: Option<String>,
) -> Result<(String, Option<String>)> {
    let preferred_model = secrets
        .gemini
        .as_ref()
        .and_then(|gemini| gemini.model_name.clone());

    if let Some(key) = env_override.filter(|key| !key.trim().is_empty()) {
        return Ok((key.trim().to_string(), preferred_model));
    }

    match &secrets.gemini {
        Some(gemini) if !gemini.api_key.trim().is_empty() => {
            Ok((gemini.api_key.trim().to_string(), preferred_model))
        }
        Some(_) => Err(EmpathError::config("Gemini API key in secret.json is empty")),
        None => Err(EmpathError::config(
            "Gemini configuration not found in secret.json",
        )),
    }
}
