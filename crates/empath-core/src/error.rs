//! Error types for the Empath application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::ModelListing;

/// A shared error type for the entire Empath application.
///
/// Every remote-call failure is converted into one of these variants at the
/// call site, so the binary can always finish with an explanatory message.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum EmpathError {
    /// Credential missing, rejected or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single candidate model failed to initialize or answer.
    #[error("Model '{model}' unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// Every candidate model failed.
    #[error("Could not connect to any model. Last error: {last_error}")]
    NoModelAvailable {
        last_error: String,
        listing: ModelListing,
    },

    /// A send on an established session failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// IO error (file system or terminal operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },
}

impl EmpathError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a ModelUnavailable error
    pub fn model_unavailable(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a single-model failure
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. })
    }

    /// Check if every candidate model failed
    pub fn is_no_model_available(&self) -> bool {
        matches!(self, Self::NoModelAvailable { .. })
    }

    /// Check if this is a transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns the human-readable detail without the variant prefix.
    ///
    /// Used when a failure is folded into another error (e.g. the last error
    /// carried by `NoModelAvailable`).
    pub fn detail(&self) -> String {
        match self {
            Self::Config(message) | Self::Transport(message) => message.clone(),
            Self::ModelUnavailable { message, .. } => message.clone(),
            Self::Io { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for EmpathError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for EmpathError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for EmpathError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, EmpathError>`.
pub type Result<T> = std::result::Result<T, EmpathError>;
