//! Configuration models for `config.toml` and `secret.json`.

use serde::{Deserialize, Serialize};

/// Candidate models tried in order when no override is configured.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

pub const DEFAULT_TYPING_DELAY_MS: u64 = 20;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Secret configuration loaded from `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Preferred model, tried ahead of the candidate list.
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Root of `config.toml`. Every section is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub models: ModelsConfig,
    pub console: ConsoleConfig,
    pub logging: LoggingConfig,
    pub api: ApiConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelsConfig {
    pub candidates: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|model| model.to_string())
                .collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Delay between rendered characters of a reply.
    pub typing_delay_ms: u64,
    pub clear_screen: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            clear_screen: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Client-side request timeout. `None` leaves timeouts to the transport.
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Returns the ordered candidate list, with `preferred` moved to the front.
    ///
    /// Duplicates and blank entries are dropped, keeping first occurrence.
    pub fn candidate_models(&self, preferred: Option<&str>) -> Vec<String> {
        let mut ordered: Vec<String> = Vec::new();
        let preferred = preferred.map(str::trim).filter(|model| !model.is_empty());

        for model in preferred
            .into_iter()
            .chain(self.models.candidates.iter().map(|m| m.trim()))
        {
            if !model.is_empty() && !ordered.iter().any(|existing| existing == model) {
                ordered.push(model.to_string());
            }
        }

        ordered
    }
}
