//! GeminiApiBackend - Direct REST API implementation for Gemini.
//!
//! The REST API is stateless, so each `GeminiChatSession` keeps the
//! conversation history itself and resends it with every turn.

use async_trait::async_trait;
use empath_core::error::{EmpathError, Result};
use empath_core::session::{ChatBackend, ChatSession, ModelInfo};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const LIST_PAGE_SIZE: &str = "1000";
const MAX_LIST_PAGES: usize = 50;

/// Backend that talks to the Gemini HTTP API.
///
/// Constructing one is the "configure" step: the credential is validated
/// locally and attached to every request.
#[derive(Clone)]
pub struct GeminiApiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiApiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiApiBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiApiBackend {
    /// Creates a backend with the provided API key.
    ///
    /// Fails with a configuration error when the key is blank or malformed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        validate_api_key(&api_key)?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL (e.g. a proxy or a regional endpoint).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Applies a client-side timeout to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmpathError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    /// Creates a session bound to `model_id` with empty history.
    ///
    /// No request is made; an unknown model surfaces on the first send.
    pub fn session(&self, model_id: &str) -> Result<GeminiChatSession> {
        let model = normalize_model_id(model_id);
        if model.is_empty() {
            return Err(EmpathError::model_unavailable(model_id, "empty model identifier"));
        }

        Ok(GeminiChatSession {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            history: Vec::new(),
        })
    }

    async fn fetch_model_page(&self, page_token: Option<&str>) -> Result<ListModelsResponse> {
        let mut query = vec![("pageSize", LIST_PAGE_SIZE)];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .query(&query)
            .send()
            .await
            .map_err(|err| {
                EmpathError::transport(format!("Gemini model listing failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        response.json().await.map_err(|err| {
            EmpathError::transport(format!("Failed to parse Gemini model list: {err}"))
        })
    }
}

#[async_trait]
impl ChatBackend for GeminiApiBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        for _ in 0..MAX_LIST_PAGES {
            let page = self.fetch_model_page(page_token.as_deref()).await?;
            models.extend(page.models.into_iter().map(|model| ModelInfo {
                name: model.name,
                supported_methods: model.supported_generation_methods,
            }));

            let Some(token) = page.next_page_token.filter(|token| !token.is_empty()) else {
                tracing::debug!("Gemini reported {} model(s)", models.len());
                return Ok(models);
            };
            if !seen_tokens.insert(token.clone()) {
                return Err(EmpathError::transport(format!(
                    "Gemini model listing repeated page token '{token}'"
                )));
            }
            page_token = Some(token);
        }

        Err(EmpathError::transport(format!(
            "Gemini model listing exceeded {MAX_LIST_PAGES} pages"
        )))
    }

    async fn start_chat(&self, model_id: &str) -> Result<Box<dyn ChatSession>> {
        Ok(Box::new(self.session(model_id)?))
    }
}

/// A multi-turn conversation with one Gemini model.
pub struct GeminiChatSession {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    history: Vec<Content>,
}

impl GeminiChatSession {
    /// Number of turns (user and model) held in the history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    async fn send_request(&self, body: &GenerateContentRequest<'_>) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| EmpathError::transport(format!("Gemini API request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            EmpathError::transport(format!("Failed to parse Gemini response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn send_message(&mut self, text: &str) -> Result<String> {
        self.history.push(Content::text("user", text));

        let result = self
            .send_request(&GenerateContentRequest {
                contents: &self.history,
            })
            .await;

        match result {
            Ok(reply) => {
                self.history.push(Content::text("model", &reply));
                Ok(reply)
            }
            Err(err) => {
                // Keep history consistent with what the model has actually answered.
                self.history.pop();
                Err(err)
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelResponse>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelResponse {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.trim().is_empty() {
        return Err(EmpathError::config("Gemini API key is empty"));
    }
    if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(EmpathError::config(
            "Gemini API key must not contain whitespace",
        ));
    }
    Ok(())
}

/// Accepts both `gemini-pro` and the listing form `models/gemini-pro`.
fn normalize_model_id(model_id: &str) -> &str {
    let trimmed = model_id.trim();
    trimmed.strip_prefix("models/").unwrap_or(trimmed)
}

/// Concatenates the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text: Option<String> = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .filter(|text: &String| !text.is_empty());

    text.ok_or_else(|| {
        match response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            Some(reason) => {
                EmpathError::transport(format!("Gemini API blocked the prompt: {reason}"))
            }
            None => EmpathError::transport("Gemini API returned no text in the response candidates"),
        }
    })
}

fn map_http_error(status: StatusCode, body: &str) -> EmpathError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    EmpathError::transport(format!("HTTP {}: {}", status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_blank_key_is_config_error() {
        assert!(GeminiApiBackend::new("").unwrap_err().is_config());
        assert!(GeminiApiBackend::new("   ").unwrap_err().is_config());
        assert!(GeminiApiBackend::new("abc def").unwrap_err().is_config());
        assert!(GeminiApiBackend::new("AIza-valid_key").is_ok());
    }

    #[test]
    fn test_debug_hides_key() {
        let backend = GeminiApiBackend::new("secret-key").unwrap();
        assert!(!format!("{backend:?}").contains("secret-key"));
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let backend = GeminiApiBackend::new("k")
            .unwrap()
            .with_base_url("http://localhost:8080/v1beta/");
        assert_eq!(backend.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn test_normalize_model_id() {
        assert_eq!(normalize_model_id("gemini-pro"), "gemini-pro");
        assert_eq!(normalize_model_id("models/gemini-1.5-pro"), "gemini-1.5-pro");
        assert_eq!(normalize_model_id("  "), "");
    }

    #[tokio::test]
    async fn test_start_chat_has_empty_history() {
        let backend = GeminiApiBackend::new("k").unwrap();
        let session = backend.start_chat("models/gemini-2.0-flash").await.unwrap();
        assert_eq!(session.model_id(), "gemini-2.0-flash");

        let err = backend.start_chat("").await.err().unwrap();
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn test_request_serialization() {
        let history = vec![Content::text("user", "hi"), Content::text("model", "hello")];
        let json = serde_json::to_value(GenerateContentRequest { contents: &history }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [
                    { "role": "user", "parts": [{ "text": "hi" }] },
                    { "role": "model", "parts": [{ "text": "hello" }] }
                ]
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"Alex."}]}}]}"#,
        );
        assert_eq!(extract_text_response(response).unwrap(), "Hello Alex.");
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let err = extract_text_response(parse(r#"{}"#)).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("no text"));
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let err = extract_text_response(parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#))
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_map_http_error_uses_google_envelope() {
        let body = r#"{"error":{"code":404,"message":"models/gemini-pro is not found","status":"NOT_FOUND"}}"#;
        let err = map_http_error(StatusCode::NOT_FOUND, body);
        assert_eq!(
            err.detail(),
            "HTTP 404: NOT_FOUND: models/gemini-pro is not found"
        );
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.detail(), "HTTP 502: upstream down");
    }

    #[test]
    fn test_list_models_response_parsing() {
        let page: ListModelsResponse = serde_json::from_str(
            r#"{
                "models": [
                    {"name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                    {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]}
                ],
                "nextPageToken": "abc"
            }"#,
        )
        .unwrap();

        assert_eq!(page.models.len(), 2);
        assert_eq!(page.models[0].name, "models/gemini-2.0-flash");
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }
}
