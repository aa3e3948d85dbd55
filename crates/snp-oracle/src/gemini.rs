//! Gemini `generateContent` client
//!
//! Talks to Google's Generative Language REST API. One prompt becomes one
//! `POST {endpoint}/models/{model}:generateContent` request; the text parts
//! of the first candidate are concatenated into the answer.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OracleError;
use crate::{Oracle, Result};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Generative Language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini connection settings
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    pub api_key: String,
    /// Model identifier, e.g. `gemini-2.5-flash`
    pub model: String,
    /// API base URL without trailing `/models`
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Config for the default model and endpoint.
    pub fn new(api_key: &str) -> Self {
        GeminiConfig {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the `generateContent` method for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

// Keep the key out of logs.
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_prompt(prompt: &'a str) -> Self {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(OracleError::Blocked(reason));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            Err(OracleError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

/// Gemini client implementing [`Oracle`]
#[derive(Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("snpsim/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| OracleError::Setup(e.to_string()))?;

        Ok(GeminiClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn predict(&self, prompt: &str) -> Result<String> {
        let url = self.config.generate_url();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "sending generateContent");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&GenerateContentRequest::single_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent rejected");
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<String> {
        serde_json::from_str::<GenerateContentResponse>(raw)
            .unwrap()
            .into_text()
    }

    #[test]
    fn test_gemini_config_new() {
        let config = GeminiConfig::new("key-123");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_generate_url_strips_trailing_slash() {
        let config = GeminiConfig::new("k")
            .with_endpoint("http://localhost:8080/v1beta/")
            .with_model("gemini-test");
        assert_eq!(
            config.generate_url(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", GeminiConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::single_prompt("hi")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn test_response_parts_are_concatenated() {
        let text = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"Likely "},{"text":"missense."}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Likely missense.");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        assert!(matches!(parse(r#"{}"#), Err(OracleError::EmptyResponse)));
    }

    #[test]
    fn test_blocked_prompt_is_reported() {
        let err = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert!(matches!(err, OracleError::Blocked(reason) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_gracefully() {
        let config = GeminiConfig::new("k")
            .with_endpoint("http://127.0.0.1:9")
            .with_timeout(Duration::from_millis(500));
        let client = GeminiClient::new(config).unwrap();

        // Should return an error, not panic
        let result = client.predict("ping").await;
        assert!(result.is_err());
    }
}
