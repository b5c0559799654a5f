/// LLM Client — the single point of entry for all generative-AI calls in Assessor.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions MUST go through `LlmClient`, which layers retry and
/// response parsing over a `Transport`.
///
/// Model: gemini-2.0-flash-exp (hardcoded — do not make configurable to prevent drift)
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod parse;
pub mod profiles;
pub mod prompts;
pub mod retry;

#[cfg(test)]
pub mod testing;

pub use parse::parse_structured;
pub use profiles::{GenerationProfile, ProfileKind};
pub use retry::{retry_with_backoff, RetryPolicy};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// The model used for all generation calls.
pub const MODEL: &str = "gemini-2.0-flash-exp";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Why the upstream rejected a call. Decided in the transport, where the
/// status code is known, so callers never re-parse error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamReason {
    RateLimited,
    QuotaExhausted,
    Other,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI client configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API request failed (status {status}, {reason:?}): {body}")]
    Upstream {
        status: u16,
        reason: UpstreamReason,
        body: String,
    },

    #[error("Invalid response format from AI API: {0}")]
    MalformedResponse(String),

    #[error("Failed to parse AI response: {message}")]
    Parse { message: String, raw: String },
}

impl LlmError {
    /// Rate limiting and quota exhaustion are the only transient failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::Upstream {
                reason: UpstreamReason::RateLimited | UpstreamReason::QuotaExhausted,
                ..
            }
        )
    }

    pub fn parse(message: impl Into<String>, raw: impl Into<String>) -> Self {
        LlmError::Parse {
            message: message.into(),
            raw: raw.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// One single-turn generation request → raw text. Implement this to swap the
/// provider without touching the generators.
///
/// Carried inside `LlmClient` as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate_content(&self, prompt: &str, profile: ProfileKind)
        -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini transport
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }

    /// A missing key is reported, not fatal: calls still go out and fail upstream.
    pub fn validate(&self) -> Result<(), LlmError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(LlmError::Configuration(
                "GEMINI_API_KEY is not set; AI calls will be rejected upstream".to_string(),
            )),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            MODEL
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationProfile,
    safety_settings: &'static [SafetySetting],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const SAFETY_SETTINGS: &[SafetySetting] = &[
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
];

fn build_request(prompt: &str, profile: ProfileKind) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![RequestPart { text: prompt }],
        }],
        generation_config: profile.profile(),
        safety_settings: SAFETY_SETTINGS,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCandidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

fn classify_failure(status: u16, body: &str) -> UpstreamReason {
    if status == 429 {
        return UpstreamReason::RateLimited;
    }
    let lower = body.to_lowercase();
    if lower.contains("quota") || lower.contains("resource_exhausted") {
        UpstreamReason::QuotaExhausted
    } else {
        UpstreamReason::Other
    }
}

/// reqwest-backed Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    config: GeminiConfig,
}

impl GeminiTransport {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate_content(
        &self,
        prompt: &str,
        profile: ProfileKind,
    ) -> Result<String, LlmError> {
        let request_body = build_request(prompt, profile);
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let response = self
            .client
            .post(self.config.endpoint())
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = classify_failure(status.as_u16(), &body);
            warn!("AI API returned {status} ({reason:?}): {body}");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(format!("response is not JSON: {e}")))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "AI call succeeded: profile={profile}, prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        match parsed.text() {
            Some(text) => Ok(text.to_string()),
            None => {
                let finish_reason = parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "none".to_string());
                Err(LlmError::MalformedResponse(format!(
                    "no candidate text (finish reason: {finish_reason})"
                )))
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Facade
// ────────────────────────────────────────────────────────────────────────────

/// The single AI client used by all services.
/// Wraps a `Transport` with backoff and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Raw text generation, retried on rate limiting.
    pub async fn generate(&self, prompt: &str, profile: ProfileKind) -> Result<String, LlmError> {
        retry_with_backoff(self.retry, || self.transport.generate_content(prompt, profile)).await
    }

    /// Generates and deserializes the text as JSON. Parse failures are not
    /// retried; callers that want a fresh answer must call again.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        profile: ProfileKind,
    ) -> Result<T, LlmError> {
        let text = self.generate(prompt, profile).await?;
        parse_structured(&text)
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Router};
    use serde_json::{json, Value};

    use super::testing::FakeTransport;
    use super::*;

    async fn spawn_upstream(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().fallback(move || async move { (status, body) });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn transport_for(base_url: String) -> GeminiTransport {
        GeminiTransport::new(GeminiConfig::new(Some("test-key".to_string()), Some(base_url)))
            .unwrap()
    }

    #[test]
    fn test_request_carries_prompt_profile_and_safety_settings() {
        let value = serde_json::to_value(build_request("Hello", ProfileKind::TestGeneration)).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(value["generationConfig"]["topK"], 40);
        let settings = value["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s["threshold"] == "BLOCK_MEDIUM_AND_ABOVE"));
        assert!(settings
            .iter()
            .any(|s| s["category"] == "HARM_CATEGORY_DANGEROUS_CONTENT"));
    }

    #[test]
    fn test_missing_api_key_fails_validation() {
        let config = GeminiConfig::new(None, None);
        assert!(matches!(config.validate(), Err(LlmError::Configuration(_))));
        let blank = GeminiConfig::new(Some("   ".to_string()), None);
        assert!(blank.validate().is_err());
        assert!(GeminiConfig::new(Some("k".to_string()), None).validate().is_ok());
    }

    #[test]
    fn test_endpoint_includes_model() {
        let config = GeminiConfig::new(None, Some("http://localhost:9000/".to_string()));
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/models/gemini-2.0-flash-exp:generateContent"
        );
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(classify_failure(429, ""), UpstreamReason::RateLimited);
        assert_eq!(
            classify_failure(403, r#"{"error":{"message":"Quota exceeded for metric"}}"#),
            UpstreamReason::QuotaExhausted
        );
        assert_eq!(
            classify_failure(400, r#"{"error":{"message":"API key not valid"}}"#),
            UpstreamReason::Other
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{\"ok\":true}"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        }))
        .unwrap();
        assert_eq!(response.text(), Some("{\"ok\":true}"));

        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[tokio::test]
    async fn test_transport_returns_candidate_text() {
        let base = spawn_upstream(
            StatusCode::OK,
            r#"{"candidates":[{"content":{"parts":[{"text":"hello there"}]}}]}"#,
        )
        .await;
        let text = transport_for(base)
            .generate_content("hi", ProfileKind::QuickResponse)
            .await
            .unwrap();
        assert_eq!(text, "hello there");
    }

    #[tokio::test]
    async fn test_transport_maps_429_to_retryable_upstream_error() {
        let base = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
        let err = transport_for(base)
            .generate_content("hi", ProfileKind::QuickResponse)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        match err {
            LlmError::Upstream { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_non_throttle_failure_is_not_retryable() {
        let base = spawn_upstream(StatusCode::BAD_REQUEST, "API key not valid").await;
        let err = transport_for(base)
            .generate_content("hi", ProfileKind::QuickResponse)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::Upstream {
                status: 400,
                reason: UpstreamReason::Other,
                ..
            }
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_transport_success_without_text_is_malformed() {
        let base = spawn_upstream(StatusCode::OK, r#"{"candidates":[]}"#).await;
        let err = transport_for(base)
            .generate_content("hi", ProfileKind::QuickResponse)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_success_with_non_json_body_is_malformed() {
        let base = spawn_upstream(StatusCode::OK, "<html>gateway</html>").await;
        let err = transport_for(base)
            .generate_content("hi", ProfileKind::QuickResponse)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_json_retries_throttle_then_parses() {
        let fake = Arc::new(FakeTransport::new(vec![
            Err(FakeTransport::throttled()),
            Ok("```json\n{\"a\": 1}\n```".to_string()),
        ]));
        let llm = FakeTransport::client(fake.clone());
        let value: Value = llm
            .generate_json("prompt", ProfileKind::CandidateAnalysis)
            .await
            .unwrap();
        assert_eq!(value, json!({"a": 1}));
        assert_eq!(fake.call_count(), 2);
        assert_eq!(fake.profiles(), vec![ProfileKind::CandidateAnalysis; 2]);
    }

    #[tokio::test]
    async fn test_generate_json_does_not_retry_parse_failure() {
        let fake = Arc::new(FakeTransport::new(vec![
            Ok("not json".to_string()),
            Ok("{}".to_string()),
        ]));
        let llm = FakeTransport::client(fake.clone());
        let err = llm
            .generate_json::<Value>("prompt", ProfileKind::QuickResponse)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Parse { .. }));
        assert_eq!(fake.call_count(), 1);
    }
}
