//! Google Gemini `generateContent` client.
//!
//! A single-turn text call: one user message in, the first candidate's text
//! out. Non-2xx responses (bad key, exhausted quota, unknown model) become
//! [`GenerationError::Api`] carrying Gemini's own error message.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{GenerationError, TextGenerator};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without a trailing slash, e.g. [`DEFAULT_BASE_URL`].
    pub base_url: String,
    /// Whole-request timeout. A slow generation fails after this long.
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
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
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`TextGenerator`] backed by the Gemini REST API.
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Concatenate the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(GenerationError::EmptyResponse)
        } else {
            Ok(text)
        }
    }

    fn api_error(status: u16, body: &str) -> GenerationError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| body.trim().to_owned());
        GenerationError::Api { status, message }
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        debug!(model = %self.config.model, "sending generateContent request");
        let response = self
            .http
            .post(self.config.endpoint())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(model = %self.config.model, status = %status, "Gemini API error");
            return Err(Self::api_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Decode(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: err.message,
            });
        }

        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    /// Stub Gemini: answers per model name, echoing the prompt for `echo`.
    async fn stub_generate(
        Path(model_call): Path<String>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> axum::response::Response {
        if headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({"error": {"code": 403, "message": "API key not valid."}})),
            )
                .into_response();
        }

        match model_call.as_str() {
            "echo:generateContent" => {
                let prompt = body["contents"][0]["parts"][0]["text"].clone();
                Json(serde_json::json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "echo: "}, {"text": prompt}]},
                        "finishReason": "STOP"
                    }]
                }))
                .into_response()
            }
            "quota:generateContent" => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({"error": {"code": 429, "message": "Resource has been exhausted"}})),
            )
                .into_response(),
            "empty:generateContent" => Json(serde_json::json!({"candidates": []})).into_response(),
            "garbled:generateContent" => {
                (StatusCode::OK, "<html>upstream proxy page</html>").into_response()
            }
            _ => (StatusCode::NOT_FOUND, "no such model").into_response(),
        }
    }

    async fn spawn_stub() -> SocketAddr {
        let app = Router::new().route("/v1beta/models/{model_call}", post(stub_generate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, key: &str, model: &str) -> GeminiClient {
        let config = GeminiConfig::new(key)
            .with_model(model)
            .with_base_url(format!("http://{addr}/v1beta/"))
            .with_timeout(Duration::from_secs(5));
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn endpoint_and_redacted_debug() {
        let config = GeminiConfig::new("super-secret").with_base_url("https://example.com/v1/");
        assert_eq!(
            config.endpoint(),
            "https://example.com/v1/models/gemini-2.5-flash:generateContent"
        );
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let addr = spawn_stub().await;
        let text = client(addr, "test-key", "echo")
            .generate("build me a plan")
            .await
            .unwrap();
        assert_eq!(text, "echo: build me a plan");
    }

    #[tokio::test]
    async fn bad_key_maps_to_api_error() {
        let addr = spawn_stub().await;
        let err = client(addr, "wrong", "echo")
            .generate("hi")
            .await
            .unwrap_err();
        match err {
            GenerationError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn quota_maps_to_api_error() {
        let addr = spawn_stub().await;
        let err = client(addr, "test-key", "quota")
            .generate("hi")
            .await
            .unwrap_err();
        assert!(
            matches!(err, GenerationError::Api { status: 429, ref message } if message.contains("exhausted")),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn no_candidates_is_empty_response() {
        let addr = spawn_stub().await;
        let err = client(addr, "test-key", "empty")
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse), "got {err:?}");
    }

    #[tokio::test]
    async fn non_json_success_body_is_decode_error() {
        let addr = spawn_stub().await;
        let err = client(addr, "test-key", "garbled")
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)), "got {err:?}");
        assert!(err.to_string().starts_with("AI service response could not be decoded"));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(addr, "test-key", "echo")
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)), "got {err:?}");
    }
}
