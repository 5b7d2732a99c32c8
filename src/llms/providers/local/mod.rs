//! Local model server provider.
//!
//! Talks to any server exposing the OpenAI-compatible Chat Completions
//! endpoint on localhost: `llama.cpp`'s `llama-server`, Ollama, LM Studio
//! and friends. Model files stay wherever the server loaded them; this
//! client only knows a base URL and a model name.
//!
//! # Features
//!
//! - Chat Completions request/response over `reqwest`
//! - Per-request timeout
//! - Retry with exponential backoff on transport errors, 429 and 5xx
//! - Blocking [`Generate`] bridge for worker threads

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::{ChatMessage, Generate, GenerationError};
use crate::utilities::truncate_chars;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default base URL (`llama-server` default port).
pub const LOCAL_DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 120.0;

/// Default retry count after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

// ---------------------------------------------------------------------------
// ModelEndpoint
// ---------------------------------------------------------------------------

/// Where a model is served and how to sample from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEndpoint {
    /// Base URL up to and including `/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name as the server knows it.
    pub model: String,
    /// Optional bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

fn default_base_url() -> String {
    LOCAL_DEFAULT_BASE_URL.to_string()
}

impl ModelEndpoint {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            model: model.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
            max_retries: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fill unset sampling parameters.
    pub fn or_sampling(mut self, max_tokens: u32, temperature: f64) -> Self {
        self.max_tokens.get_or_insert(max_tokens);
        self.temperature.get_or_insert(temperature);
        self
    }
}

// ---------------------------------------------------------------------------
// LocalModelBackend
// ---------------------------------------------------------------------------

/// Chat completion client for a locally served model.
#[derive(Debug, Clone)]
pub struct LocalModelBackend {
    endpoint: ModelEndpoint,
}

impl LocalModelBackend {
    pub fn new(endpoint: ModelEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &ModelEndpoint {
        &self.endpoint
    }

    /// Configured timeout, or [`DEFAULT_TIMEOUT_SECS`] when it is not a
    /// finite positive number of seconds.
    pub fn request_timeout(&self) -> Duration {
        match self.endpoint.timeout_secs {
            Some(secs) if secs.is_finite() && secs > 0.0 => {
                Duration::try_from_secs_f64(secs).unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
            }
            Some(secs) => {
                log::warn!("ignoring invalid timeout_secs {} for {}", secs, self.endpoint.model);
                Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)
            }
            None => Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.base_url.trim_end_matches('/'))
    }

    /// Request body for `messages`.
    pub fn build_request_body(&self, messages: &[ChatMessage]) -> Value {
        let mut body = serde_json::json!({
            "model": self.endpoint.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(max_tokens) = self.endpoint.max_tokens {
            body["max_tokens"] = Value::from(max_tokens);
        }
        if let Some(temperature) = self.endpoint.temperature {
            body["temperature"] = Value::from(temperature);
        }
        body
    }

    /// Extract the assistant text from a completion response.
    pub fn parse_response(response: &Value) -> Result<String, GenerationError> {
        if let Some(err) = response.get("error") {
            let msg = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown model server error");
            return Err(GenerationError::backend(msg));
        }
        response
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(|c| c.to_string())
            .ok_or_else(|| GenerationError::invalid_response("missing choices[0].message.content"))
    }

    /// Send one chat completion request.
    ///
    /// Transport errors, 429 and 5xx responses are retried with doubling
    /// delay starting at one second; other 4xx responses fail immediately.
    pub async fn acall(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        log::debug!(
            "LocalModelBackend.acall: model={}, messages={}",
            self.endpoint.model,
            messages.len(),
        );

        let body = self.build_request_body(messages);
        let url = self.completions_url();
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout())
            .build()?;

        let max_retries = self.endpoint.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        let mut last_error: Option<GenerationError> = None;
        let mut retry_delay = Duration::from_secs(1);

        for attempt in 0..=max_retries {
            if attempt > 0 {
                log::warn!("model server retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let mut request = client.post(&url).json(&body);
            if let Some(key) = &self.endpoint.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                last_error = Some(GenerationError::backend(format!("model server returned {}", status)));
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = Some(e.into());
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(GenerationError::backend(format!(
                    "model server error ({}): {}",
                    status,
                    truncate_chars(&text, 500)
                )));
            }

            let json: Value = serde_json::from_str(&text).map_err(|e| {
                GenerationError::invalid_response(format!(
                    "{} - body: {}",
                    e,
                    truncate_chars(&text, 500)
                ))
            })?;
            return Self::parse_response(&json);
        }

        Err(last_error.unwrap_or_else(|| GenerationError::backend("model call failed after all retries")))
    }
}

impl Generate for LocalModelBackend {
    /// Blocking call; drives [`LocalModelBackend::acall`] on a private
    /// current-thread runtime. Must not be called from inside an async task.
    fn generate(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.acall(messages))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn echo_router() -> Router {
        Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let last = body["messages"]
                    .as_array()
                    .and_then(|m| m.last())
                    .and_then(|m| m["content"].as_str())
                    .unwrap_or_default()
                    .to_string();
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": format!("{}|{}", body["model"].as_str().unwrap_or(""), last)}}]
                }))
            }),
        )
    }

    #[test]
    fn test_request_body() {
        let backend = LocalModelBackend::new(ModelEndpoint::new("tiny").or_sampling(512, 0.4));
        let body = backend.build_request_body(&[ChatMessage::user("hi")]);
        assert_eq!(body["model"], "tiny");
        assert_eq!(body["max_tokens"], 512);
        assert_eq!(body["temperature"], 0.4);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_or_sampling_keeps_explicit_values() {
        let mut endpoint = ModelEndpoint::new("m");
        endpoint.temperature = Some(0.1);
        let endpoint = endpoint.or_sampling(2048, 0.7);
        assert_eq!(endpoint.max_tokens, Some(2048));
        assert_eq!(endpoint.temperature, Some(0.1));
    }

    #[test]
    fn test_parse_response() {
        let ok = serde_json::json!({"choices": [{"message": {"content": "hello"}}]});
        assert_eq!(LocalModelBackend::parse_response(&ok).unwrap(), "hello");

        let err = serde_json::json!({"error": {"message": "no model loaded"}});
        assert!(LocalModelBackend::parse_response(&err)
            .unwrap_err()
            .to_string()
            .contains("no model loaded"));

        let bad = serde_json::json!({"choices": []});
        assert!(matches!(
            LocalModelBackend::parse_response(&bad),
            Err(GenerationError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_endpoint_deserializes_with_defaults() {
        let endpoint: ModelEndpoint = serde_json::from_str(r#"{"model": "qwen"}"#).unwrap();
        assert_eq!(endpoint.base_url, LOCAL_DEFAULT_BASE_URL);
        assert_eq!(endpoint.max_tokens, None);
    }

    #[tokio::test]
    async fn test_acall_against_local_server() {
        let base_url = serve(echo_router()).await;
        let backend = LocalModelBackend::new(ModelEndpoint::new("tiny").with_base_url(base_url));
        let out = backend
            .acall(&[ChatMessage::system("s"), ChatMessage::user("ping")])
            .await
            .unwrap();
        assert_eq!(out, "tiny|ping");
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::BAD_REQUEST, "bad model") }),
        );
        let base_url = serve(router).await;
        let backend = LocalModelBackend::new(ModelEndpoint::new("tiny").with_base_url(base_url));
        let err = backend.acall(&[ChatMessage::user("x")]).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("400"));
        assert!(text.contains("bad model"));
    }

    #[tokio::test]
    async fn test_server_error_without_retries() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base_url = serve(router).await;
        let mut endpoint = ModelEndpoint::new("tiny").with_base_url(base_url);
        endpoint.max_retries = Some(0);
        let err = LocalModelBackend::new(endpoint)
            .acall(&[ChatMessage::user("x")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_invalid_timeout_falls_back_to_default() {
        let default = Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS);
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let mut endpoint = ModelEndpoint::new("tiny");
            endpoint.timeout_secs = Some(bad);
            assert_eq!(LocalModelBackend::new(endpoint).request_timeout(), default);
        }
        let mut endpoint = ModelEndpoint::new("tiny");
        endpoint.timeout_secs = Some(2.5);
        assert_eq!(
            LocalModelBackend::new(endpoint).request_timeout(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_blocking_generate_with_negative_timeout() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let base_url = rt.block_on(serve(echo_router()));
        let mut endpoint = ModelEndpoint::new("tiny").with_base_url(base_url);
        endpoint.timeout_secs = Some(-1.0);
        endpoint.max_retries = Some(0);
        let backend = LocalModelBackend::new(endpoint);
        assert_eq!(backend.generate(&[ChatMessage::user("still works")]).unwrap(), "tiny|still works");
    }

    #[test]
    fn test_blocking_generate() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let base_url = rt.block_on(serve(echo_router()));
        let backend = LocalModelBackend::new(ModelEndpoint::new("tiny").with_base_url(base_url));
        assert_eq!(backend.generate(&[ChatMessage::user("sync")]).unwrap(), "tiny|sync");
    }
}
