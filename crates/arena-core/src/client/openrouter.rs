//! OpenAI-compatible chat completions client (OpenRouter by default).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{ModelClient, ModelReply, Prompt};
use crate::config::ProviderConfig;
use crate::error::{ModelError, PipelineError};

/// Longest slice of an error body carried into a `ModelError`.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for `{base_url}/chat/completions`.
pub struct OpenRouterClient {
    config: ProviderConfig,
    http_client: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: ProviderConfig) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("answer-arena/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::InvalidConfig(format!("http client: {e}")))?;

        Ok(OpenRouterClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables (see [`ProviderConfig::from_env`]).
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::new(ProviderConfig::from_env())
    }

    fn request_body(model: &str, prompt: &Prompt) -> Value {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        messages.push(json!({"role": "user", "content": prompt.user}));
        json!({
            "model": model,
            "messages": messages,
        })
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn invoke(
        &self,
        model: &str,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<ModelReply, ModelError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::unavailable(model, "OPENROUTER_API_KEY is not set"))?;

        let mut request = self
            .http_client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .timeout(timeout)
            .header("X-Title", &self.config.app_title)
            .json(&Self::request_body(model, prompt));
        if let Some(referer) = &self.config.referer {
            request = request.header("HTTP-Referer", referer);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::timeout(model, timeout)
            } else {
                ModelError::unavailable(model, e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::unavailable(model, format!("reading body: {e}")))?;

        if !status.is_success() {
            return Err(ModelError::unavailable(
                model,
                format!("HTTP {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        debug!(model = %model, bytes = body.len(), "completion received");
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ModelError::invalid(model, format!("body is not JSON: {e}")))?;
        parse_completion(model, &value)
    }
}

/// Extract the reply from a chat completions response body.
///
/// Reads `choices[0].message.content`, falling back to `choices[0].delta.content`.
/// A separate `reasoning` string is kept when present, but content is required:
/// a reasoning-only reply is an invalid response, as is an HTTP 200 carrying
/// an `error` object.
pub fn parse_completion(model: &str, body: &Value) -> Result<ModelReply, ModelError> {
    if let Some(error) = body.get("error") {
        let detail = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ModelError::invalid(model, detail));
    }

    let choice = body
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ModelError::invalid(model, "response has no choices"))?;

    let message = choice
        .get("message")
        .or_else(|| choice.get("delta"))
        .ok_or_else(|| ModelError::invalid(model, "choice has no message"))?;

    let text = match message.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => {
            return Err(ModelError::invalid(
                model,
                format!("unexpected content type: {other}"),
            ))
        }
    };

    let reasoning = message
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    if text.trim().is_empty() {
        let detail = if reasoning.is_some() {
            "completion has reasoning but no content"
        } else {
            "empty completion"
        };
        return Err(ModelError::invalid(model, detail));
    }

    Ok(ModelReply { text, reasoning })
}

fn truncate(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
