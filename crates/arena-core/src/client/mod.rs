//! Model client seam.
//!
//! Every model call in the pipeline goes through [`ModelClient`]. The
//! production implementation speaks the OpenAI-compatible chat completions
//! protocol ([`OpenRouterClient`]); tests use [`crate::fakes::ScriptedModelClient`].
//!
//! Implementations honor the `timeout` they are given as a request deadline;
//! call sites additionally wrap each invocation with [`invoke_with_policy`],
//! which enforces the same budget and applies the retry policy.

mod openrouter;

pub use openrouter::{parse_completion, OpenRouterClient};

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::ModelError;

/// A single chat prompt: optional system message plus the user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            user: text.into(),
        }
    }

    pub fn with_system(mut self, text: impl Into<String>) -> Self {
        self.system = Some(text.into());
        self
    }
}

/// Text returned by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReply {
    pub text: String,
    /// Separate reasoning channel, when the provider returns one.
    pub reasoning: Option<String>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reasoning: None,
        }
    }
}

/// Invokes a named model with a prompt. Implementations do not retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<ModelReply, ModelError>;
}

/// Call `model` with a per-attempt timeout and the bounded retry policy.
///
/// Every attempt gets the full `timeout`. The last error is returned when all
/// attempts fail.
pub async fn invoke_with_policy(
    client: &dyn ModelClient,
    model: &str,
    prompt: &Prompt,
    timeout: Duration,
    retry: &RetryPolicy,
) -> Result<ModelReply, ModelError> {
    let attempts = retry.attempts();
    let mut attempt = 1;
    loop {
        let call = client.invoke(model, prompt, timeout);
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::timeout(model, timeout)),
        };

        match outcome {
            Ok(reply) => {
                debug!(model = %model, attempt, "model call succeeded");
                return Ok(reply);
            }
            Err(err) if attempt < attempts => {
                warn!(
                    model = %model,
                    attempt,
                    attempts,
                    kind = err.kind(),
                    error = %err,
                    "model call failed, retrying"
                );
                if !retry.backoff.is_zero() {
                    tokio::time::sleep(retry.backoff).await;
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Strip stop tokens some models leak (`</s>`, `[/s>`) and trim whitespace.
pub fn clean_output(text: &str) -> String {
    text.replace("</s>", "").replace("[/s>", "").trim().to_string()
}
