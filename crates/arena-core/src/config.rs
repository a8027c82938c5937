//! Explicit configuration for the pipeline and the model provider.
//!
//! Nothing inside the pipeline stages reads the environment. The edges
//! (binaries, tests) build a [`PipelineConfig`] and a [`ProviderConfig`] and
//! hand them over at construction.

use std::time::Duration;

use crate::error::PipelineError;

/// Default OpenAI-compatible endpoint (OpenRouter).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Fixed, bounded retry policy applied at every model call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Pause between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Total attempts including the first.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Role-to-model mapping plus the call policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub agent_a_model: String,
    pub agent_b_model: String,
    pub referee_model: String,
    pub enhancer_model: String,
    /// Budget for each individual model call.
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            agent_a_model: "openai/gpt-4o-mini".to_string(),
            agent_b_model: "google/gemini-flash-1.5".to_string(),
            referee_model: "deepseek/deepseek-chat".to_string(),
            enhancer_model: "meta-llama/llama-3.1-8b-instruct:free".to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_agents(mut self, agent_a: impl Into<String>, agent_b: impl Into<String>) -> Self {
        self.agent_a_model = agent_a.into();
        self.agent_b_model = agent_b.into();
        self
    }

    pub fn with_referee(mut self, model: impl Into<String>) -> Self {
        self.referee_model = model.into();
        self
    }

    pub fn with_enhancer(mut self, model: impl Into<String>) -> Self {
        self.enhancer_model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let roles = [
            ("agent_a", &self.agent_a_model),
            ("agent_b", &self.agent_b_model),
            ("referee", &self.referee_model),
            ("enhancer", &self.enhancer_model),
        ];
        for (role, model) in roles {
            if model.trim().is_empty() {
                return Err(PipelineError::InvalidConfig(format!(
                    "{role} model must not be empty"
                )));
            }
        }
        if self.call_timeout.is_zero() {
            return Err(PipelineError::InvalidConfig(
                "call timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Endpoint and credentials for the OpenAI-compatible provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Sent as `HTTP-Referer` (OpenRouter app attribution).
    pub referer: Option<String>,
    /// Sent as `X-Title`.
    pub app_title: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            referer: Some("http://localhost".to_string()),
            app_title: "answer-arena".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - OPENROUTER_API_KEY (optional here; calls fail as unavailable without it)
    /// - OPENROUTER_BASE_URL (optional, default: OpenRouter)
    /// - ARENA_HTTP_REFERER (optional, default: "http://localhost")
    /// - ARENA_APP_TITLE (optional, default: "answer-arena")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENROUTER_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("OPENROUTER_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            referer: std::env::var("ARENA_HTTP_REFERER").ok().or(defaults.referer),
            app_title: std::env::var("ARENA_APP_TITLE").unwrap_or(defaults.app_title),
        }
    }

    /// `{base_url}/chat/completions` without a doubled slash.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_model_is_rejected() {
        let cfg = PipelineConfig::default().with_referee("  ");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("referee"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = PipelineConfig::default().with_timeout(Duration::ZERO);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn retry_attempts_include_first_call() {
        assert_eq!(RetryPolicy::none().attempts(), 1);
        assert_eq!(RetryPolicy::default().attempts(), 2);
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let cfg = ProviderConfig::new("http://localhost:8080/v1/");
        assert_eq!(cfg.completions_url(), "http://localhost:8080/v1/chat/completions");
    }
}
