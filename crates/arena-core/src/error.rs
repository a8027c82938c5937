//! Error taxonomy for the answer pipeline.

use std::time::Duration;

use arena_state::{AgentSlot, StorageError};
use serde::{Deserialize, Serialize};

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Agents,
    Referee,
    Enhancer,
    Persist,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Agents => "agents",
            PipelineStage::Referee => "referee",
            PipelineStage::Enhancer => "enhancer",
            PipelineStage::Persist => "persist",
        };
        write!(f, "{s}")
    }
}

/// Failure of a single model invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("model {model} unavailable: {detail}")]
    Unavailable { model: String, detail: String },

    #[error("model {model} timed out after {timeout_ms}ms")]
    Timeout { model: String, timeout_ms: u64 },

    #[error("model {model} returned an invalid response: {detail}")]
    InvalidResponse { model: String, detail: String },
}

impl ModelError {
    pub fn unavailable(model: &str, detail: impl Into<String>) -> Self {
        ModelError::Unavailable {
            model: model.to_string(),
            detail: detail.into(),
        }
    }

    pub fn timeout(model: &str, budget: Duration) -> Self {
        ModelError::Timeout {
            model: model.to_string(),
            timeout_ms: budget.as_millis() as u64,
        }
    }

    pub fn invalid(model: &str, detail: impl Into<String>) -> Self {
        ModelError::InvalidResponse {
            model: model.to_string(),
            detail: detail.into(),
        }
    }

    /// Model the failed call was addressed to.
    pub fn model(&self) -> &str {
        match self {
            ModelError::Unavailable { model, .. }
            | ModelError::Timeout { model, .. }
            | ModelError::InvalidResponse { model, .. } => model,
        }
    }

    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::Unavailable { .. } => "unavailable",
            ModelError::Timeout { .. } => "timeout",
            ModelError::InvalidResponse { .. } => "invalid_response",
        }
    }
}

/// Errors returned by the pipeline's external operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{agent} ({model}) failed: {cause}")]
    PartialAgentFailure {
        agent: AgentSlot,
        model: String,
        cause: ModelError,
    },

    #[error("referee ({model}) failed: {cause}")]
    RefereeUnavailable { model: String, cause: ModelError },

    #[error("referee ({model}) returned a malformed verdict: {reason}")]
    MalformedVerdict { model: String, reason: String },

    #[error("turn not found: {turn_id}")]
    TurnNotFound { turn_id: u64 },

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("invalid turn state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TurnNotFound { turn_id } => PipelineError::TurnNotFound { turn_id },
            other => PipelineError::Storage(other),
        }
    }
}

impl PipelineError {
    /// Stage that failed, for errors raised while a turn was running.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::PartialAgentFailure { .. } => Some(PipelineStage::Agents),
            PipelineError::RefereeUnavailable { .. } | PipelineError::MalformedVerdict { .. } => {
                Some(PipelineStage::Referee)
            }
            PipelineError::Storage(_) => Some(PipelineStage::Persist),
            _ => None,
        }
    }

    /// Whether submitting the same question again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::PartialAgentFailure { .. }
                | PipelineError::RefereeUnavailable { .. }
                | PipelineError::MalformedVerdict { .. }
                | PipelineError::Storage(_)
        )
    }

    /// Message suitable for an end user; hides the internal taxonomy.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::EmptyQuestion => "Please enter a question.".to_string(),
            PipelineError::TurnNotFound { turn_id } => {
                format!("Turn {turn_id} does not exist.")
            }
            PipelineError::InvalidConfig(_) | PipelineError::InvalidTransition { .. } => {
                "The service is misconfigured.".to_string()
            }
            _ => "We couldn't produce an answer this time. Please try again.".to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_turn_not_found() {
        let err: PipelineError = StorageError::TurnNotFound { turn_id: 7 }.into();
        assert!(matches!(err, PipelineError::TurnNotFound { turn_id: 7 }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn partial_agent_failure_names_stage_and_agent() {
        let err = PipelineError::PartialAgentFailure {
            agent: AgentSlot::AgentB,
            model: "m-b".to_string(),
            cause: ModelError::timeout("m-b", Duration::from_secs(2)),
        };
        assert_eq!(err.stage(), Some(PipelineStage::Agents));
        assert!(err.is_retryable());
        let text = err.to_string();
        assert!(text.contains("agent_b"));
        assert!(text.contains("2000ms"));
    }

    #[test]
    fn user_message_hides_taxonomy() {
        let err = PipelineError::MalformedVerdict {
            model: "ref".to_string(),
            reason: "missing clarity".to_string(),
        };
        assert!(!err.user_message().contains("clarity"));
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn model_error_accessors() {
        let err = ModelError::unavailable("m", "HTTP 503");
        assert_eq!(err.model(), "m");
        assert_eq!(err.kind(), "unavailable");
    }
}
