//! Agent fan-out: both agents answer the question concurrently.
//!
//! The two calls share the timeout budget and retry policy. The first
//! failure ends the fan-out; the sibling future is dropped, which cancels its
//! outstanding request on a best-effort basis.

use arena_state::{AgentResult, AgentSlot};
use futures::future::try_join;
use tracing::{debug, warn};

use crate::client::{clean_output, invoke_with_policy, ModelClient, ModelReply};
use crate::config::PipelineConfig;
use crate::error::{ModelError, PipelineError};
use crate::prompts::agent_prompt;

/// Ask both agents. Succeeds only if both answers are usable.
pub async fn run_agents(
    client: &dyn ModelClient,
    config: &PipelineConfig,
    question: &str,
) -> Result<(AgentResult, AgentResult), PipelineError> {
    let a = run_agent(client, config, AgentSlot::AgentA, question);
    let b = run_agent(client, config, AgentSlot::AgentB, question);
    try_join(a, b).await
}

fn model_for(config: &PipelineConfig, slot: AgentSlot) -> &str {
    match slot {
        AgentSlot::AgentA => &config.agent_a_model,
        AgentSlot::AgentB => &config.agent_b_model,
    }
}

async fn run_agent(
    client: &dyn ModelClient,
    config: &PipelineConfig,
    slot: AgentSlot,
    question: &str,
) -> Result<AgentResult, PipelineError> {
    let model = model_for(config, slot);
    let prompt = agent_prompt(question);

    let outcome = invoke_with_policy(client, model, &prompt, config.call_timeout, &config.retry)
        .await
        .and_then(|reply| to_agent_result(model, reply));

    match outcome {
        Ok(result) => {
            debug!(agent = %slot, model = %model, chars = result.answer.len(), "agent answered");
            Ok(result)
        }
        Err(cause) => {
            warn!(agent = %slot, model = %model, error = %cause, "agent failed");
            Err(PipelineError::PartialAgentFailure {
                agent: slot,
                model: model.to_string(),
                cause,
            })
        }
    }
}

/// Clean a reply into an [`AgentResult`]. Empty answers are invalid.
pub fn to_agent_result(model: &str, reply: ModelReply) -> Result<AgentResult, ModelError> {
    let answer = clean_output(&reply.text);
    if answer.is_empty() {
        return Err(ModelError::invalid(model, "answer is empty after cleaning"));
    }
    let reasoning = reply
        .reasoning
        .as_deref()
        .map(clean_output)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| answer.clone());

    Ok(AgentResult {
        model: model.to_string(),
        answer,
        reasoning,
        raw_output: reply.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::fakes::ScriptedModelClient;
    use std::time::Duration;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
            .with_agents("model-a", "model-b")
            .with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn both_agents_answer() {
        let client = ScriptedModelClient::new()
            .reply("model-a", "4")
            .reply("model-b", "The answer is 4.</s>")
            .reasoning("model-b", "2 + 2 = 4");

        let (a, b) = run_agents(&client, &config(), "What is 2+2?").await.unwrap();
        assert_eq!(a.answer, "4");
        assert_eq!(a.reasoning, "4");
        assert_eq!(b.answer, "The answer is 4.");
        assert_eq!(b.reasoning, "2 + 2 = 4");
        assert_eq!(b.raw_output, "The answer is 4.</s>");
    }

    #[tokio::test]
    async fn failing_agent_is_named() {
        let client = ScriptedModelClient::new()
            .reply("model-a", "4")
            .fail("model-b", ModelError::unavailable("model-b", "HTTP 502"));

        let err = run_agents(&client, &config(), "q").await.unwrap_err();
        match err {
            PipelineError::PartialAgentFailure { agent, model, .. } => {
                assert_eq!(agent, AgentSlot::AgentB);
                assert_eq!(model, "model-b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_answer_is_invalid() {
        let client = ScriptedModelClient::new()
            .reply("model-a", "  </s> ")
            .reply("model-b", "ok");

        let err = run_agents(&client, &config(), "q").await.unwrap_err();
        match err {
            PipelineError::PartialAgentFailure { agent, cause, .. } => {
                assert_eq!(agent, AgentSlot::AgentA);
                assert_eq!(cause.kind(), "invalid_response");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn agents_run_concurrently() {
        let client = ScriptedModelClient::new()
            .reply("model-a", "a")
            .reply("model-b", "b")
            .delay("model-a", Duration::from_secs(10))
            .delay("model-b", Duration::from_secs(10));
        let cfg = config().with_timeout(Duration::from_secs(15));

        let started = tokio::time::Instant::now();
        run_agents(&client, &cfg, "q").await.unwrap();
        // Sequential calls would need 20s and blow the 15s budget.
        assert!(started.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn fast_failure_does_not_wait_for_sibling() {
        let client = ScriptedModelClient::new()
            .reply("model-a", "slow")
            .delay("model-a", Duration::from_secs(50))
            .fail("model-b", ModelError::unavailable("model-b", "down"));
        let cfg = config().with_timeout(Duration::from_secs(60));

        let started = tokio::time::Instant::now();
        let err = run_agents(&client, &cfg, "q").await.unwrap_err();
        assert!(matches!(err, PipelineError::PartialAgentFailure { agent: AgentSlot::AgentB, .. }));
        assert!(started.elapsed() < Duration::from_secs(50));
    }
}
