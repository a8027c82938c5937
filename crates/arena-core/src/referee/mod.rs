//! Referee stage: one evaluation call over both answers, then a strict parse.

pub mod verdict;

pub use verdict::{fallback_choice, parse_verdict, ParsedVerdict, VerdictParse};

use arena_state::{AgentResult, RefereeResult};
use tracing::{debug, warn};

use crate::client::{clean_output, invoke_with_policy, ModelClient};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::prompts::referee_prompt;

/// Ask the referee to score both answers and pick one.
///
/// Client failures are [`PipelineError::RefereeUnavailable`]; output that does
/// not parse into a complete verdict is [`PipelineError::MalformedVerdict`].
pub async fn run_referee(
    client: &dyn ModelClient,
    config: &PipelineConfig,
    question: &str,
    agent_a: &AgentResult,
    agent_b: &AgentResult,
) -> Result<RefereeResult, PipelineError> {
    let model = config.referee_model.as_str();
    let prompt = referee_prompt(question, agent_a, agent_b);

    let reply = invoke_with_policy(client, model, &prompt, config.call_timeout, &config.retry)
        .await
        .map_err(|cause| {
            warn!(model = %model, error = %cause, "referee call failed");
            PipelineError::RefereeUnavailable {
                model: model.to_string(),
                cause,
            }
        })?;

    let verdict = match parse_verdict(&reply.text) {
        VerdictParse::Valid(verdict) => verdict,
        VerdictParse::Invalid(reason) => {
            warn!(model = %model, reason = %reason, "referee verdict rejected");
            return Err(PipelineError::MalformedVerdict {
                model: model.to_string(),
                reason,
            });
        }
    };

    debug!(
        model = %model,
        chosen = %verdict.chosen_agent,
        decision = ?verdict.decision,
        "referee verdict accepted"
    );

    Ok(RefereeResult {
        model: model.to_string(),
        chosen_agent: verdict.chosen_agent,
        scores: verdict.scorecard.for_slot(verdict.chosen_agent),
        scorecard: verdict.scorecard,
        decision: verdict.decision,
        critique: clean_output(&verdict.critique),
        raw_output: reply.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::error::ModelError;
    use crate::fakes::ScriptedModelClient;
    use arena_state::{AgentSlot, VerdictDecision};

    fn answer(text: &str) -> AgentResult {
        AgentResult {
            model: "m".to_string(),
            answer: text.to_string(),
            reasoning: text.to_string(),
            raw_output: text.to_string(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
            .with_referee("ref")
            .with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn chosen_scores_match_chosen_agent() {
        let client = ScriptedModelClient::new().reply(
            "ref",
            r#"{"agent_a": {"correctness": 3, "clarity": 3, "usefulness": 3},
                "agent_b": {"correctness": 9, "clarity": 8, "usefulness": 7},
                "chosen_agent": "agent_b", "critique": "B is right.</s>"}"#,
        );

        let result = run_referee(&client, &config(), "q", &answer("5"), &answer("4"))
            .await
            .unwrap();
        assert_eq!(result.chosen_agent, AgentSlot::AgentB);
        assert_eq!(result.scores, result.scorecard.agent_b);
        assert_eq!(result.decision, VerdictDecision::Explicit);
        assert_eq!(result.critique, "B is right.");
        assert!(result.raw_output.contains("</s>"));
    }

    #[tokio::test]
    async fn malformed_output_is_rejected() {
        let client = ScriptedModelClient::new().reply("ref", "Both look fine to me.");
        let err = run_referee(&client, &config(), "q", &answer("a"), &answer("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedVerdict { .. }));
    }

    #[tokio::test]
    async fn unavailable_referee_is_fatal() {
        let client =
            ScriptedModelClient::new().fail("ref", ModelError::unavailable("ref", "HTTP 500"));
        let err = run_referee(&client, &config(), "q", &answer("a"), &answer("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::RefereeUnavailable { .. }));
    }

    #[tokio::test]
    async fn empty_referee_payload_is_unavailable_not_malformed() {
        let client = ScriptedModelClient::new().fail(
            "ref",
            ModelError::invalid("ref", "completion has reasoning but no content"),
        );
        let err = run_referee(&client, &config(), "q", &answer("a"), &answer("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::RefereeUnavailable { .. }));
    }
}
