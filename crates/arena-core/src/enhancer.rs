//! Enhancer stage: polish the chosen answer.
//!
//! This stage never fails the pipeline. A client error or an empty reply
//! keeps the chosen answer verbatim under the `"unenhanced"` model name.

use arena_state::{AgentResult, EnhancedAnswer, RefereeResult};
use tracing::{debug, warn};

use crate::client::{clean_output, invoke_with_policy, ModelClient};
use crate::config::PipelineConfig;
use crate::prompts::enhancer_prompt;

pub async fn run_enhancer(
    client: &dyn ModelClient,
    config: &PipelineConfig,
    question: &str,
    chosen: &AgentResult,
    referee: &RefereeResult,
) -> EnhancedAnswer {
    let model = config.enhancer_model.as_str();
    let prompt = enhancer_prompt(question, &chosen.answer, &referee.critique);

    match invoke_with_policy(client, model, &prompt, config.call_timeout, &config.retry).await {
        Ok(reply) => {
            let answer = clean_output(&reply.text);
            if answer.is_empty() {
                warn!(model = %model, "enhancer returned an empty answer, keeping chosen answer");
                return EnhancedAnswer::unenhanced(&chosen.answer);
            }
            debug!(model = %model, chars = answer.len(), "answer enhanced");
            EnhancedAnswer {
                model: model.to_string(),
                answer,
            }
        }
        Err(err) => {
            warn!(model = %model, error = %err, "enhancer failed, keeping chosen answer");
            EnhancedAnswer::unenhanced(&chosen.answer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::error::ModelError;
    use crate::fakes::ScriptedModelClient;
    use arena_state::{AgentSlot, RefereeScores, ScoreCard, VerdictDecision};

    fn chosen() -> AgentResult {
        AgentResult {
            model: "model-b".to_string(),
            answer: "The answer is 4.".to_string(),
            reasoning: "The answer is 4.".to_string(),
            raw_output: "The answer is 4.".to_string(),
        }
    }

    fn referee() -> RefereeResult {
        let scores = RefereeScores::new(9, 9, 9);
        RefereeResult {
            model: "ref".to_string(),
            chosen_agent: AgentSlot::AgentB,
            scores,
            scorecard: ScoreCard {
                agent_a: scores,
                agent_b: scores,
            },
            decision: VerdictDecision::Explicit,
            critique: String::new(),
            raw_output: String::new(),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
            .with_enhancer("enh")
            .with_retry(RetryPolicy::none())
    }

    #[tokio::test]
    async fn enhanced_answer_is_cleaned() {
        let client = ScriptedModelClient::new().reply("enh", " 2 + 2 = 4. </s>");
        let out = run_enhancer(&client, &config(), "q", &chosen(), &referee()).await;
        assert_eq!(out.model, "enh");
        assert_eq!(out.answer, "2 + 2 = 4.");
    }

    #[tokio::test]
    async fn failure_keeps_chosen_answer() {
        let client = ScriptedModelClient::new().fail("enh", ModelError::unavailable("enh", "down"));
        let out = run_enhancer(&client, &config(), "q", &chosen(), &referee()).await;
        assert!(out.is_fallback());
        assert_eq!(out.answer, "The answer is 4.");
    }

    #[tokio::test]
    async fn empty_reply_keeps_chosen_answer() {
        let client = ScriptedModelClient::new().reply("enh", "[/s>  ");
        let out = run_enhancer(&client, &config(), "q", &chosen(), &referee()).await;
        assert_eq!(out.model, EnhancedAnswer::UNENHANCED_MODEL);
        assert_eq!(out.answer, "The answer is 4.");
    }
}
