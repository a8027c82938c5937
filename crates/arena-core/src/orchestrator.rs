//! Pipeline orchestrator: sequences the stages of one turn and owns the
//! external operations (submit, history, feedback).
//!
//! Each submitted question is an independent future. The only concurrency
//! inside a turn is the agent fan-out; turns share nothing but the store.
//! Dropping a `submit_question` future cancels that turn's outstanding model
//! calls and nothing is persisted for it.

use std::sync::Arc;
use std::time::Instant;

use arena_state::{AgentSlot, DraftTurn, HumanLabel, Turn, TurnStore};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::client::ModelClient;
use crate::config::PipelineConfig;
use crate::enhancer::run_enhancer;
use crate::error::{PipelineError, Result};
use crate::fanout::run_agents;
use crate::obs::{self, TurnSpan};
use crate::referee::run_referee;
use crate::state::{StageEvent, TurnState, TurnTracker};
use crate::views::HistoryItem;

/// Runs turns against a model client and a turn store.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    client: Arc<dyn ModelClient>,
    store: Arc<dyn TurnStore>,
}

impl PipelineOrchestrator {
    /// Build an orchestrator. The configuration is validated up front.
    pub fn new(
        config: PipelineConfig,
        client: Arc<dyn ModelClient>,
        store: Arc<dyn TurnStore>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            client,
            store,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one question and persist the turn.
    pub async fn submit_question(&self, question: &str) -> Result<Turn> {
        self.run(question, None).await
    }

    /// Like [`Self::submit_question`], streaming every state transition to `events`.
    pub async fn submit_question_observed(
        &self,
        question: &str,
        events: UnboundedSender<StageEvent>,
    ) -> Result<Turn> {
        self.run(question, Some(events)).await
    }

    /// All turns, newest first.
    pub async fn list_history(&self) -> Result<Vec<Turn>> {
        Ok(self.store.list().await?)
    }

    /// History in the summarized listing shape, newest first.
    pub async fn history_items(&self) -> Result<Vec<HistoryItem>> {
        let turns = self.store.list().await?;
        Ok(turns.iter().map(HistoryItem::from).collect())
    }

    pub async fn get_turn(&self, turn_id: u64) -> Result<Turn> {
        Ok(self.store.get(turn_id).await?)
    }

    /// Attach a human label. Relabeling overwrites the previous label.
    pub async fn record_feedback(&self, turn_id: u64, label: HumanLabel) -> Result<Turn> {
        let turn = self.store.set_label(turn_id, label).await?;
        obs::emit_turn_labeled(turn_id, label.as_str());
        Ok(turn)
    }

    async fn run(
        &self,
        question: &str,
        events: Option<UnboundedSender<StageEvent>>,
    ) -> Result<Turn> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyQuestion);
        }

        let trace_id = Uuid::new_v4().to_string();
        TurnSpan::new(&trace_id)
            .instrument(self.run_turn(question, trace_id.clone(), events))
            .await
    }

    async fn run_turn(
        &self,
        question: &str,
        trace_id: String,
        events: Option<UnboundedSender<StageEvent>>,
    ) -> Result<Turn> {
        let started = Instant::now();
        let mut tracker = TurnTracker::new(trace_id, events);
        obs::emit_turn_started(tracker.trace_id(), question.chars().count());

        match self.run_stages(question, &mut tracker).await {
            Ok(turn) => {
                obs::emit_turn_persisted(
                    tracker.trace_id(),
                    turn.turn_id,
                    elapsed_ms(started),
                    !turn.enhanced_answer.is_fallback(),
                );
                Ok(turn)
            }
            Err(err) => {
                let stage = err.stage();
                let stage_name = stage
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "pipeline".to_string());
                obs::emit_turn_failed(tracker.trace_id(), &stage_name, &err);
                if let Some(stage) = stage {
                    if let Err(transition) = tracker.fail(stage, err.to_string()) {
                        warn!(
                            trace_id = %tracker.trace_id(),
                            error = %transition,
                            "could not record failure state"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    async fn run_stages(&self, question: &str, tracker: &mut TurnTracker) -> Result<Turn> {
        let client = self.client.as_ref();

        tracker.advance(TurnState::AgentsRunning)?;
        let stage_start = Instant::now();
        let (agent_a, agent_b) = run_agents(client, &self.config, question).await?;
        tracker.advance(TurnState::AgentsComplete)?;
        obs::emit_stage_completed(tracker.trace_id(), "agents", elapsed_ms(stage_start));

        tracker.advance(TurnState::RefereeRunning)?;
        let stage_start = Instant::now();
        let referee = run_referee(client, &self.config, question, &agent_a, &agent_b).await?;
        tracker.advance(TurnState::RefereeComplete)?;
        obs::emit_stage_completed(tracker.trace_id(), "referee", elapsed_ms(stage_start));
        obs::emit_verdict(
            tracker.trace_id(),
            referee.chosen_agent.as_str(),
            referee.decision.as_str(),
            referee.scores.total(),
        );

        tracker.advance(TurnState::EnhancerRunning)?;
        let stage_start = Instant::now();
        let chosen = match referee.chosen_agent {
            AgentSlot::AgentA => &agent_a,
            AgentSlot::AgentB => &agent_b,
        };
        let enhanced_answer = run_enhancer(client, &self.config, question, chosen, &referee).await;
        obs::emit_stage_completed(tracker.trace_id(), "enhancer", elapsed_ms(stage_start));

        tracker.advance(TurnState::Persisting)?;
        let draft = DraftTurn {
            question: question.to_string(),
            agent_a,
            agent_b,
            referee,
            enhanced_answer,
        };
        let turn = self.store.create(draft).await?;
        tracker.advance(TurnState::Persisted {
            turn_id: turn.turn_id,
        })?;

        Ok(turn)
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
