//! Per-turn state machine.
//!
//! ```text
//! Started → AgentsRunning → AgentsComplete → RefereeRunning → RefereeComplete
//!         → EnhancerRunning → Persisting → Persisted
//! ```
//!
//! `Failed` is reachable from `AgentsRunning`, `RefereeRunning` and
//! `Persisting`. The enhancer has no failure edge; it always proceeds to
//! `Persisting`. No stage is skipped or re-entered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::error::{PipelineError, PipelineStage};

/// Where a turn is in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TurnState {
    Started,
    AgentsRunning,
    AgentsComplete,
    RefereeRunning,
    RefereeComplete,
    EnhancerRunning,
    Persisting,
    Persisted { turn_id: u64 },
    Failed { stage: PipelineStage, reason: String },
}

impl TurnState {
    pub fn name(&self) -> &'static str {
        match self {
            TurnState::Started => "started",
            TurnState::AgentsRunning => "agents_running",
            TurnState::AgentsComplete => "agents_complete",
            TurnState::RefereeRunning => "referee_running",
            TurnState::RefereeComplete => "referee_complete",
            TurnState::EnhancerRunning => "enhancer_running",
            TurnState::Persisting => "persisting",
            TurnState::Persisted { .. } => "persisted",
            TurnState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::Persisted { .. } | TurnState::Failed { .. })
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: &TurnState) -> bool {
        use TurnState::*;
        match (self, next) {
            (Started, AgentsRunning) => true,
            (AgentsRunning, AgentsComplete) => true,
            (AgentsComplete, RefereeRunning) => true,
            (RefereeRunning, RefereeComplete) => true,
            (RefereeComplete, EnhancerRunning) => true,
            (EnhancerRunning, Persisting) => true,
            (Persisting, Persisted { .. }) => true,
            (AgentsRunning, Failed { stage, .. }) => *stage == PipelineStage::Agents,
            (RefereeRunning, Failed { stage, .. }) => *stage == PipelineStage::Referee,
            (Persisting, Failed { stage, .. }) => *stage == PipelineStage::Persist,
            _ => false,
        }
    }
}

impl std::fmt::Display for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnState::Persisted { turn_id } => write!(f, "persisted({turn_id})"),
            TurnState::Failed { stage, .. } => write!(f, "failed({stage})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// One state transition, as streamed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    pub trace_id: String,
    pub state: TurnState,
    pub at: DateTime<Utc>,
}

/// Tracks one turn's state and validates every transition.
pub struct TurnTracker {
    trace_id: String,
    state: TurnState,
    events: Option<UnboundedSender<StageEvent>>,
}

impl TurnTracker {
    /// New tracker in `Started`. The initial state is emitted too.
    pub fn new(trace_id: impl Into<String>, events: Option<UnboundedSender<StageEvent>>) -> Self {
        let tracker = Self {
            trace_id: trace_id.into(),
            state: TurnState::Started,
            events,
        };
        tracker.emit();
        tracker
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// Move to `next`, or fail with `InvalidTransition`.
    pub fn advance(&mut self, next: TurnState) -> Result<(), PipelineError> {
        if !self.state.can_transition_to(&next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(trace_id = %self.trace_id, from = %self.state, to = %next, "turn state");
        self.state = next;
        self.emit();
        Ok(())
    }

    /// Record a stage failure.
    pub fn fail(&mut self, stage: PipelineStage, reason: impl Into<String>) -> Result<(), PipelineError> {
        self.advance(TurnState::Failed {
            stage,
            reason: reason.into(),
        })
    }

    fn emit(&self) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(StageEvent {
                trace_id: self.trace_id.clone(),
                state: self.state.clone(),
                at: Utc::now(),
            });
        }
    }
}
