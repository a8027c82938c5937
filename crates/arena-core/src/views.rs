//! Response shapes for collaborators (CLI, front ends).

use arena_state::{
    AgentResult, AgentSlot, EnhancedAnswer, HumanLabel, RefereeResult, RefereeScores, Turn,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What `ask` returns: the turn without timestamps or label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub turn_id: u64,
    pub question: String,
    pub agent_a: AgentResult,
    pub agent_b: AgentResult,
    pub referee: RefereeResult,
    pub enhanced_answer: EnhancedAnswer,
}

impl From<&Turn> for AskResponse {
    fn from(turn: &Turn) -> Self {
        AskResponse {
            turn_id: turn.turn_id,
            question: turn.question.clone(),
            agent_a: turn.agent_a.clone(),
            agent_b: turn.agent_b.clone(),
            referee: turn.referee.clone(),
            enhanced_answer: turn.enhanced_answer.clone(),
        }
    }
}

/// Referee summary inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeSummary {
    pub scores: RefereeScores,
    pub critique: String,
    pub chosen_agent: AgentSlot,
}

/// One row of the history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub turn_id: u64,
    pub question: String,
    pub chosen_agent: AgentSlot,
    pub enhanced_answer: String,
    pub referee: RefereeSummary,
    pub created_at: DateTime<Utc>,
    pub human_label: Option<HumanLabel>,
}

impl From<&Turn> for HistoryItem {
    fn from(turn: &Turn) -> Self {
        HistoryItem {
            turn_id: turn.turn_id,
            question: turn.question.clone(),
            chosen_agent: turn.referee.chosen_agent,
            enhanced_answer: turn.enhanced_answer.answer.clone(),
            referee: RefereeSummary {
                scores: turn.referee.scores,
                critique: turn.referee.critique.clone(),
                chosen_agent: turn.referee.chosen_agent,
            },
            created_at: turn.created_at,
            human_label: turn.human_label,
        }
    }
}
