//! Turn records: the aggregate persisted for every answered question.
//!
//! A `Turn` is built from a [`DraftTurn`] by a [`crate::TurnStore`], which is
//! the only place `turn_id` and `created_at` are assigned. After creation the
//! human label is the only mutable part of a turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one of the two competing agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentSlot {
    AgentA,
    AgentB,
}

impl AgentSlot {
    /// Both slots in presentation order.
    pub const ALL: [AgentSlot; 2] = [AgentSlot::AgentA, AgentSlot::AgentB];

    /// Wire name (`agent_a` / `agent_b`).
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentSlot::AgentA => "agent_a",
            AgentSlot::AgentB => "agent_b",
        }
    }

    /// Human label used in prompts ("Agent A" / "Agent B").
    pub fn label(&self) -> &'static str {
        match self {
            AgentSlot::AgentA => "Agent A",
            AgentSlot::AgentB => "Agent B",
        }
    }
}

impl std::fmt::Display for AgentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One agent's answer to the question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Model identifier that produced the answer
    pub model: String,
    /// Cleaned answer text
    pub answer: String,
    /// Explanation text, or the answer itself when the model gave none
    pub reasoning: String,
    /// Untouched model output
    pub raw_output: String,
}

/// Referee scores for a single answer. Every field is in `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeScores {
    pub correctness: u8,
    pub clarity: u8,
    pub usefulness: u8,
}

impl RefereeScores {
    /// Highest allowed value for any score.
    pub const MAX: u8 = 10;

    pub fn new(correctness: u8, clarity: u8, usefulness: u8) -> Self {
        Self {
            correctness,
            clarity,
            usefulness,
        }
    }

    /// Sum of the three scores.
    pub fn total(&self) -> u32 {
        u32::from(self.correctness) + u32::from(self.clarity) + u32::from(self.usefulness)
    }

    /// True when all three scores are within `0..=10`.
    pub fn is_valid(&self) -> bool {
        self.correctness <= Self::MAX && self.clarity <= Self::MAX && self.usefulness <= Self::MAX
    }
}

/// Scores for both agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub agent_a: RefereeScores,
    pub agent_b: RefereeScores,
}

impl ScoreCard {
    pub fn for_slot(&self, slot: AgentSlot) -> RefereeScores {
        match slot {
            AgentSlot::AgentA => self.agent_a,
            AgentSlot::AgentB => self.agent_b,
        }
    }
}

/// How the referee's winner was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictDecision {
    /// The referee named the winner.
    Explicit,
    /// No choice was given; the higher score sum won, ties going to Agent A.
    ScoreFallback,
}

impl VerdictDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictDecision::Explicit => "explicit",
            VerdictDecision::ScoreFallback => "score_fallback",
        }
    }
}

/// The referee's verdict over both answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefereeResult {
    pub model: String,
    pub chosen_agent: AgentSlot,
    /// Scores of the chosen agent
    pub scores: RefereeScores,
    pub scorecard: ScoreCard,
    pub decision: VerdictDecision,
    pub critique: String,
    pub raw_output: String,
}

/// The final, polished answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedAnswer {
    pub model: String,
    pub answer: String,
}

impl EnhancedAnswer {
    /// Model name recorded when enhancement failed and the chosen answer was kept.
    pub const UNENHANCED_MODEL: &'static str = "unenhanced";

    /// Fallback that carries the chosen answer verbatim.
    pub fn unenhanced(answer: impl Into<String>) -> Self {
        Self {
            model: Self::UNENHANCED_MODEL.to_string(),
            answer: answer.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.model == Self::UNENHANCED_MODEL
    }
}

/// Human correctness label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanLabel {
    Good,
    Bad,
}

impl HumanLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HumanLabel::Good => "good",
            HumanLabel::Bad => "bad",
        }
    }
}

impl std::fmt::Display for HumanLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HumanLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(HumanLabel::Good),
            "bad" => Ok(HumanLabel::Bad),
            other => Err(format!("invalid label '{other}', expected 'good' or 'bad'")),
        }
    }
}

/// Everything a completed pipeline run produced, before the store commits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftTurn {
    pub question: String,
    pub agent_a: AgentResult,
    pub agent_b: AgentResult,
    pub referee: RefereeResult,
    pub enhanced_answer: EnhancedAnswer,
}

impl DraftTurn {
    /// The agent result the referee picked.
    pub fn chosen(&self) -> &AgentResult {
        match self.referee.chosen_agent {
            AgentSlot::AgentA => &self.agent_a,
            AgentSlot::AgentB => &self.agent_b,
        }
    }
}

/// A committed turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: u64,
    pub question: String,
    pub agent_a: AgentResult,
    pub agent_b: AgentResult,
    pub referee: RefereeResult,
    pub enhanced_answer: EnhancedAnswer,
    pub created_at: DateTime<Utc>,
    pub human_label: Option<HumanLabel>,
    pub labeled_at: Option<DateTime<Utc>>,
}

impl Turn {
    /// Commit a draft under the given id and timestamp.
    pub fn from_draft(turn_id: u64, draft: DraftTurn, created_at: DateTime<Utc>) -> Self {
        Turn {
            turn_id,
            question: draft.question,
            agent_a: draft.agent_a,
            agent_b: draft.agent_b,
            referee: draft.referee,
            enhanced_answer: draft.enhanced_answer,
            created_at,
            human_label: None,
            labeled_at: None,
        }
    }

    pub fn agent(&self, slot: AgentSlot) -> &AgentResult {
        match slot {
            AgentSlot::AgentA => &self.agent_a,
            AgentSlot::AgentB => &self.agent_b,
        }
    }

    pub fn chosen(&self) -> &AgentResult {
        self.agent(self.referee.chosen_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_slot_serializes_as_snake_case() {
        let json = serde_json::to_string(&AgentSlot::AgentB).unwrap();
        assert_eq!(json, "\"agent_b\"");
        let back: AgentSlot = serde_json::from_str("\"agent_a\"").unwrap();
        assert_eq!(back, AgentSlot::AgentA);
    }

    #[test]
    fn human_label_parses_case_insensitively() {
        assert_eq!("GOOD".parse::<HumanLabel>().unwrap(), HumanLabel::Good);
        assert_eq!(" bad ".parse::<HumanLabel>().unwrap(), HumanLabel::Bad);
        assert!("meh".parse::<HumanLabel>().is_err());
    }

    #[test]
    fn score_total_and_range() {
        let s = RefereeScores::new(10, 9, 7);
        assert_eq!(s.total(), 26);
        assert!(s.is_valid());
        assert!(!RefereeScores::new(11, 0, 0).is_valid());
    }

    #[test]
    fn unenhanced_answer_is_flagged() {
        let e = EnhancedAnswer::unenhanced("4");
        assert!(e.is_fallback());
        assert_eq!(e.answer, "4");
    }
}
