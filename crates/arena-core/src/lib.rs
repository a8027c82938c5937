//! Arena Core: the two-agent answer pipeline
//!
//! A question goes to two agent models concurrently, a referee model scores
//! both answers and picks one, an enhancer model polishes the winner, and the
//! whole turn is committed to a [`TurnStore`].
//!
//! ## Key Components
//!
//! - `PipelineOrchestrator`: submit / history / feedback operations
//! - `ModelClient`: model invocation seam, with `OpenRouterClient` for HTTP
//! - `parse_verdict`: strict referee output parsing
//! - `TurnTracker`: per-turn state machine and `StageEvent` stream

pub mod client;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod fakes;
pub mod fanout;
pub mod obs;
pub mod orchestrator;
pub mod prompts;
pub mod referee;
pub mod state;
pub mod telemetry;
pub mod views;

pub use client::{
    clean_output, invoke_with_policy, ModelClient, ModelReply, OpenRouterClient, Prompt,
};
pub use config::{PipelineConfig, ProviderConfig, RetryPolicy};
pub use error::{ModelError, PipelineError, PipelineStage, Result};
pub use obs::{
    emit_stage_completed, emit_turn_failed, emit_turn_labeled, emit_turn_persisted,
    emit_turn_started, emit_verdict, TurnSpan,
};
pub use orchestrator::PipelineOrchestrator;
pub use referee::{parse_verdict, ParsedVerdict, VerdictParse};
pub use state::{StageEvent, TurnState, TurnTracker};
pub use telemetry::init_tracing;
pub use views::{AskResponse, HistoryItem, RefereeSummary};

pub use arena_state::{
    AgentResult, AgentSlot, DraftTurn, EnhancedAnswer, HumanLabel, RefereeResult, RefereeScores,
    ScoreCard, Turn, TurnStore, VerdictDecision,
};
