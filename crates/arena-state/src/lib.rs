//! Arena-State: SurrealDB persistence for answer arena turns
//!
//! This crate owns the durable collection of turns. Every question answered
//! by the pipeline becomes one `Turn`; the only later mutation is the human
//! correctness label.
//!
//! ## Key Components
//!
//! - `TurnStore`: the storage contract (create / list / get / set_label)
//! - `SurrealTurnStore`: SurrealDB backend (in-memory, local SurrealKV, or remote)
//! - `MemoryTurnStore`: in-process fake for tests
//! - `Turn` and its parts: the persisted record shape

pub mod connection;
mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_store;
pub mod turn;

pub use connection::CloudConfig;
pub use error::{StateError, StorageError};
pub use storage_traits::{StorageResult, TurnStore};
pub use surreal_store::SurrealTurnStore;
pub use turn::{
    AgentResult, AgentSlot, DraftTurn, EnhancedAnswer, HumanLabel, RefereeResult, RefereeScores,
    ScoreCard, Turn, VerdictDecision,
};

/// Result type for connection and schema operations
pub type Result<T> = std::result::Result<T, StateError>;
