//! Storage trait for answer arena turns
//!
//! `TurnStore` is the single shared mutable resource of the pipeline. It is
//! async and backend-agnostic; an in-memory fake lives in the `fakes`
//! module and a SurrealDB backend in `surreal_store`.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::turn::{DraftTurn, HumanLabel, Turn};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Durable collection of turns.
///
/// Guarantees:
/// - `create` assigns a unique `turn_id` strictly greater than every id
///   issued before it, including ids issued before a restart.
/// - A turn is visible to readers only once fully committed.
/// - `list` returns every committed turn, newest first. Each call re-reads
///   the store, so the sequence is finite and restartable.
/// - `set_label` is the only mutation. Concurrent and repeated labels on the
///   same turn resolve as last-write-wins.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Commit a draft, assigning `turn_id` and `created_at`.
    async fn create(&self, draft: DraftTurn) -> StorageResult<Turn>;

    /// All turns, newest first.
    async fn list(&self) -> StorageResult<Vec<Turn>>;

    /// Fetch one turn. Returns `StorageError::TurnNotFound` if absent.
    async fn get(&self, turn_id: u64) -> StorageResult<Turn>;

    /// Set the human label, overwriting any previous label.
    /// Returns `StorageError::TurnNotFound` and changes nothing if absent.
    async fn set_label(&self, turn_id: u64, label: HumanLabel) -> StorageResult<Turn>;

    /// Number of committed turns.
    async fn count(&self) -> StorageResult<usize> {
        Ok(self.list().await?.len())
    }
}
