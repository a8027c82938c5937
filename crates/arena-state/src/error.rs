//! Error types for arena-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

/// Errors returned by [`crate::TurnStore`] operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// No turn with this id exists
    #[error("turn not found: {turn_id}")]
    TurnNotFound { turn_id: u64 },

    /// A turn with this id is already stored
    #[error("turn id {turn_id} already exists")]
    DuplicateTurnId { turn_id: u64 },

    /// A stored row could not be mapped back to a turn
    #[error("corrupt turn record: {0}")]
    Corrupt(String),

    /// Backend failure (connection, query, serialization)
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<StateError> for StorageError {
    fn from(err: StateError) -> Self {
        StorageError::Backend(err.to_string())
    }
}
