//! SurrealDB-backed TurnStore implementation
//!
//! Uses `schema::TurnRow` for persistence, converting to/from `turn::Turn`
//! at the boundary. Id assignment is serialized in-process by a mutex around
//! the counter; the counter is recovered from the highest stored `turn_id`
//! when the store is opened, and the UNIQUE index on `turn_id` rejects any
//! id a second writer may already have taken.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::connection;
use crate::error::StorageError;
use crate::schema::{TurnIdRow, TurnRow};
use crate::storage_traits::{StorageResult, TurnStore};
use crate::turn::{DraftTurn, HumanLabel, Turn};

/// SurrealDB-backed implementation of [`TurnStore`].
pub struct SurrealTurnStore {
    db: Surreal<Any>,
    next_id: Mutex<u64>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

impl SurrealTurnStore {
    /// Wrap an already-connected database whose schema is initialized.
    pub async fn with_db(db: Surreal<Any>) -> crate::Result<Self> {
        let next = Self::load_next_id(&db).await.map_err(|e| {
            crate::error::StateError::Query(format!("failed to recover turn counter: {e}"))
        })?;
        debug!(next_turn_id = next, "turn counter recovered");
        Ok(Self {
            db,
            next_id: Mutex::new(next),
        })
    }

    /// Create an in-memory instance for testing.
    pub async fn in_memory() -> crate::Result<Self> {
        let db = connection::connect_url("mem://").await?;
        info!("SurrealTurnStore connected (in-memory)");
        Self::with_db(db).await
    }

    /// Open a durable store in a local directory.
    pub async fn open(path: &Path) -> crate::Result<Self> {
        let db = connection::connect_path(path).await?;
        info!("SurrealTurnStore connected ({})", path.display());
        Self::with_db(db).await
    }

    /// Create from environment variables (see [`connection::connect_from_env`]).
    pub async fn from_env() -> crate::Result<Self> {
        let db = connection::connect_from_env().await?;
        Self::with_db(db).await
    }

    // -- private helpers -----------------------------------------------------

    /// One past the highest stored id, or 1 for an empty table.
    async fn load_next_id(db: &Surreal<Any>) -> StorageResult<u64> {
        let mut res = db
            .query("SELECT turn_id FROM turns ORDER BY turn_id DESC LIMIT 1")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<TurnIdRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.first().map(|r| r.turn_id + 1).unwrap_or(1))
    }

    async fn fetch_turn(&self, turn_id: u64) -> StorageResult<TurnRow> {
        let mut res = self
            .db
            .query("SELECT * FROM turns WHERE turn_id = $tid")
            .bind(("tid", turn_id))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<TurnRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(StorageError::TurnNotFound { turn_id })
    }
}

#[async_trait]
impl TurnStore for SurrealTurnStore {
    #[instrument(skip_all)]
    async fn create(&self, draft: DraftTurn) -> StorageResult<Turn> {
        let mut next = self.next_id.lock().await;
        let turn_id = *next;
        let turn = Turn::from_draft(turn_id, draft, Utc::now());

        debug!(turn_id, "creating turn");

        let created: std::result::Result<Option<TurnRow>, surrealdb::Error> =
            self.db.create("turns").content(TurnRow::from(&turn)).await;

        match created {
            Ok(_) => {
                *next += 1;
                Ok(turn)
            }
            Err(e) => {
                let message = e.to_string();
                // Another writer may have advanced the table; resync before the next attempt.
                match Self::load_next_id(&self.db).await {
                    Ok(recovered) if recovered > *next => {
                        warn!(turn_id, recovered, "turn counter was stale, resynced");
                        *next = recovered;
                        Err(StorageError::DuplicateTurnId { turn_id })
                    }
                    _ => Err(StorageError::Backend(message)),
                }
            }
        }
    }

    async fn list(&self) -> StorageResult<Vec<Turn>> {
        let mut res = self
            .db
            .query("SELECT * FROM turns ORDER BY turn_id DESC")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<TurnRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter().map(Turn::try_from).collect()
    }

    async fn get(&self, turn_id: u64) -> StorageResult<Turn> {
        self.fetch_turn(turn_id).await.and_then(Turn::try_from)
    }

    #[instrument(skip(self))]
    async fn set_label(&self, turn_id: u64, label: HumanLabel) -> StorageResult<Turn> {
        let mut res = self
            .db
            .query(
                "UPDATE turns SET human_label = $label, labeled_at = time::now() \
                 WHERE turn_id = $tid RETURN AFTER",
            )
            .bind(("label", label.as_str().to_string()))
            .bind(("tid", turn_id))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<TurnRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or(StorageError::TurnNotFound { turn_id })
            .and_then(Turn::try_from)
    }

    async fn count(&self) -> StorageResult<usize> {
        let mut res = self
            .db
            .query("SELECT count() FROM turns GROUP ALL")
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<CountRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.first().map(|r| r.count as usize).unwrap_or(0))
    }
}
