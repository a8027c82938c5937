//! In-memory fake for the turn store (testing and embedding)
//!
//! `MemoryTurnStore` satisfies the `TurnStore` contract without any external
//! dependencies. Id assignment and insertion happen under one lock, so
//! concurrent creates never share or reorder ids.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::{StorageResult, TurnStore};
use crate::turn::{DraftTurn, HumanLabel, Turn};

#[derive(Debug)]
struct Inner {
    next_id: u64,
    turns: Vec<Turn>,
}

/// In-memory turn store backed by a `Vec<Turn>` in creation order.
#[derive(Debug)]
pub struct MemoryTurnStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryTurnStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                turns: Vec::new(),
            }),
        }
    }
}

impl MemoryTurnStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TurnStore for MemoryTurnStore {
    async fn create(&self, draft: DraftTurn) -> StorageResult<Turn> {
        let mut inner = self.lock()?;
        let turn_id = inner.next_id;
        inner.next_id += 1;
        let turn = Turn::from_draft(turn_id, draft, Utc::now());
        inner.turns.push(turn.clone());
        Ok(turn)
    }

    async fn list(&self) -> StorageResult<Vec<Turn>> {
        let inner = self.lock()?;
        Ok(inner.turns.iter().rev().cloned().collect())
    }

    async fn get(&self, turn_id: u64) -> StorageResult<Turn> {
        let inner = self.lock()?;
        inner
            .turns
            .iter()
            .find(|t| t.turn_id == turn_id)
            .cloned()
            .ok_or(StorageError::TurnNotFound { turn_id })
    }

    async fn set_label(&self, turn_id: u64, label: HumanLabel) -> StorageResult<Turn> {
        let mut inner = self.lock()?;
        let turn = inner
            .turns
            .iter_mut()
            .find(|t| t.turn_id == turn_id)
            .ok_or(StorageError::TurnNotFound { turn_id })?;
        turn.human_label = Some(label);
        turn.labeled_at = Some(Utc::now());
        Ok(turn.clone())
    }

    async fn count(&self) -> StorageResult<usize> {
        Ok(self.lock()?.turns.len())
    }
}
