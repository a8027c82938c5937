//! Row mapping for the `turns` SurrealDB table
//!
//! Timestamps are stored as native SurrealDB datetimes so `ORDER BY` and
//! time-range queries work on the server side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::turn::{AgentResult, EnhancedAnswer, HumanLabel, RefereeResult, Turn};

/// Serialize chrono DateTime as a SurrealDB datetime
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Serialize an optional chrono DateTime as an optional SurrealDB datetime
mod surreal_datetime_opt {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => {
                let sd = SurrealDatetime::from(*d);
                serde::Serialize::serialize(&Some(sd), serializer)
            }
            None => serde::Serialize::serialize(&None::<SurrealDatetime>, serializer),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = Option::<SurrealDatetime>::deserialize(deserializer)?;
        Ok(sd.map(DateTime::from))
    }
}

/// A row of the `turns` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRow {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Store-assigned monotonic id
    pub turn_id: u64,
    pub question: String,
    pub agent_a: AgentResult,
    pub agent_b: AgentResult,
    pub referee: RefereeResult,
    pub enhanced_answer: EnhancedAnswer,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub human_label: Option<HumanLabel>,
    #[serde(default, with = "surreal_datetime_opt")]
    pub labeled_at: Option<DateTime<Utc>>,
}

impl From<&Turn> for TurnRow {
    fn from(turn: &Turn) -> Self {
        TurnRow {
            id: None,
            turn_id: turn.turn_id,
            question: turn.question.clone(),
            agent_a: turn.agent_a.clone(),
            agent_b: turn.agent_b.clone(),
            referee: turn.referee.clone(),
            enhanced_answer: turn.enhanced_answer.clone(),
            created_at: turn.created_at,
            human_label: turn.human_label,
            labeled_at: turn.labeled_at,
        }
    }
}

/// Rows are checked on the way out; a row that no pipeline run could have
/// written is reported as [`StorageError::Corrupt`].
impl TryFrom<TurnRow> for Turn {
    type Error = StorageError;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        if row.turn_id == 0 {
            return Err(StorageError::Corrupt("turn_id 0 is never assigned".to_string()));
        }
        let scorecard = row.referee.scorecard;
        if !scorecard.agent_a.is_valid() || !scorecard.agent_b.is_valid() {
            return Err(StorageError::Corrupt(format!(
                "turn {} has a score outside 0..=10",
                row.turn_id
            )));
        }
        if row.referee.scores != scorecard.for_slot(row.referee.chosen_agent) {
            return Err(StorageError::Corrupt(format!(
                "turn {} chosen scores do not match {}",
                row.turn_id, row.referee.chosen_agent
            )));
        }
        Ok(Turn {
            turn_id: row.turn_id,
            question: row.question,
            agent_a: row.agent_a,
            agent_b: row.agent_b,
            referee: row.referee,
            enhanced_answer: row.enhanced_answer,
            created_at: row.created_at,
            human_label: row.human_label,
            labeled_at: row.labeled_at,
        })
    }
}

/// Projection used to recover the id counter on open
#[derive(Debug, Clone, Deserialize)]
pub struct TurnIdRow {
    pub turn_id: u64,
}
