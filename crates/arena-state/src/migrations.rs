//! SurrealDB schema initialization
//!
//! Safe to call on every connection; `DEFINE ... IF NOT EXISTS` keeps it
//! idempotent across restarts of a durable database.

use crate::error::StateError;
use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all arena tables
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing arena SurrealDB schema");
    init_turns_table(db).await?;
    info!("Arena schema initialization complete");
    Ok(())
}

/// Initialize `turns` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE turns {
///   turn_id:          INT (unique, strictly increasing)
///   question:         STRING
///   agent_a:          OBJECT {model, answer, reasoning, raw_output}
///   agent_b:          OBJECT {model, answer, reasoning, raw_output}
///   referee:          OBJECT {model, chosen_agent, scores, scorecard, decision, critique, raw_output}
///   enhanced_answer:  OBJECT {model, answer}
///   created_at:       DATETIME (indexed)
///   human_label:      STRING? ("good" | "bad")
///   labeled_at:       DATETIME?
/// }
/// ```
///
/// Constraints:
/// - `turn_id` is unique (a second writer with a stale counter is rejected)
/// - rows are never deleted
/// - only `human_label` and `labeled_at` change after creation (app logic)
async fn init_turns_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing turns table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS turns
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_turn_id ON TABLE turns COLUMNS turn_id UNIQUE;

        DEFINE INDEX IF NOT EXISTS idx_turn_created_at ON TABLE turns COLUMNS created_at;

        DEFINE INDEX IF NOT EXISTS idx_turn_label ON TABLE turns COLUMNS human_label;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?
        .check()
        .map_err(|e| StateError::SchemaSetup(e.to_string()))?;
    info!("turns table initialized");
    Ok(())
}
