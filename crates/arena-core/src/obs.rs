//! Structured observability hooks for the turn lifecycle.
//!
//! This module provides:
//! - Turn-scoped tracing spans via the `TurnSpan` guard
//! - Emission functions for lifecycle events: started, stage completed, persisted, failed, labeled
//!
//! Events are `info!` level except failures, which are `warn!`.

use tracing::{info, warn, Instrument};

/// Turn-scoped span tagged with the turn's trace id.
///
/// Unlike a run on a single thread, a turn crosses await points, so the span
/// is attached to the future with [`TurnSpan::instrument`] rather than entered.
pub struct TurnSpan {
    span: tracing::Span,
}

impl TurnSpan {
    pub fn new(trace_id: &str) -> Self {
        Self {
            span: tracing::info_span!("arena.turn", trace_id = %trace_id),
        }
    }

    pub fn instrument<F: std::future::Future>(self, fut: F) -> tracing::instrument::Instrumented<F> {
        fut.instrument(self.span)
    }
}

/// Emit event: turn started.
pub fn emit_turn_started(trace_id: &str, question_chars: usize) {
    info!(event = "turn.started", trace_id = %trace_id, question_chars = question_chars);
}

/// Emit event: a stage finished.
pub fn emit_stage_completed(trace_id: &str, stage: &str, duration_ms: u64) {
    info!(
        event = "turn.stage_completed",
        trace_id = %trace_id,
        stage = %stage,
        duration_ms = duration_ms,
    );
}

/// Emit event: referee verdict accepted.
pub fn emit_verdict(trace_id: &str, chosen_agent: &str, decision: &str, total: u32) {
    info!(
        event = "turn.verdict",
        trace_id = %trace_id,
        chosen_agent = %chosen_agent,
        decision = %decision,
        total_score = total,
    );
}

/// Emit event: turn committed to the store.
pub fn emit_turn_persisted(trace_id: &str, turn_id: u64, duration_ms: u64, enhanced: bool) {
    info!(
        event = "turn.persisted",
        trace_id = %trace_id,
        turn_id = turn_id,
        duration_ms = duration_ms,
        enhanced = enhanced,
    );
}

/// Emit event: turn failed (warning level).
pub fn emit_turn_failed(trace_id: &str, stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "turn.failed", trace_id = %trace_id, stage = %stage, error = %error);
}

/// Emit event: human label recorded.
pub fn emit_turn_labeled(turn_id: u64, label: &str) {
    info!(event = "turn.labeled", turn_id = turn_id, label = %label);
}
