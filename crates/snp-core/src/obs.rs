//! Structured observability hooks for pipeline stages.
//!
//! This module provides:
//! - Stage-scoped tracing spans via the `StageSpan` RAII guard
//! - Emission functions for stage start/finish, mutations, predictions and checkpoints
//!
//! Events are emitted at `info!` level, except per-mutation detail which is
//! `debug!`. Filter with `RUST_LOG`; pass `--json` for JSON lines.

use tracing::{debug, info, warn};

/// RAII guard that enters a stage-scoped tracing span.
///
/// ```ignore
/// let _span = StageSpan::enter("generate");
/// // every event below carries stage = "generate"
/// ```
///
/// Async stages must not hold the guard across `.await`; they attach
/// [`StageSpan::span`] with `Instrument` instead.
pub struct StageSpan {
    _span: tracing::span::EnteredSpan,
}

impl StageSpan {
    pub fn enter(stage: &str) -> Self {
        Self {
            _span: Self::span(stage).entered(),
        }
    }

    /// The un-entered span, for `.instrument(...)`.
    pub fn span(stage: &str) -> tracing::Span {
        tracing::info_span!("snpsim.stage", stage = %stage)
    }
}

/// Emit event: stage started with the number of items it will process.
pub fn emit_stage_started(stage: &str, items: usize) {
    info!(event = "stage.started", stage = %stage, items = items);
}

/// Emit event: stage finished.
pub fn emit_stage_finished(stage: &str, duration_ms: u64, items: usize, failures: usize) {
    info!(
        event = "stage.finished",
        stage = %stage,
        duration_ms = duration_ms,
        items = items,
        failures = failures,
    );
}

/// Emit event: one substitution placed in the mutated sequence.
pub fn emit_mutation_introduced(index: usize, original: char, mutated: char) {
    debug!(
        event = "mutation.introduced",
        index = index,
        original = %original,
        mutated = %mutated,
    );
}

/// Emit event: oracle answered for one mutation.
pub fn emit_prediction_recorded(index: usize, seq: usize, total: usize) {
    info!(event = "prediction.recorded", index = index, seq = seq, total = total);
}

/// Emit event: oracle call failed; the failure is stored as data (warning level).
pub fn emit_prediction_failed(index: usize, error: &dyn std::fmt::Display) {
    warn!(event = "prediction.failed", index = index, error = %error);
}

/// Emit event: partial prediction document persisted.
pub fn emit_checkpoint_written(completed: usize, total: usize) {
    debug!(event = "checkpoint.written", completed = completed, total = total);
}

/// Emit event: checkpoint could not be written (warning level).
pub fn emit_checkpoint_error(completed: usize, error: &dyn std::fmt::Display) {
    warn!(event = "checkpoint.error", completed = completed, error = %error);
}
