//! Structured observability hooks for pipeline run lifecycle events.
//!
//! Emission functions for key lifecycle events: start, stage begin/end,
//! persistence, finish. The orchestrator instruments each run future with a
//! run-scoped span, so these events carry the run id twice over.
//!
//! Events are emitted at `info!` level; configure verbosity through
//! `RUST_LOG` (see [`crate::telemetry::init_tracing`]).

use tracing::info;

use crate::domain::StageName;

/// Emit event: pipeline run started with parsed batch size.
pub fn emit_run_started(run_id: &str, error_count: usize, warning_count: usize) {
    info!(
        event = "run.started",
        run_id = %run_id,
        error_count = error_count,
        warning_count = warning_count,
    );
}

/// Emit event: stage began executing.
pub fn emit_stage_started(run_id: &str, stage: StageName) {
    info!(event = "stage.started", run_id = %run_id, stage = %stage);
}

/// Emit event: stage finished with duration and outcome.
pub fn emit_stage_finished(run_id: &str, stage: StageName, duration_ms: u64, success: bool) {
    info!(
        event = "stage.finished",
        run_id = %run_id,
        stage = %stage,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: booklet persisted to disk.
pub fn emit_booklet_persisted(run_id: &str, path: &std::path::Path) {
    info!(event = "booklet.persisted", run_id = %run_id, path = %path.display());
}

/// Emit event: run finished with total duration and failure code on error.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, outcome: &str) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        outcome = %outcome,
    );
}
