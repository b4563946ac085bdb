//! The pipeline orchestrator: parses raw build output and drives the fixed
//! four-stage analysis chain for one run.
//!
//! Within a run the stages are strictly sequential — each consumes the
//! previous stage's finding. Across runs, a shared counting semaphore bounds
//! simultaneous stage calls so a long-lived watcher servicing many error
//! files cannot overload the downstream model backend.
//!
//! Cancellation is cooperative: the cancel signal is checked before and
//! raced against every permit acquisition, and re-checked after each stage
//! call returns. An in-flight collaborator call is never force-terminated,
//! and no partial booklet is ever persisted.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::alerts::{AlertSeverity, AlertSink};
use crate::analyzers::{
    BookletSynthesizer, ContextAnalyzer, DocumentationAnalyzer, PatternValidator,
};
use crate::assembler::assemble;
use crate::config::OrchestratorConfig;
use crate::domain::{
    BookletMetadata, Finding, PipelineError, PipelineOutcome, PipelineRequest, PipelineResult,
    RunState, StageName, StepTimings, PARSE_STEP,
};
use crate::metrics::METRICS;
use crate::obs;
use crate::parsers::ParserDispatcher;
use crate::persistence::BookletStore;

/// Snapshot of orchestrator capacity for status queries.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Configured cap on simultaneous stage calls across runs.
    pub concurrency_capacity: usize,

    /// Permits currently free; capacity minus in-flight stage calls.
    pub available_permits: usize,
}

/// Drives the parse → documentation → context → pattern-validation →
/// synthesis → persist chain for each invocation.
///
/// One instance may service many concurrent runs; the only state shared
/// between them is the semaphore counter and the atomic metrics.
pub struct ResearchOrchestrator {
    dispatcher: ParserDispatcher,
    documentation: Arc<dyn DocumentationAnalyzer>,
    context: Arc<dyn ContextAnalyzer>,
    patterns: Arc<dyn PatternValidator>,
    synthesizer: Arc<dyn BookletSynthesizer>,
    store: Arc<dyn BookletStore>,
    alerts: Arc<dyn AlertSink>,
    semaphore: Arc<Semaphore>,
    config: OrchestratorConfig,
}

impl ResearchOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        documentation: Arc<dyn DocumentationAnalyzer>,
        context: Arc<dyn ContextAnalyzer>,
        patterns: Arc<dyn PatternValidator>,
        synthesizer: Arc<dyn BookletSynthesizer>,
        store: Arc<dyn BookletStore>,
        alerts: Arc<dyn AlertSink>,
        config: OrchestratorConfig,
    ) -> Self {
        let capacity = config.max_concurrent_stage_calls.max(1);
        Self {
            dispatcher: ParserDispatcher::new(),
            documentation,
            context,
            patterns,
            synthesizer,
            store,
            alerts,
            semaphore: Arc::new(Semaphore::new(capacity)),
            config,
        }
    }

    /// Current capacity snapshot.
    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            concurrency_capacity: self.config.max_concurrent_stage_calls.max(1),
            available_permits: self.semaphore.available_permits(),
        }
    }

    /// Execute one full pipeline run.
    ///
    /// Every code path, including cancellation and unexpected internal
    /// failures, converts into a [`PipelineError`] — nothing escapes
    /// uncaught. Step timings are recorded regardless of outcome.
    pub async fn run(
        &self,
        request: PipelineRequest,
        cancel: watch::Receiver<bool>,
    ) -> PipelineResult<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        // Instrument the future rather than holding an entered span guard
        // across awaits; the run future must stay Send so callers can spawn
        // one task per run.
        let span = tracing::info_span!("buildsleuth.run", run_id = %run_id);
        self.run_inner(run_id, request, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        request: PipelineRequest,
        mut cancel: watch::Receiver<bool>,
    ) -> PipelineResult<PipelineOutcome> {
        let run_tag = run_id.to_string();

        METRICS.inc_runs_started();
        let total_start = Instant::now();
        let mut timings = StepTimings::new();

        let result = self
            .execute(run_id, &request, &mut cancel, &mut timings)
            .await;
        let total_duration_ms = total_start.elapsed().as_millis() as u64;

        match result {
            Ok((booklet, booklet_path)) => {
                METRICS.inc_runs_completed();
                obs::emit_run_finished(&run_tag, total_duration_ms, "COMPLETED");
                Ok(PipelineOutcome {
                    booklet,
                    booklet_path,
                    total_duration_ms,
                    step_timings: timings,
                })
            }
            Err(err) => {
                if err.is_cancelled() {
                    METRICS.inc_runs_cancelled();
                } else {
                    METRICS.inc_runs_failed();
                }
                obs::emit_run_finished(&run_tag, total_duration_ms, err.code());
                self.alerts.raise(
                    alert_severity(&err),
                    "orchestrator",
                    &err.to_string(),
                    serde_json::json!({
                        "run_id": run_tag,
                        "code": err.code(),
                        "step_timings": timings,
                    }),
                );
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        run_id: Uuid,
        request: &PipelineRequest,
        cancel: &mut watch::Receiver<bool>,
        timings: &mut StepTimings,
    ) -> PipelineResult<(crate::domain::ResearchBooklet, std::path::PathBuf)> {
        let run_tag = run_id.to_string();
        let mut state = RunState::NotStarted;

        // Step 1: parse. No concurrency slot is taken for parsing.
        let parse_start = Instant::now();
        let batch = self.dispatcher.parse_output(&request.raw_output);
        timings.insert(
            PARSE_STEP.to_string(),
            parse_start.elapsed().as_millis() as u64,
        );
        transition(&run_tag, &mut state, RunState::Parsed);

        if !batch.has_errors() {
            transition(&run_tag, &mut state, RunState::Failed);
            return Err(PipelineError::NoErrorsFound);
        }
        obs::emit_run_started(&run_tag, batch.error_count, batch.warning_count);

        let metadata = BookletMetadata {
            project_structure: request.project_structure.clone(),
            project_standards: request.project_standards.clone(),
            error_count: batch.error_count,
            warning_count: batch.warning_count,
        };

        // Stages 2-5: each acquires one permit, runs to completion, and
        // releases the permit before the next stage may start.
        transition(
            &run_tag,
            &mut state,
            RunState::StageRunning(StageName::Documentation),
        );
        let doc = self
            .run_stage(
                &run_tag,
                StageName::Documentation,
                cancel,
                timings,
                self.documentation.analyze(&batch, &request.code_context),
            )
            .await
            .map_err(|e| fail(&run_tag, &mut state, e))?;

        transition(
            &run_tag,
            &mut state,
            RunState::StageRunning(StageName::Context),
        );
        let ctx = self
            .run_stage(
                &run_tag,
                StageName::Context,
                cancel,
                timings,
                self.context.analyze(&batch, &doc, &request.code_context),
            )
            .await
            .map_err(|e| fail(&run_tag, &mut state, e))?;

        transition(
            &run_tag,
            &mut state,
            RunState::StageRunning(StageName::PatternValidation),
        );
        let pattern = self
            .run_stage(
                &run_tag,
                StageName::PatternValidation,
                cancel,
                timings,
                self.patterns.validate(&ctx, &request.project_standards),
            )
            .await
            .map_err(|e| fail(&run_tag, &mut state, e))?;

        let mut findings = vec![
            Finding::Documentation(doc),
            Finding::Context(ctx),
            Finding::PatternValidation(pattern),
        ];

        transition(
            &run_tag,
            &mut state,
            RunState::StageRunning(StageName::Synthesis),
        );
        let draft = self
            .run_stage(
                &run_tag,
                StageName::Synthesis,
                cancel,
                timings,
                self.synthesizer.synthesize(&batch, &findings, &metadata),
            )
            .await
            .map_err(|e| fail(&run_tag, &mut state, e))?;
        findings.push(Finding::SynthesisDraft(draft));

        // Assemble and persist. A cancel observed here still means no
        // artifact reaches disk.
        transition(&run_tag, &mut state, RunState::Persisting);
        if *cancel.borrow() {
            transition(&run_tag, &mut state, RunState::Cancelled);
            return Err(PipelineError::Cancelled);
        }

        let booklet = assemble(run_id, batch, findings, metadata);
        let path = self
            .store
            .save(&booklet, cancel)
            .await
            .map_err(|source| {
                fail(
                    &run_tag,
                    &mut state,
                    PipelineError::PersistenceFailed { source },
                )
            })?;

        METRICS.inc_booklets_persisted();
        obs::emit_booklet_persisted(&run_tag, &path);
        transition(&run_tag, &mut state, RunState::Completed);
        Ok((booklet, path))
    }

    /// Run one stage call under the cross-run concurrency cap.
    ///
    /// Acquires a permit (racing the cancel signal), applies the configured
    /// stage timeout at the collaborator boundary, releases the permit as
    /// soon as the call completes, and records the stage duration whether
    /// the call succeeded or not.
    async fn run_stage<T>(
        &self,
        run_tag: &str,
        stage: StageName,
        cancel: &mut watch::Receiver<bool>,
        timings: &mut StepTimings,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> PipelineResult<T> {
        if *cancel.borrow() {
            return Err(PipelineError::Cancelled);
        }

        let permit = tokio::select! {
            biased;
            _ = wait_cancelled(cancel) => return Err(PipelineError::Cancelled),
            permit = self.semaphore.acquire() => permit
                .map_err(|_| PipelineError::Internal(anyhow::anyhow!("semaphore closed")))?,
        };

        obs::emit_stage_started(run_tag, stage);
        let inflight = METRICS.stage_call_entered();
        let start = Instant::now();

        let result = if self.config.stage_timeout_secs > 0 {
            match tokio::time::timeout(
                Duration::from_secs(self.config.stage_timeout_secs),
                fut,
            )
            .await
            {
                Ok(inner) => inner,
                Err(_) => Err(anyhow::anyhow!(
                    "stage timed out after {}s",
                    self.config.stage_timeout_secs
                )),
            }
        } else {
            fut.await
        };

        // Release the slot before anything else so the next waiter (possibly
        // in another run) can proceed.
        drop(inflight);
        drop(permit);

        let duration_ms = start.elapsed().as_millis() as u64;
        timings.insert(stage.as_str().to_string(), duration_ms);
        obs::emit_stage_finished(run_tag, stage, duration_ms, result.is_ok());

        // A cancel triggered mid-stage surfaces once the call unwinds,
        // whether the call itself succeeded or failed.
        if *cancel.borrow() {
            return Err(PipelineError::Cancelled);
        }
        result.map_err(|source| PipelineError::StageFailed { stage, source })
    }
}

/// Resolves only when cancellation is signalled. If the sender side is
/// dropped, cancellation can no longer happen and this pends forever.
async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn transition(run_tag: &str, state: &mut RunState, next: RunState) {
    debug!(run_id = %run_tag, from = ?state, to = ?next, "run state transition");
    *state = next;
}

fn fail(run_tag: &str, state: &mut RunState, err: PipelineError) -> PipelineError {
    let terminal = if err.is_cancelled() {
        RunState::Cancelled
    } else {
        RunState::Failed
    };
    transition(run_tag, state, terminal);
    err
}

fn alert_severity(err: &PipelineError) -> AlertSeverity {
    match err {
        PipelineError::NoErrorsFound | PipelineError::Cancelled => AlertSeverity::Warning,
        _ => AlertSeverity::Critical,
    }
}
