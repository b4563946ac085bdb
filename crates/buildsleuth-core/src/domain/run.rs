//! Per-run pipeline types: request, stage identity, state machine, outcome.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::booklet::ResearchBooklet;

/// Inputs for one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Raw build-tool output to parse.
    pub raw_output: String,

    /// Source code surrounding the failure.
    pub code_context: String,

    /// Project layout description.
    pub project_structure: String,

    /// Broader codebase summary handed to synthesis.
    pub project_codebase: String,

    /// Project coding standards for pattern validation.
    pub project_standards: String,
}

/// The four fixed analysis stages, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Documentation,
    Context,
    PatternValidation,
    Synthesis,
}

impl StageName {
    /// All stages in execution order.
    pub const ALL: [StageName; 4] = [
        StageName::Documentation,
        StageName::Context,
        StageName::PatternValidation,
        StageName::Synthesis,
    ];

    /// Stable stage name used for timing keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Documentation => "documentation_analysis",
            StageName::Context => "context_analysis",
            StageName::PatternValidation => "pattern_validation",
            StageName::Synthesis => "synthesis",
        }
    }

    /// Failure code for a run broken by this stage.
    pub fn failure_code(&self) -> &'static str {
        match self {
            StageName::Documentation => "DOCUMENTATION_ANALYSIS_FAILED",
            StageName::Context => "CONTEXT_ANALYSIS_FAILED",
            StageName::PatternValidation => "PATTERN_VALIDATION_FAILED",
            StageName::Synthesis => "SYNTHESIS_FAILED",
        }
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline run states. Terminal states are Completed, Failed, Cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Parsed,
    StageRunning(StageName),
    Persisting,
    Completed,
    Failed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Cancelled
        )
    }
}

/// Wall-clock durations per named step, recorded regardless of outcome.
///
/// Keys are `parse_errors` plus the [`StageName`] strings.
pub type StepTimings = BTreeMap<String, u64>;

/// Timing key for the parse step.
pub const PARSE_STEP: &str = "parse_errors";

/// Successful pipeline result handed back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// The assembled booklet.
    pub booklet: ResearchBooklet,

    /// Where the booklet was persisted.
    pub booklet_path: PathBuf,

    /// Total wall-clock duration in milliseconds.
    pub total_duration_ms: u64,

    /// Per-step durations in milliseconds.
    pub step_timings: StepTimings,
}
