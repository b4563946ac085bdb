//! Pipeline failure taxonomy.

use super::run::StageName;

/// Errors a pipeline run can surface.
///
/// Every code path in the orchestrator, including cancellation and
/// unexpected internal errors, converts into one of these variants before
/// returning to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The parsed batch contained no error-severity entries.
    #[error("no error-severity entries found in build output")]
    NoErrorsFound,

    /// A stage broke the dependency chain; remaining stages were aborted.
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        stage: StageName,
        #[source]
        source: anyhow::Error,
    },

    /// The run was cancelled cooperatively.
    #[error("pipeline run was cancelled")]
    Cancelled,

    /// Findings exist but the booklet could not be saved.
    #[error("booklet persistence failed: {source}")]
    PersistenceFailed {
        #[source]
        source: anyhow::Error,
    },

    /// Unexpected internal failure.
    #[error("internal pipeline error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::NoErrorsFound => "NO_ERRORS_FOUND",
            PipelineError::StageFailed { stage, .. } => stage.failure_code(),
            PipelineError::Cancelled => "CANCELLED",
            PipelineError::PersistenceFailed { .. } => "PERSISTENCE_FAILED",
            PipelineError::Internal(_) => "INTERNAL",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled)
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_codes() {
        assert_eq!(PipelineError::NoErrorsFound.code(), "NO_ERRORS_FOUND");
        assert_eq!(PipelineError::Cancelled.code(), "CANCELLED");
        assert_eq!(
            PipelineError::PersistenceFailed {
                source: anyhow::anyhow!("disk full"),
            }
            .code(),
            "PERSISTENCE_FAILED"
        );
        assert_eq!(
            PipelineError::StageFailed {
                stage: StageName::Context,
                source: anyhow::anyhow!("model unavailable"),
            }
            .code(),
            "CONTEXT_ANALYSIS_FAILED"
        );
    }

    #[test]
    fn test_stage_failure_display_names_the_stage() {
        let err = PipelineError::StageFailed {
            stage: StageName::PatternValidation,
            source: anyhow::anyhow!("timed out"),
        };
        let msg = err.to_string();
        assert!(msg.contains("pattern_validation"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_cancelled_predicate() {
        assert!(PipelineError::Cancelled.is_cancelled());
        assert!(!PipelineError::NoErrorsFound.is_cancelled());
    }
}
