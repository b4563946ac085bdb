//! Domain model for buildsleuth: parsed errors, findings, booklets, runs.

pub mod batch;
pub mod booklet;
pub mod compiler_error;
pub mod error;
pub mod finding;
pub mod run;

pub use batch::ErrorBatch;
pub use booklet::{BookletMetadata, BookletSection, ResearchBooklet};
pub use compiler_error::{CompilerError, ParserSource, Severity, SourceLocation};
pub use error::{PipelineError, PipelineResult};
pub use finding::{
    BookletDraft, ContextFinding, DocumentationFinding, Finding, FindingKind,
    PatternValidationFinding,
};
pub use run::{
    PipelineOutcome, PipelineRequest, RunState, StageName, StepTimings, PARSE_STEP,
};
