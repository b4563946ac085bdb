//! buildsleuth core library
//!
//! Parses raw build-tool output into structured compiler errors, drives the
//! fixed four-stage research pipeline with a cross-run concurrency cap, and
//! assembles/persists the resulting research booklet.

pub mod alerts;
pub mod analyzers;
pub mod assembler;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod offline;
pub mod orchestrator;
pub mod parsers;
pub mod persistence;
pub mod telemetry;

pub use alerts::{AlertSeverity, AlertSink, TracingAlertSink};
pub use analyzers::{
    BookletSynthesizer, ContextAnalyzer, DocumentationAnalyzer, PatternValidator,
};
pub use assembler::assemble;
pub use config::OrchestratorConfig;
pub use domain::{
    BookletDraft, BookletMetadata, BookletSection, CompilerError, ContextFinding,
    DocumentationFinding, ErrorBatch, Finding, FindingKind, ParserSource,
    PatternValidationFinding, PipelineError, PipelineOutcome, PipelineRequest, PipelineResult,
    ResearchBooklet, RunState, Severity, SourceLocation, StageName, StepTimings, PARSE_STEP,
};
pub use metrics::METRICS;
pub use offline::{
    OfflineContextAnalyzer, OfflineDocumentationAnalyzer, OfflinePatternValidator,
    OfflineSynthesizer,
};
pub use orchestrator::{OrchestratorStatus, ResearchOrchestrator};
pub use parsers::{
    CSharpCompilerParser, ErrorParser, GeneralParser, MsBuildParser, NetSdkParser,
    ParserDispatcher,
};
pub use persistence::{booklet_digest, BookletStore, FsBookletStore};
pub use telemetry::init_tracing;

/// buildsleuth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
