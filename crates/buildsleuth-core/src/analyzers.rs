//! Collaborator traits for the four analysis stages.
//!
//! The orchestrator drives these interfaces without knowing anything about
//! prompt construction or model selection; production implementations wrap
//! a model backend, tests inject the stubs from [`crate::fakes`].
//!
//! All traits are async and backend-agnostic. Retry policy, if any, lives
//! inside each implementation — the orchestrator treats any `Err` as fatal
//! to the run.

use async_trait::async_trait;

use crate::domain::{
    BookletDraft, BookletMetadata, ContextFinding, DocumentationFinding, ErrorBatch, Finding,
    PatternValidationFinding,
};

/// Stage 1: research the official documentation for the batch's codes.
#[async_trait]
pub trait DocumentationAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        batch: &ErrorBatch,
        code_context: &str,
    ) -> anyhow::Result<DocumentationFinding>;
}

/// Stage 2: relate the errors to the surrounding code, informed by stage 1.
#[async_trait]
pub trait ContextAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        batch: &ErrorBatch,
        doc_finding: &DocumentationFinding,
        code_context: &str,
    ) -> anyhow::Result<ContextFinding>;
}

/// Stage 3: validate the emerging resolution against project standards.
#[async_trait]
pub trait PatternValidator: Send + Sync {
    async fn validate(
        &self,
        context_finding: &ContextFinding,
        project_standards: &str,
    ) -> anyhow::Result<PatternValidationFinding>;
}

/// Stage 4: synthesize all upstream findings into a booklet draft.
#[async_trait]
pub trait BookletSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        batch: &ErrorBatch,
        findings: &[Finding],
        metadata: &BookletMetadata,
    ) -> anyhow::Result<BookletDraft>;
}
