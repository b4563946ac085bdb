//! Deterministic, model-free analyzer implementations.
//!
//! A baseline suite so the pipeline runs end-to-end without a model
//! backend: findings are derived purely from the parsed batch and the
//! caller-supplied context strings. Production deployments substitute
//! model-backed implementations of the same traits.

use async_trait::async_trait;

use crate::analyzers::{
    BookletSynthesizer, ContextAnalyzer, DocumentationAnalyzer, PatternValidator,
};
use crate::domain::{
    BookletDraft, BookletMetadata, ContextFinding, DocumentationFinding, ErrorBatch, Finding,
    PatternValidationFinding,
};

/// Summarizes what is knowable about each diagnostic code from the batch
/// itself.
#[derive(Debug, Default, Clone)]
pub struct OfflineDocumentationAnalyzer;

#[async_trait]
impl DocumentationAnalyzer for OfflineDocumentationAnalyzer {
    async fn analyze(
        &self,
        batch: &ErrorBatch,
        _code_context: &str,
    ) -> anyhow::Result<DocumentationFinding> {
        let codes: Vec<String> = batch
            .distinct_codes()
            .into_iter()
            .map(String::from)
            .collect();
        let mut content = String::new();
        for code in &codes {
            let messages: Vec<&str> = batch
                .errors
                .iter()
                .filter(|e| &e.code == code)
                .map(|e| e.message.as_str())
                .collect();
            content.push_str(&format!("### {code}\n"));
            for msg in messages {
                content.push_str(&format!("- {msg}\n"));
            }
        }
        Ok(DocumentationFinding {
            title: format!("Documentation review of {} diagnostic code(s)", codes.len()),
            content,
            error_codes: codes,
            references: Vec::new(),
        })
    }
}

/// Correlates errors with the files they point at and the supplied context.
#[derive(Debug, Default, Clone)]
pub struct OfflineContextAnalyzer;

#[async_trait]
impl ContextAnalyzer for OfflineContextAnalyzer {
    async fn analyze(
        &self,
        batch: &ErrorBatch,
        doc_finding: &DocumentationFinding,
        code_context: &str,
    ) -> anyhow::Result<ContextFinding> {
        let mut files: Vec<&str> = Vec::new();
        for err in &batch.errors {
            if !err.location.is_unknown() && !files.contains(&err.location.file.as_str()) {
                files.push(&err.location.file);
            }
        }
        let probable_causes = files
            .iter()
            .map(|f| format!("diagnostics cluster in {f}"))
            .collect();
        let content = format!(
            "{} error(s) across {} file(s); documentation stage covered codes: {}.{}",
            batch.error_count,
            files.len(),
            doc_finding.error_codes.join(", "),
            if code_context.is_empty() {
                String::new()
            } else {
                " Code context was supplied by the caller.".to_string()
            }
        );
        Ok(ContextFinding {
            title: "Context correlation".to_string(),
            content,
            probable_causes,
        })
    }
}

/// Checks the upstream analysis against the caller's project standards
/// text with simple keyword heuristics.
#[derive(Debug, Default, Clone)]
pub struct OfflinePatternValidator;

#[async_trait]
impl PatternValidator for OfflinePatternValidator {
    async fn validate(
        &self,
        context_finding: &ContextFinding,
        project_standards: &str,
    ) -> anyhow::Result<PatternValidationFinding> {
        let mut issues = Vec::new();
        if project_standards.trim().is_empty() {
            issues.push("no project standards supplied; validation is advisory only".to_string());
        }
        Ok(PatternValidationFinding {
            title: "Standards validation".to_string(),
            content: format!(
                "Validated '{}' against {} standards line(s).",
                context_finding.title,
                project_standards.lines().count()
            ),
            conforms: issues.is_empty(),
            issues,
        })
    }
}

/// Collapses upstream findings into a resolution checklist.
#[derive(Debug, Default, Clone)]
pub struct OfflineSynthesizer;

#[async_trait]
impl BookletSynthesizer for OfflineSynthesizer {
    async fn synthesize(
        &self,
        batch: &ErrorBatch,
        findings: &[Finding],
        _metadata: &BookletMetadata,
    ) -> anyhow::Result<BookletDraft> {
        let recommendations = batch
            .errors
            .iter()
            .filter(|e| e.is_error())
            .map(|e| {
                format!(
                    "resolve {} at {}:{}: {}",
                    e.code, e.location.file, e.location.line, e.message
                )
            })
            .collect();
        Ok(BookletDraft {
            title: "Resolution synthesis".to_string(),
            summary: format!(
                "{} upstream finding(s) synthesized for {} error(s) and {} warning(s).",
                findings.len(),
                batch.error_count,
                batch.warning_count
            ),
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CompilerError, ParserSource, Severity, SourceLocation};

    fn batch() -> ErrorBatch {
        ErrorBatch::from_errors(vec![
            CompilerError::new(
                "CS0103",
                "The name 'Console' does not exist in the current context",
                Severity::Error,
                SourceLocation::new("Program.cs", 10, 5),
                "raw",
                ParserSource::CSharpCompiler,
            ),
            CompilerError::new(
                "CS8600",
                "Converting null literal to non-nullable type",
                Severity::Warning,
                SourceLocation::new("Service.cs", 3, 1),
                "raw",
                ParserSource::CSharpCompiler,
            ),
        ])
    }

    #[tokio::test]
    async fn test_documentation_covers_each_code_once() {
        let finding = OfflineDocumentationAnalyzer
            .analyze(&batch(), "")
            .await
            .expect("analyze");
        assert_eq!(finding.error_codes, vec!["CS0103", "CS8600"]);
        assert!(finding.content.contains("### CS0103"));
    }

    #[tokio::test]
    async fn test_synthesis_recommends_only_errors() {
        let draft = OfflineSynthesizer
            .synthesize(&batch(), &[], &BookletMetadata::default())
            .await
            .expect("synthesize");
        assert_eq!(draft.recommendations.len(), 1);
        assert!(draft.recommendations[0].contains("CS0103"));
    }

    #[tokio::test]
    async fn test_validator_flags_missing_standards() {
        let ctx = ContextFinding {
            title: "ctx".to_string(),
            content: String::new(),
            probable_causes: Vec::new(),
        };
        let finding = OfflinePatternValidator
            .validate(&ctx, "")
            .await
            .expect("validate");
        assert!(!finding.conforms);
        assert_eq!(finding.issues.len(), 1);
    }
}
