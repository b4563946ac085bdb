//! The research booklet: the final artifact produced for one error batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::batch::ErrorBatch;
use super::finding::{Finding, FindingKind};

/// Project metadata captured alongside the findings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookletMetadata {
    /// Project structure description supplied by the caller.
    pub project_structure: String,

    /// Project standards the pattern validation stage ran against.
    pub project_standards: String,

    /// Error-severity entry count from the batch.
    pub error_count: usize,

    /// Warning-severity entry count from the batch.
    pub warning_count: usize,
}

/// One rendered section of the booklet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookletSection {
    /// Which stage produced this section.
    pub kind: FindingKind,

    /// Section heading.
    pub title: String,

    /// Section body.
    pub content: String,
}

/// The final aggregated research artifact for one error batch.
///
/// Immutable once assembled. Section order is fixed by stage identity:
/// documentation, context, pattern-validation, synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchBooklet {
    /// Identifier of the pipeline run that produced this booklet.
    pub id: Uuid,

    pub created_at: DateTime<Utc>,

    /// The parsed errors this booklet researches.
    pub original_errors: ErrorBatch,

    /// All findings in fixed stage order.
    pub findings: Vec<Finding>,

    /// Rendered sections in fixed stage order.
    pub sections: Vec<BookletSection>,

    pub metadata: BookletMetadata,
}

impl ResearchBooklet {
    /// Render the booklet as a human-readable markdown document.
    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Research Booklet {}\n\n", self.id));
        out.push_str(&format!(
            "Generated: {}\n\nErrors: {} | Warnings: {}\n\n",
            self.created_at.to_rfc3339(),
            self.metadata.error_count,
            self.metadata.warning_count
        ));

        out.push_str("## Original Errors\n\n");
        for err in &self.original_errors.errors {
            out.push_str(&format!(
                "- `{}` [{}] {} ({}:{}:{})\n",
                err.code,
                err.severity.as_str(),
                err.message,
                err.location.file,
                err.location.line,
                err.location.column
            ));
        }
        out.push('\n');

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.content));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compiler_error::{
        CompilerError, ParserSource, Severity, SourceLocation,
    };
    use crate::domain::finding::DocumentationFinding;

    #[test]
    fn test_render_markdown_includes_errors_and_sections() {
        let batch = ErrorBatch::from_errors(vec![CompilerError::new(
            "CS0103",
            "The name 'Console' does not exist in the current context",
            Severity::Error,
            SourceLocation::new("Program.cs", 10, 5),
            "raw",
            ParserSource::CSharpCompiler,
        )]);
        let booklet = ResearchBooklet {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            metadata: BookletMetadata {
                project_structure: String::new(),
                project_standards: String::new(),
                error_count: batch.error_count,
                warning_count: batch.warning_count,
            },
            original_errors: batch,
            findings: vec![Finding::Documentation(DocumentationFinding {
                title: "CS0103 documentation".to_string(),
                content: "missing using directive".to_string(),
                error_codes: vec!["CS0103".to_string()],
                references: Vec::new(),
            })],
            sections: vec![BookletSection {
                kind: FindingKind::Documentation,
                title: "Documentation Analysis".to_string(),
                content: "missing using directive".to_string(),
            }],
        };

        let md = booklet.render_markdown();
        assert!(md.contains("`CS0103`"));
        assert!(md.contains("Program.cs:10:5"));
        assert!(md.contains("## Documentation Analysis"));
        assert!(md.contains("missing using directive"));
    }
}
