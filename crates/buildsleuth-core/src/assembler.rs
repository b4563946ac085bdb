//! Pure booklet assembly from an error batch and stage findings.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    BookletMetadata, BookletSection, ErrorBatch, Finding, ResearchBooklet,
};

/// Assemble the final booklet from parsed errors and stage findings.
///
/// Deterministic: sections follow [`FindingKind::section_order`]
/// (documentation, context, pattern-validation, synthesis) regardless of
/// the order findings arrive in or when each stage completed.
///
/// [`FindingKind::section_order`]: crate::domain::FindingKind::section_order
pub fn assemble(
    run_id: Uuid,
    batch: ErrorBatch,
    mut findings: Vec<Finding>,
    mut metadata: BookletMetadata,
) -> ResearchBooklet {
    findings.sort_by_key(|f| f.kind().section_order());

    let sections: Vec<BookletSection> = findings
        .iter()
        .map(|finding| BookletSection {
            kind: finding.kind(),
            title: finding.kind().section_title().to_string(),
            content: render_finding(finding),
        })
        .collect();

    metadata.error_count = batch.error_count;
    metadata.warning_count = batch.warning_count;

    ResearchBooklet {
        id: run_id,
        created_at: Utc::now(),
        original_errors: batch,
        findings,
        sections,
        metadata,
    }
}

fn render_finding(finding: &Finding) -> String {
    match finding {
        Finding::Documentation(f) => {
            let mut out = f.content.clone();
            if !f.references.is_empty() {
                out.push_str("\n\nReferences:\n");
                for r in &f.references {
                    out.push_str(&format!("- {r}\n"));
                }
            }
            out
        }
        Finding::Context(f) => {
            let mut out = f.content.clone();
            if !f.probable_causes.is_empty() {
                out.push_str("\n\nProbable causes:\n");
                for c in &f.probable_causes {
                    out.push_str(&format!("- {c}\n"));
                }
            }
            out
        }
        Finding::PatternValidation(f) => {
            let mut out = f.content.clone();
            if !f.issues.is_empty() {
                out.push_str("\n\nIssues:\n");
                for issue in &f.issues {
                    out.push_str(&format!("- {issue}\n"));
                }
            }
            out
        }
        Finding::SynthesisDraft(f) => {
            let mut out = f.summary.clone();
            if !f.recommendations.is_empty() {
                out.push_str("\n\nRecommendations:\n");
                for (i, rec) in f.recommendations.iter().enumerate() {
                    out.push_str(&format!("{}. {rec}\n", i + 1));
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BookletDraft, CompilerError, ContextFinding, DocumentationFinding, FindingKind,
        ParserSource, PatternValidationFinding, Severity, SourceLocation,
    };

    fn batch() -> ErrorBatch {
        ErrorBatch::from_errors(vec![CompilerError::new(
            "CS0103",
            "missing name",
            Severity::Error,
            SourceLocation::unknown(),
            "raw",
            ParserSource::CSharpCompiler,
        )])
    }

    fn all_findings_shuffled() -> Vec<Finding> {
        vec![
            Finding::SynthesisDraft(BookletDraft {
                title: "synthesis".to_string(),
                summary: "do the fix".to_string(),
                recommendations: vec!["add using directive".to_string()],
            }),
            Finding::Documentation(DocumentationFinding {
                title: "docs".to_string(),
                content: "docs body".to_string(),
                error_codes: vec!["CS0103".to_string()],
                references: vec!["https://learn.microsoft.com/CS0103".to_string()],
            }),
            Finding::PatternValidation(PatternValidationFinding {
                title: "patterns".to_string(),
                content: "patterns body".to_string(),
                issues: Vec::new(),
                conforms: true,
            }),
            Finding::Context(ContextFinding {
                title: "context".to_string(),
                content: "context body".to_string(),
                probable_causes: vec!["missing import".to_string()],
            }),
        ]
    }

    #[test]
    fn test_sections_follow_stage_order_not_arrival_order() {
        let booklet = assemble(
            Uuid::new_v4(),
            batch(),
            all_findings_shuffled(),
            BookletMetadata::default(),
        );
        let kinds: Vec<FindingKind> = booklet.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FindingKind::Documentation,
                FindingKind::Context,
                FindingKind::PatternValidation,
                FindingKind::SynthesisDraft,
            ]
        );
        // findings are reordered the same way
        let finding_kinds: Vec<FindingKind> =
            booklet.findings.iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, finding_kinds);
    }

    #[test]
    fn test_metadata_counts_come_from_batch() {
        let booklet = assemble(
            Uuid::new_v4(),
            batch(),
            Vec::new(),
            BookletMetadata {
                project_structure: "layout".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(booklet.metadata.error_count, 1);
        assert_eq!(booklet.metadata.warning_count, 0);
        assert_eq!(booklet.metadata.project_structure, "layout");
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let id = Uuid::new_v4();
        let a = assemble(id, batch(), all_findings_shuffled(), BookletMetadata::default());
        let b = assemble(id, batch(), all_findings_shuffled(), BookletMetadata::default());
        assert_eq!(a.sections, b.sections);
        assert_eq!(a.findings, b.findings);
    }

    #[test]
    fn test_section_bodies_carry_lists() {
        let booklet = assemble(
            Uuid::new_v4(),
            batch(),
            all_findings_shuffled(),
            BookletMetadata::default(),
        );
        let doc = &booklet.sections[0];
        assert!(doc.content.contains("docs body"));
        assert!(doc.content.contains("https://learn.microsoft.com/CS0103"));
        let synth = &booklet.sections[3];
        assert!(synth.content.contains("1. add using directive"));
    }
}
