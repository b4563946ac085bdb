//! Stage findings: the structured results each analysis stage produces.
//!
//! Each finding variant is produced by exactly one stage. Later stages
//! consume upstream findings by reference and never mutate them.

use serde::{Deserialize, Serialize};

/// Documentation-analysis result for a batch (stage 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentationFinding {
    pub title: String,

    /// What the official documentation says about the diagnostic codes.
    pub content: String,

    /// Diagnostic codes this finding covers.
    pub error_codes: Vec<String>,

    /// Documentation URLs or citations.
    pub references: Vec<String>,
}

/// Code-context analysis result (stage 2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextFinding {
    pub title: String,

    /// How the errors relate to the surrounding code.
    pub content: String,

    /// Likely root causes, most probable first.
    pub probable_causes: Vec<String>,
}

/// Pattern-validation result against project standards (stage 3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternValidationFinding {
    pub title: String,

    pub content: String,

    /// Standards violations detected while validating the proposed direction.
    pub issues: Vec<String>,

    /// Whether the analyzed approach conforms to project standards.
    pub conforms: bool,
}

/// Synthesized booklet draft (stage 4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookletDraft {
    pub title: String,

    /// Executive summary of the whole batch.
    pub summary: String,

    /// Recommended resolution steps, in order.
    pub recommendations: Vec<String>,
}

/// A structured result produced by one pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    Documentation(DocumentationFinding),
    Context(ContextFinding),
    PatternValidation(PatternValidationFinding),
    SynthesisDraft(BookletDraft),
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::Documentation(_) => FindingKind::Documentation,
            Finding::Context(_) => FindingKind::Context,
            Finding::PatternValidation(_) => FindingKind::PatternValidation,
            Finding::SynthesisDraft(_) => FindingKind::SynthesisDraft,
        }
    }

    /// Title of the underlying finding.
    pub fn title(&self) -> &str {
        match self {
            Finding::Documentation(f) => &f.title,
            Finding::Context(f) => &f.title,
            Finding::PatternValidation(f) => &f.title,
            Finding::SynthesisDraft(f) => &f.title,
        }
    }
}

/// Discriminant for [`Finding`] with the fixed booklet section order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Documentation,
    Context,
    PatternValidation,
    SynthesisDraft,
}

impl FindingKind {
    /// Booklet section position, fixed by stage identity.
    ///
    /// Ordering is a property of which stage produced the finding, never of
    /// completion wall-clock time.
    pub fn section_order(&self) -> u8 {
        match self {
            FindingKind::Documentation => 0,
            FindingKind::Context => 1,
            FindingKind::PatternValidation => 2,
            FindingKind::SynthesisDraft => 3,
        }
    }

    /// Human-readable section heading.
    pub fn section_title(&self) -> &'static str {
        match self {
            FindingKind::Documentation => "Documentation Analysis",
            FindingKind::Context => "Context Analysis",
            FindingKind::PatternValidation => "Pattern Validation",
            FindingKind::SynthesisDraft => "Synthesis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order_is_fixed() {
        assert_eq!(FindingKind::Documentation.section_order(), 0);
        assert_eq!(FindingKind::Context.section_order(), 1);
        assert_eq!(FindingKind::PatternValidation.section_order(), 2);
        assert_eq!(FindingKind::SynthesisDraft.section_order(), 3);
    }

    #[test]
    fn test_finding_kind_matches_variant() {
        let finding = Finding::Documentation(DocumentationFinding {
            title: "CS0103".to_string(),
            content: "name does not exist".to_string(),
            error_codes: vec!["CS0103".to_string()],
            references: Vec::new(),
        });
        assert_eq!(finding.kind(), FindingKind::Documentation);
        assert_eq!(finding.title(), "CS0103");
    }

    #[test]
    fn test_finding_serde_roundtrip() {
        let finding = Finding::PatternValidation(PatternValidationFinding {
            title: "standards check".to_string(),
            content: "validated against project rules".to_string(),
            issues: vec!["missing canonical logging".to_string()],
            conforms: false,
        });
        let json = serde_json::to_string(&finding).expect("serialize");
        assert!(json.contains("\"kind\":\"pattern_validation\""));
        let back: Finding = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(finding, back);
    }
}
