//! Ordered batches of parsed build errors.

use serde::{Deserialize, Serialize};

use super::compiler_error::{CompilerError, Severity};

/// An ordered batch of parsed compiler errors with derived counts.
///
/// The pipeline only proceeds when the batch contains at least one
/// error-severity entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBatch {
    /// Entries in the order they appeared in the raw output.
    pub errors: Vec<CompilerError>,

    /// Count of error-severity entries.
    pub error_count: usize,

    /// Count of warning-severity entries.
    pub warning_count: usize,
}

impl ErrorBatch {
    /// Build a batch from parsed entries, deriving severity counts.
    pub fn from_errors(errors: Vec<CompilerError>) -> Self {
        let error_count = errors.iter().filter(|e| e.is_error()).count();
        let warning_count = errors
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count();
        Self {
            errors,
            error_count,
            warning_count,
        }
    }

    /// Whether the batch contains at least one error-severity entry.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Total number of entries (errors and warnings).
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Distinct diagnostic codes in first-seen order.
    pub fn distinct_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = Vec::new();
        for err in &self.errors {
            if !codes.contains(&err.code.as_str()) {
                codes.push(&err.code);
            }
        }
        codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compiler_error::{ParserSource, SourceLocation};

    fn entry(code: &str, severity: Severity) -> CompilerError {
        CompilerError::new(
            code,
            "message",
            severity,
            SourceLocation::unknown(),
            "raw",
            ParserSource::General,
        )
    }

    #[test]
    fn test_counts_derived_from_entries() {
        let batch = ErrorBatch::from_errors(vec![
            entry("CS0103", Severity::Error),
            entry("CS0246", Severity::Error),
            entry("CS8600", Severity::Warning),
        ]);
        assert_eq!(batch.error_count, 2);
        assert_eq!(batch.warning_count, 1);
        assert_eq!(batch.len(), 3);
        assert!(batch.has_errors());
    }

    #[test]
    fn test_warning_only_batch_has_no_errors() {
        let batch = ErrorBatch::from_errors(vec![entry("CS8600", Severity::Warning)]);
        assert!(!batch.has_errors());
        assert_eq!(batch.error_count, 0);
        assert_eq!(batch.warning_count, 1);
    }

    #[test]
    fn test_empty_batch() {
        let batch = ErrorBatch::from_errors(Vec::new());
        assert!(batch.is_empty());
        assert!(!batch.has_errors());
    }

    #[test]
    fn test_distinct_codes_preserve_order() {
        let batch = ErrorBatch::from_errors(vec![
            entry("CS0103", Severity::Error),
            entry("CS0246", Severity::Error),
            entry("CS0103", Severity::Error),
        ]);
        assert_eq!(batch.distinct_codes(), vec!["CS0103", "CS0246"]);
    }
}
