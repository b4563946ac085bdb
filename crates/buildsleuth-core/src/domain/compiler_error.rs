//! Structured compiler error types.

use serde::{Deserialize, Serialize};

/// Severity level for a parsed build entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Stable name used in log fields and booklet sections.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Which parser variant classified a line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParserSource {
    /// Language compiler diagnostics (CSnnnn codes).
    CSharpCompiler,
    /// Build system diagnostics (MSBnnnn codes).
    MsBuild,
    /// SDK toolchain diagnostics (NETSDKnnnn codes).
    NetSdk,
    /// Generic fallback for unrecognized toolchains.
    General,
}

impl ParserSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserSource::CSharpCompiler => "csharp_compiler",
            ParserSource::MsBuild => "msbuild",
            ParserSource::NetSdk => "netsdk",
            ParserSource::General => "general",
        }
    }
}

/// Source location of a diagnostic.
///
/// Lines that match a code pattern but carry no location information get
/// the [`SourceLocation::unknown`] sentinel instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file path as reported by the tool.
    pub file: String,

    /// Line number (1-indexed, 0 = unknown).
    pub line: u32,

    /// Column number (1-indexed, 0 = unknown).
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Sentinel for diagnostics with no usable location.
    pub fn unknown() -> Self {
        Self {
            file: "Unknown".to_string(),
            line: 0,
            column: 0,
        }
    }

    /// Whether this is the unknown-location sentinel.
    pub fn is_unknown(&self) -> bool {
        self.file == "Unknown" && self.line == 0 && self.column == 0
    }
}

/// One immutable parsed build error or warning.
///
/// Created once during parsing and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CompilerError {
    /// Diagnostic code (e.g. "CS0103", "MSB1009").
    pub code: String,

    /// Human-readable message.
    pub message: String,

    /// Severity level.
    pub severity: Severity,

    /// Where the diagnostic points.
    pub location: SourceLocation,

    /// The original raw line this entry was parsed from.
    pub raw_text: String,

    /// Which parser variant classified this line.
    pub source: ParserSource,
}

impl CompilerError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        location: SourceLocation,
        raw_text: impl Into<String>,
        source: ParserSource,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
            location,
            raw_text: raw_text.into(),
            source,
        }
    }

    /// Whether this entry has error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_severity_serde() {
        for sev in [Severity::Warning, Severity::Error] {
            let json = serde_json::to_string(&sev).expect("serialize");
            let back: Severity = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(sev, back);
        }
    }

    #[test]
    fn test_unknown_location_sentinel() {
        let loc = SourceLocation::unknown();
        assert!(loc.is_unknown());
        assert_eq!(loc.file, "Unknown");
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);

        let real = SourceLocation::new("Program.cs", 10, 5);
        assert!(!real.is_unknown());
    }

    #[test]
    fn test_compiler_error_serde_roundtrip() {
        let err = CompilerError::new(
            "CS0103",
            "The name 'Console' does not exist in the current context",
            Severity::Error,
            SourceLocation::new("Program.cs", 10, 5),
            "Program.cs(10,5): error CS0103: The name 'Console' does not exist in the current context",
            ParserSource::CSharpCompiler,
        );
        let json = serde_json::to_string(&err).expect("serialize");
        let back: CompilerError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(err, back);
        assert!(err.is_error());
    }
}
