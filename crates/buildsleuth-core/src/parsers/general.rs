//! Generic fallback parser for unrecognized toolchains.

use regex::Regex;

use crate::domain::{CompilerError, ParserSource, Severity, SourceLocation};

use super::ErrorParser;

/// Fallback for diagnostic lines no specific variant claims.
///
/// Rejects any line carrying a `CS`/`MSB`/`NETSDK` code so that
/// classification stays mutually exclusive with the higher-priority
/// variants. Requires a `severity ...: message` shape so build summary
/// lines ("0 Warning(s)") stay out of the batch.
pub struct GeneralParser {
    reserved: Regex,
    pattern: Regex,
    located: Regex,
}

impl Default for GeneralParser {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralParser {
    pub fn new() -> Self {
        Self {
            reserved: Regex::new(r"\b(?:CS|MSB|NETSDK)\d{4}\b").expect("static regex"),
            pattern: Regex::new(
                r"(?i)\b(?P<sev>error|warning)\b(?:\s+(?P<code>[A-Z]{2,10}\d{2,6}))?\s*:\s*(?P<msg>.+)$",
            )
            .expect("static regex"),
            located: Regex::new(r"^\s*(?P<file>[^(:]+?)\((?P<line>\d+),(?P<col>\d+)\)")
                .expect("static regex"),
        }
    }
}

impl ErrorParser for GeneralParser {
    fn source(&self) -> ParserSource {
        ParserSource::General
    }

    fn priority(&self) -> u8 {
        3
    }

    fn can_parse(&self, line: &str) -> bool {
        !self.reserved.is_match(line) && self.pattern.is_match(line)
    }

    fn parse_line(&self, line: &str) -> Option<CompilerError> {
        if self.reserved.is_match(line) {
            return None;
        }
        let caps = self.pattern.captures(line)?;
        let severity = if caps["sev"].eq_ignore_ascii_case("warning") {
            Severity::Warning
        } else {
            Severity::Error
        };
        let code = caps
            .name("code")
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string());
        let location = match self.located.captures(line) {
            Some(loc) => SourceLocation::new(
                loc["file"].trim(),
                loc["line"].parse().unwrap_or(0),
                loc["col"].parse().unwrap_or(0),
            ),
            None => SourceLocation::unknown(),
        };
        Some(CompilerError::new(
            code,
            caps["msg"].trim(),
            severity,
            location,
            line,
            ParserSource::General,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_unrecognized_toolchain_error() {
        let parser = GeneralParser::new();
        let line = "clang: error LNK2019: unresolved external symbol";
        assert!(parser.can_parse(line));

        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "LNK2019");
        assert_eq!(err.severity, Severity::Error);
        assert!(err.location.is_unknown());
    }

    #[test]
    fn test_parses_codeless_error_line() {
        let parser = GeneralParser::new();
        let line = "error: linker command failed with exit code 1";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "UNKNOWN");
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn test_rejects_reserved_code_prefixes() {
        let parser = GeneralParser::new();
        assert!(!parser.can_parse(
            "Program.cs(10,5): error CS0103: The name 'Console' does not exist"
        ));
        assert!(!parser.can_parse("MSBUILD : error MSB1009: Project file does not exist."));
        assert!(!parser.can_parse("app.csproj : error NETSDK1045: unsupported target"));
    }

    #[test]
    fn test_rejects_summary_and_noise_lines() {
        let parser = GeneralParser::new();
        assert!(!parser.can_parse("    0 Warning(s)"));
        assert!(!parser.can_parse("    2 Error(s)"));
        assert!(!parser.can_parse("Build FAILED."));
        assert!(!parser.can_parse(""));
    }

    #[test]
    fn test_picks_up_location_when_present() {
        let parser = GeneralParser::new();
        let line = "main.rs(7,12): warning RUSTW01: unused variable";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.location.file, "main.rs");
        assert_eq!(err.location.line, 7);
        assert_eq!(err.location.column, 12);
        assert_eq!(err.severity, Severity::Warning);
    }
}
