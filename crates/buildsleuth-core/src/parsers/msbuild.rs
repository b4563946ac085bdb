//! Parser for build-system diagnostics (MSBnnnn codes).

use regex::Regex;

use crate::domain::{CompilerError, ParserSource, Severity, SourceLocation};

use super::ErrorParser;

/// Recognizes MSBuild engine diagnostics, with or without a file location:
/// `proj.csproj(12,3): error MSB3027: ...` or `MSBUILD : error MSB1009: ...`.
pub struct MsBuildParser {
    code: Regex,
    located: Regex,
    bare: Regex,
}

impl Default for MsBuildParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MsBuildParser {
    pub fn new() -> Self {
        Self {
            code: Regex::new(r"\bMSB\d{4}\b").expect("static regex"),
            located: Regex::new(
                r"^\s*(?P<file>[^(]+?)\((?P<line>\d+),(?P<col>\d+)\)\s*:\s*(?P<sev>error|warning)\s+(?P<code>MSB\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
            bare: Regex::new(
                r"\b(?P<sev>error|warning)\s+(?P<code>MSB\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
        }
    }
}

impl ErrorParser for MsBuildParser {
    fn source(&self) -> ParserSource {
        ParserSource::MsBuild
    }

    fn priority(&self) -> u8 {
        1
    }

    fn can_parse(&self, line: &str) -> bool {
        self.code.is_match(line)
    }

    fn parse_line(&self, line: &str) -> Option<CompilerError> {
        if let Some(caps) = self.located.captures(line) {
            return Some(CompilerError::new(
                &caps["code"],
                caps["msg"].trim(),
                severity_from(&caps["sev"]),
                SourceLocation::new(
                    caps["file"].trim(),
                    caps["line"].parse().unwrap_or(0),
                    caps["col"].parse().unwrap_or(0),
                ),
                line,
                ParserSource::MsBuild,
            ));
        }

        let caps = self.bare.captures(line)?;
        Some(CompilerError::new(
            &caps["code"],
            caps["msg"].trim(),
            severity_from(&caps["sev"]),
            SourceLocation::unknown(),
            line,
            ParserSource::MsBuild,
        ))
    }
}

fn severity_from(s: &str) -> Severity {
    if s.eq_ignore_ascii_case("warning") {
        Severity::Warning
    } else {
        Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_engine_error() {
        let parser = MsBuildParser::new();
        let line = "MSBUILD : error MSB1009: Project file does not exist.";
        assert!(parser.can_parse(line));

        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "MSB1009");
        assert_eq!(err.severity, Severity::Error);
        assert!(err.location.is_unknown());
    }

    #[test]
    fn test_parses_located_warning() {
        let parser = MsBuildParser::new();
        let line = "App.csproj(12,3): warning MSB3245: Could not resolve this reference.";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "MSB3245");
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.location.file, "App.csproj");
        assert_eq!(err.location.line, 12);
        assert_eq!(err.location.column, 3);
    }

    #[test]
    fn test_rejects_csharp_lines() {
        let parser = MsBuildParser::new();
        assert!(!parser.can_parse("Program.cs(10,5): error CS0103: missing name"));
    }
}
