//! Parser for C# compiler diagnostics (CSnnnn codes).

use regex::Regex;

use crate::domain::{CompilerError, ParserSource, Severity, SourceLocation};

use super::ErrorParser;

/// Recognizes `file(line,col): severity CSnnnn: message` lines as well as
/// bare `severity CSnnnn: message` lines without location info.
pub struct CSharpCompilerParser {
    code: Regex,
    located: Regex,
    bare: Regex,
}

impl Default for CSharpCompilerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CSharpCompilerParser {
    pub fn new() -> Self {
        Self {
            code: Regex::new(r"\bCS\d{4}\b").expect("static regex"),
            located: Regex::new(
                r"^\s*(?P<file>[^(]+?)\((?P<line>\d+),(?P<col>\d+)\)\s*:\s*(?P<sev>error|warning)\s+(?P<code>CS\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
            bare: Regex::new(
                r"\b(?P<sev>error|warning)\s+(?P<code>CS\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
        }
    }
}

impl ErrorParser for CSharpCompilerParser {
    fn source(&self) -> ParserSource {
        ParserSource::CSharpCompiler
    }

    fn priority(&self) -> u8 {
        0
    }

    fn can_parse(&self, line: &str) -> bool {
        self.code.is_match(line)
    }

    fn parse_line(&self, line: &str) -> Option<CompilerError> {
        if let Some(caps) = self.located.captures(line) {
            let severity = severity_from(&caps["sev"]);
            let location = SourceLocation::new(
                caps["file"].trim(),
                caps["line"].parse().unwrap_or(0),
                caps["col"].parse().unwrap_or(0),
            );
            return Some(CompilerError::new(
                &caps["code"],
                caps["msg"].trim(),
                severity,
                location,
                line,
                ParserSource::CSharpCompiler,
            ));
        }

        // Code present but no usable location.
        let caps = self.bare.captures(line)?;
        Some(CompilerError::new(
            &caps["code"],
            caps["msg"].trim(),
            severity_from(&caps["sev"]),
            SourceLocation::unknown(),
            line,
            ParserSource::CSharpCompiler,
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
    fn test_parses_located_error() {
        let parser = CSharpCompilerParser::new();
        let line =
            "Program.cs(10,5): error CS0103: The name 'Console' does not exist in the current context";
        assert!(parser.can_parse(line));

        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "CS0103");
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.location.file, "Program.cs");
        assert_eq!(err.location.line, 10);
        assert_eq!(err.location.column, 5);
        assert_eq!(
            err.message,
            "The name 'Console' does not exist in the current context"
        );
        assert_eq!(err.raw_text, line);
    }

    #[test]
    fn test_parses_warning_severity() {
        let parser = CSharpCompilerParser::new();
        let line = "Service.cs(3,1): warning CS8600: Converting null literal to non-nullable type.";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.severity, Severity::Warning);
        assert_eq!(err.code, "CS8600");
    }

    #[test]
    fn test_code_without_location_gets_unknown_sentinel() {
        let parser = CSharpCompilerParser::new();
        let line = "CSC : error CS5001: Program does not contain a static 'Main' method";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "CS5001");
        assert!(err.location.is_unknown());
    }

    #[test]
    fn test_rejects_non_csharp_lines() {
        let parser = CSharpCompilerParser::new();
        assert!(!parser.can_parse("MSBUILD : error MSB1009: Project file does not exist."));
        assert!(!parser.can_parse("Build started."));
    }
}
