//! Parser for SDK toolchain diagnostics (NETSDKnnnn codes).

use regex::Regex;

use crate::domain::{CompilerError, ParserSource, Severity, SourceLocation};

use super::ErrorParser;

/// Recognizes .NET SDK diagnostics. SDK messages usually carry a project
/// file prefix without line/column (`app.csproj : error NETSDK1045: ...`),
/// so the location keeps the file when present and sentinels line/column.
/// Prefixes the anchored pattern cannot claim (Windows drive-letter paths
/// contain a colon) fall back to the unknown-location sentinel instead of
/// dropping the diagnostic.
pub struct NetSdkParser {
    code: Regex,
    pattern: Regex,
    bare: Regex,
}

impl Default for NetSdkParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NetSdkParser {
    pub fn new() -> Self {
        Self {
            code: Regex::new(r"\bNETSDK\d{4}\b").expect("static regex"),
            pattern: Regex::new(
                r"^\s*(?:(?P<file>[^:()]+?)\s*:\s*)?(?P<sev>error|warning)\s+(?P<code>NETSDK\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
            bare: Regex::new(
                r"\b(?P<sev>error|warning)\s+(?P<code>NETSDK\d{4})\s*:\s*(?P<msg>.*)$",
            )
            .expect("static regex"),
        }
    }
}

impl ErrorParser for NetSdkParser {
    fn source(&self) -> ParserSource {
        ParserSource::NetSdk
    }

    fn priority(&self) -> u8 {
        2
    }

    fn can_parse(&self, line: &str) -> bool {
        self.code.is_match(line)
    }

    fn parse_line(&self, line: &str) -> Option<CompilerError> {
        if let Some(caps) = self.pattern.captures(line) {
            let location = match caps.name("file") {
                Some(file) if !file.as_str().trim().is_empty() => {
                    SourceLocation::new(file.as_str().trim(), 0, 0)
                }
                _ => SourceLocation::unknown(),
            };
            return Some(CompilerError::new(
                &caps["code"],
                caps["msg"].trim(),
                severity_from(&caps["sev"]),
                location,
                line,
                ParserSource::NetSdk,
            ));
        }

        // Code present but the prefix is unparseable as a plain file path.
        let caps = self.bare.captures(line)?;
        Some(CompilerError::new(
            &caps["code"],
            caps["msg"].trim(),
            severity_from(&caps["sev"]),
            SourceLocation::unknown(),
            line,
            ParserSource::NetSdk,
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
    fn test_parses_sdk_error_with_project_prefix() {
        let parser = NetSdkParser::new();
        let line = "app.csproj : error NETSDK1045: The current .NET SDK does not support targeting .NET 9.0.";
        assert!(parser.can_parse(line));

        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "NETSDK1045");
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.location.file, "app.csproj");
        assert_eq!(err.location.line, 0);
    }

    #[test]
    fn test_parses_bare_sdk_warning() {
        let parser = NetSdkParser::new();
        let line = "warning NETSDK1138: The target framework is out of support.";
        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "NETSDK1138");
        assert_eq!(err.severity, Severity::Warning);
        assert!(err.location.is_unknown());
    }

    #[test]
    fn test_windows_drive_path_keeps_diagnostic_with_unknown_location() {
        let parser = NetSdkParser::new();
        let line = r"C:\app\app.csproj : error NETSDK1045: The current .NET SDK does not support targeting .NET 9.0.";
        assert!(parser.can_parse(line));

        let err = parser.parse_line(line).expect("parsed");
        assert_eq!(err.code, "NETSDK1045");
        assert_eq!(err.severity, Severity::Error);
        assert!(err.location.is_unknown());
    }

    #[test]
    fn test_rejects_msbuild_lines() {
        let parser = NetSdkParser::new();
        assert!(!parser.can_parse("MSBUILD : error MSB1009: Project file does not exist."));
    }
}
