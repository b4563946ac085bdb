//! Priority-ordered error parsers for raw build output.
//!
//! Each parser variant recognizes one toolchain's diagnostic format. The
//! dispatcher tries variants from most to least specific, so every line is
//! classified by exactly one parser; lines no variant recognizes are noise
//! and are silently dropped.

mod csharp;
mod general;
mod msbuild;
mod netsdk;

pub use csharp::CSharpCompilerParser;
pub use general::GeneralParser;
pub use msbuild::MsBuildParser;
pub use netsdk::NetSdkParser;

use crate::domain::{CompilerError, ErrorBatch, ParserSource};
use crate::metrics::METRICS;

/// One toolchain-specific line parser.
pub trait ErrorParser: Send + Sync {
    /// Which variant this is.
    fn source(&self) -> ParserSource;

    /// Dispatch priority; lower values are tried first.
    fn priority(&self) -> u8;

    /// Whether this parser recognizes the line.
    fn can_parse(&self, line: &str) -> bool;

    /// Parse a single recognized line. Returns `None` for lines that
    /// `can_parse` rejects.
    fn parse_line(&self, line: &str) -> Option<CompilerError>;

    /// Parse every recognized line in the input.
    fn parse_errors(&self, raw: &str) -> Vec<CompilerError> {
        raw.lines()
            .filter(|line| self.can_parse(line))
            .filter_map(|line| self.parse_line(line))
            .collect()
    }
}

/// Priority-ordered dispatcher over all parser variants.
pub struct ParserDispatcher {
    parsers: Vec<Box<dyn ErrorParser>>,
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserDispatcher {
    /// Dispatcher with the builtin variants, most specific first.
    pub fn new() -> Self {
        let mut parsers: Vec<Box<dyn ErrorParser>> = vec![
            Box::new(CSharpCompilerParser::new()),
            Box::new(MsBuildParser::new()),
            Box::new(NetSdkParser::new()),
            Box::new(GeneralParser::new()),
        ];
        parsers.sort_by_key(|p| p.priority());
        Self { parsers }
    }

    /// First parser (in priority order) that recognizes the line.
    pub fn select_parser(&self, line: &str) -> Option<&dyn ErrorParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(line))
            .map(|p| p.as_ref())
    }

    /// Classify every line of raw output into an [`ErrorBatch`].
    ///
    /// Each line is handled by at most one parser; unrecognized lines are
    /// dropped without error. Empty input yields an empty batch.
    pub fn parse_output(&self, raw: &str) -> ErrorBatch {
        let mut errors = Vec::new();
        for line in raw.lines() {
            if let Some(parser) = self.select_parser(line) {
                if let Some(err) = parser.parse_line(line) {
                    tracing::debug!(
                        code = %err.code,
                        severity = err.severity.as_str(),
                        parser = parser.source().as_str(),
                        "classified diagnostic line"
                    );
                    errors.push(err);
                }
            }
        }
        METRICS.add_errors_parsed(errors.len() as u64);
        ErrorBatch::from_errors(errors)
    }
}
