//! Fire-and-forget alerting for pipeline failures.

use serde_json::Value;

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

/// Sink for pipeline alerts. Implementations must never block or fail the
/// caller; raising an alert is fire-and-forget.
pub trait AlertSink: Send + Sync {
    fn raise(&self, severity: AlertSeverity, source: &str, message: &str, context: Value);
}

/// Default sink that forwards alerts to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingAlertSink;

impl AlertSink for TracingAlertSink {
    fn raise(&self, severity: AlertSeverity, source: &str, message: &str, context: Value) {
        match severity {
            AlertSeverity::Critical => {
                tracing::error!(alert = severity.as_str(), source = %source, context = %context, "{message}");
            }
            AlertSeverity::Warning => {
                tracing::warn!(alert = severity.as_str(), source = %source, context = %context, "{message}");
            }
            AlertSeverity::Info => {
                tracing::info!(alert = severity.as_str(), source = %source, context = %context, "{message}");
            }
        }
    }
}
