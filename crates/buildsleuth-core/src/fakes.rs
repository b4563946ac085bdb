//! In-memory fakes for pipeline collaborators (testing only)
//!
//! Provides stub analyzers with configurable delay and failure injection,
//! a `MemoryBookletStore`, a `MemoryAlertSink`, and two probes:
//! [`CallLog`] records start/end instants per stage call (for ordering
//! assertions) and [`InflightProbe`] tracks the peak number of
//! simultaneously running stage calls (for concurrency-cap assertions).

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::alerts::{AlertSeverity, AlertSink};
use crate::analyzers::{
    BookletSynthesizer, ContextAnalyzer, DocumentationAnalyzer, PatternValidator,
};
use crate::domain::{
    BookletDraft, BookletMetadata, ContextFinding, DocumentationFinding, ErrorBatch, Finding,
    PatternValidationFinding, ResearchBooklet, StageName,
};
use crate::persistence::BookletStore;

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// One recorded stage call.
#[derive(Debug, Clone, Copy)]
pub struct CallRecord {
    pub stage: StageName,
    pub started_at: Instant,
    pub ended_at: Instant,
}

/// Records every stage call's start and end instants.
#[derive(Debug, Default)]
pub struct CallLog {
    entries: Mutex<Vec<CallRecord>>,
}

impl CallLog {
    pub fn record(&self, stage: StageName, started_at: Instant, ended_at: Instant) {
        self.entries.lock().unwrap().push(CallRecord {
            stage,
            started_at,
            ended_at,
        });
    }

    pub fn entries(&self) -> Vec<CallRecord> {
        self.entries.lock().unwrap().clone()
    }

    pub fn calls_for(&self, stage: StageName) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.stage == stage)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

/// Tracks current and peak simultaneous stage calls across all stubs
/// sharing the probe.
#[derive(Debug, Default)]
pub struct InflightProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InflightProbe {
    pub fn enter(self: &Arc<Self>) -> InflightToken {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InflightToken {
            probe: Arc::clone(self),
        }
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the probe on drop.
pub struct InflightToken {
    probe: Arc<InflightProbe>,
}

impl Drop for InflightToken {
    fn drop(&mut self) {
        self.probe.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Stub analyzers
// ---------------------------------------------------------------------------

async fn simulate(
    stage: StageName,
    delay_ms: u64,
    fail: bool,
    log: &Option<Arc<CallLog>>,
    probe: &Option<Arc<InflightProbe>>,
) -> anyhow::Result<()> {
    let started_at = Instant::now();
    let _token = probe.as_ref().map(|p| p.enter());
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
    if let Some(log) = log {
        log.record(stage, started_at, Instant::now());
    }
    if fail {
        anyhow::bail!("stub {stage} failure");
    }
    Ok(())
}

/// Stub for stage 1 with configurable delay and failure injection.
#[derive(Default)]
pub struct StubDocumentationAnalyzer {
    pub delay_ms: u64,
    pub fail: bool,
    pub log: Option<Arc<CallLog>>,
    pub probe: Option<Arc<InflightProbe>>,
}

#[async_trait]
impl DocumentationAnalyzer for StubDocumentationAnalyzer {
    async fn analyze(
        &self,
        batch: &ErrorBatch,
        _code_context: &str,
    ) -> anyhow::Result<DocumentationFinding> {
        simulate(
            StageName::Documentation,
            self.delay_ms,
            self.fail,
            &self.log,
            &self.probe,
        )
        .await?;
        let codes: Vec<String> = batch
            .distinct_codes()
            .into_iter()
            .map(String::from)
            .collect();
        Ok(DocumentationFinding {
            title: format!("Documentation for {}", codes.join(", ")),
            content: "stub documentation analysis".to_string(),
            error_codes: codes,
            references: vec!["https://example.test/docs".to_string()],
        })
    }
}

/// Stub for stage 2.
#[derive(Default)]
pub struct StubContextAnalyzer {
    pub delay_ms: u64,
    pub fail: bool,
    pub log: Option<Arc<CallLog>>,
    pub probe: Option<Arc<InflightProbe>>,
}

#[async_trait]
impl ContextAnalyzer for StubContextAnalyzer {
    async fn analyze(
        &self,
        _batch: &ErrorBatch,
        doc_finding: &DocumentationFinding,
        _code_context: &str,
    ) -> anyhow::Result<ContextFinding> {
        simulate(
            StageName::Context,
            self.delay_ms,
            self.fail,
            &self.log,
            &self.probe,
        )
        .await?;
        Ok(ContextFinding {
            title: "Context".to_string(),
            content: format!("stub context informed by: {}", doc_finding.title),
            probable_causes: vec!["stub probable cause".to_string()],
        })
    }
}

/// Stub for stage 3.
#[derive(Default)]
pub struct StubPatternValidator {
    pub delay_ms: u64,
    pub fail: bool,
    pub log: Option<Arc<CallLog>>,
    pub probe: Option<Arc<InflightProbe>>,
}

#[async_trait]
impl PatternValidator for StubPatternValidator {
    async fn validate(
        &self,
        context_finding: &ContextFinding,
        _project_standards: &str,
    ) -> anyhow::Result<PatternValidationFinding> {
        simulate(
            StageName::PatternValidation,
            self.delay_ms,
            self.fail,
            &self.log,
            &self.probe,
        )
        .await?;
        Ok(PatternValidationFinding {
            title: "Pattern validation".to_string(),
            content: format!("stub validation of: {}", context_finding.title),
            issues: Vec::new(),
            conforms: true,
        })
    }
}

/// Stub for stage 4.
#[derive(Default)]
pub struct StubSynthesizer {
    pub delay_ms: u64,
    pub fail: bool,
    pub log: Option<Arc<CallLog>>,
    pub probe: Option<Arc<InflightProbe>>,
}

#[async_trait]
impl BookletSynthesizer for StubSynthesizer {
    async fn synthesize(
        &self,
        batch: &ErrorBatch,
        findings: &[Finding],
        _metadata: &BookletMetadata,
    ) -> anyhow::Result<BookletDraft> {
        simulate(
            StageName::Synthesis,
            self.delay_ms,
            self.fail,
            &self.log,
            &self.probe,
        )
        .await?;
        Ok(BookletDraft {
            title: "Synthesis".to_string(),
            summary: format!(
                "stub synthesis of {} findings for {} errors",
                findings.len(),
                batch.error_count
            ),
            recommendations: vec!["stub recommendation".to_string()],
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryBookletStore
// ---------------------------------------------------------------------------

/// In-memory booklet store recording every saved booklet.
#[derive(Default)]
pub struct MemoryBookletStore {
    pub fail: bool,
    saved: Mutex<Vec<ResearchBooklet>>,
}

impl MemoryBookletStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn saved(&self) -> Vec<ResearchBooklet> {
        self.saved.lock().unwrap().clone()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl BookletStore for MemoryBookletStore {
    async fn save(
        &self,
        booklet: &ResearchBooklet,
        cancel: &watch::Receiver<bool>,
    ) -> anyhow::Result<PathBuf> {
        if *cancel.borrow() {
            anyhow::bail!("persistence cancelled before write");
        }
        if self.fail {
            anyhow::bail!("stub persistence failure");
        }
        self.saved.lock().unwrap().push(booklet.clone());
        Ok(PathBuf::from(format!("mem/{}/booklet.json", booklet.id)))
    }
}

// ---------------------------------------------------------------------------
// MemoryAlertSink
// ---------------------------------------------------------------------------

/// One captured alert.
#[derive(Debug, Clone)]
pub struct CapturedAlert {
    pub severity: AlertSeverity,
    pub source: String,
    pub message: String,
    pub context: serde_json::Value,
}

/// Alert sink that captures alerts for assertions.
#[derive(Default)]
pub struct MemoryAlertSink {
    alerts: Mutex<Vec<CapturedAlert>>,
}

impl MemoryAlertSink {
    pub fn alerts(&self) -> Vec<CapturedAlert> {
        self.alerts.lock().unwrap().clone()
    }
}

impl AlertSink for MemoryAlertSink {
    fn raise(&self, severity: AlertSeverity, source: &str, message: &str, context: serde_json::Value) {
        self.alerts.lock().unwrap().push(CapturedAlert {
            severity,
            source: source.to_string(),
            message: message.to_string(),
            context,
        });
    }
}
