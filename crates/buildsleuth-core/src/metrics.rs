//! Global atomic counters for pipeline observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a run).
//!
//! The in-flight gauge tracks concurrently running stage calls across all
//! runs and records the peak value observed, so tests can verify the
//! semaphore cap was never exceeded.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters — no allocations, no locking.
pub struct Metrics {
    runs_started: AtomicU64,
    runs_completed: AtomicU64,
    runs_failed: AtomicU64,
    runs_cancelled: AtomicU64,
    errors_parsed: AtomicU64,
    booklets_persisted: AtomicU64,
    stage_calls_inflight: AtomicU64,
    stage_calls_peak: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            runs_started: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            runs_cancelled: AtomicU64::new(0),
            errors_parsed: AtomicU64::new(0),
            booklets_persisted: AtomicU64::new(0),
            stage_calls_inflight: AtomicU64::new(0),
            stage_calls_peak: AtomicU64::new(0),
        }
    }

    pub fn inc_runs_started(&self) {
        self.runs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_runs_cancelled(&self) {
        self.runs_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_errors_parsed(&self, count: u64) {
        self.errors_parsed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_booklets_persisted(&self) {
        self.booklets_persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// Mark one stage call entering flight; updates the peak gauge.
    ///
    /// Returns a guard that decrements the gauge when dropped, so a
    /// panicking or failing stage still releases its slot.
    pub fn stage_call_entered(&self) -> InflightGuard<'_> {
        let now = self.stage_calls_inflight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stage_calls_peak.fetch_max(now, Ordering::SeqCst);
        InflightGuard { metrics: self }
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started.load(Ordering::Relaxed)
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    pub fn runs_failed(&self) -> u64 {
        self.runs_failed.load(Ordering::Relaxed)
    }

    pub fn runs_cancelled(&self) -> u64 {
        self.runs_cancelled.load(Ordering::Relaxed)
    }

    pub fn errors_parsed(&self) -> u64 {
        self.errors_parsed.load(Ordering::Relaxed)
    }

    pub fn booklets_persisted(&self) -> u64 {
        self.booklets_persisted.load(Ordering::Relaxed)
    }

    /// Current number of in-flight stage calls across all runs.
    pub fn stage_calls_inflight(&self) -> u64 {
        self.stage_calls_inflight.load(Ordering::SeqCst)
    }

    /// Highest simultaneous in-flight stage-call count observed.
    pub fn stage_calls_peak(&self) -> u64 {
        self.stage_calls_peak.load(Ordering::SeqCst)
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a run, daemon tick, etc.)
    /// rather than on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            runs_started = self.runs_started(),
            runs_completed = self.runs_completed(),
            runs_failed = self.runs_failed(),
            runs_cancelled = self.runs_cancelled(),
            errors_parsed = self.errors_parsed(),
            booklets_persisted = self.booklets_persisted(),
            stage_calls_peak = self.stage_calls_peak(),
        );
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.runs_started.store(0, Ordering::SeqCst);
        self.runs_completed.store(0, Ordering::SeqCst);
        self.runs_failed.store(0, Ordering::SeqCst);
        self.runs_cancelled.store(0, Ordering::SeqCst);
        self.errors_parsed.store(0, Ordering::SeqCst);
        self.booklets_persisted.store(0, Ordering::SeqCst);
        self.stage_calls_inflight.store(0, Ordering::SeqCst);
        self.stage_calls_peak.store(0, Ordering::SeqCst);
    }
}

/// RAII guard for one in-flight stage call.
pub struct InflightGuard<'a> {
    metrics: &'a Metrics,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.metrics
            .stage_calls_inflight
            .fetch_sub(1, Ordering::SeqCst);
    }
}
