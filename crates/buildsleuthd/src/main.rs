//! buildsleuthd - long-lived watcher daemon
//!
//! Polls a directory for build-output files (`*.log`) and runs the research
//! pipeline once for each file that appears. Runs are spawned concurrently;
//! the orchestrator's shared semaphore caps simultaneous stage calls so a
//! burst of log files cannot overload the downstream backend.
//!
//! Configuration comes from the same `BUILDSLEUTH_*` variables as the CLI,
//! plus `BUILDSLEUTH_WATCH_DIR` (default `.buildsleuth/inbox`) and
//! `BUILDSLEUTH_POLL_SECS` (default 2).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info, warn, Level};

use buildsleuth_core::{
    FsBookletStore, OfflineContextAnalyzer, OfflineDocumentationAnalyzer, OfflinePatternValidator,
    OfflineSynthesizer, OrchestratorConfig, PipelineRequest, ResearchOrchestrator,
    TracingAlertSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    let json = std::env::var("BUILDSLEUTH_LOG_JSON").is_ok();
    buildsleuth_core::init_tracing(json, Level::INFO);

    let config = OrchestratorConfig::from_env();
    let watch_dir = std::env::var("BUILDSLEUTH_WATCH_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".buildsleuth/inbox"));
    let poll_secs: u64 = std::env::var("BUILDSLEUTH_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(2);

    std::fs::create_dir_all(&watch_dir)
        .with_context(|| format!("Failed to create watch dir: {:?}", watch_dir))?;

    info!(
        watch_dir = ?watch_dir,
        poll_secs,
        cap = config.max_concurrent_stage_calls,
        "buildsleuthd started"
    );

    let orchestrator = Arc::new(build_orchestrator(config));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    watch_loop(
        orchestrator,
        &watch_dir,
        Duration::from_secs(poll_secs.max(1)),
        shutdown_rx,
    )
    .await;

    buildsleuth_core::METRICS.flush();
    Ok(())
}

fn build_orchestrator(config: OrchestratorConfig) -> ResearchOrchestrator {
    let store = Arc::new(FsBookletStore::new(config.booklet_dir.clone()));
    ResearchOrchestrator::new(
        Arc::new(OfflineDocumentationAnalyzer),
        Arc::new(OfflineContextAnalyzer),
        Arc::new(OfflinePatternValidator),
        Arc::new(OfflineSynthesizer),
        store,
        Arc::new(TracingAlertSink),
        config,
    )
}

/// Poll the watch directory until shutdown; each new `.log` file starts one
/// pipeline run. Files are remembered by path so edits do not re-trigger.
async fn watch_loop(
    orchestrator: Arc<ResearchOrchestrator>,
    watch_dir: &Path,
    poll: Duration,
    shutdown: watch::Receiver<bool>,
) {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut runs = Vec::new();

    while !*shutdown.borrow() {
        match scan_new_logs(watch_dir, &mut seen) {
            Ok(new_files) => {
                for path in new_files {
                    info!(file = ?path, "new build output detected");
                    let orchestrator = Arc::clone(&orchestrator);
                    let cancel = shutdown.clone();
                    runs.push(tokio::spawn(async move {
                        run_one(&orchestrator, &path, cancel).await;
                    }));
                }
            }
            Err(err) => warn!(error = %err, "watch dir scan failed"),
        }
        runs.retain(|handle| !handle.is_finished());

        let mut shutdown = shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(poll) => {}
            _ = shutdown.changed() => {}
        }
    }

    // In-flight runs observe the same signal and wind down cooperatively.
    for handle in runs {
        let _ = handle.await;
    }
}

fn scan_new_logs(watch_dir: &Path, seen: &mut HashSet<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut new_files = Vec::new();
    for entry in std::fs::read_dir(watch_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }
        if seen.insert(path.clone()) {
            new_files.push(path);
        }
    }
    new_files.sort();
    Ok(new_files)
}

async fn run_one(
    orchestrator: &ResearchOrchestrator,
    path: &Path,
    cancel: watch::Receiver<bool>,
) {
    let raw_output = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!(file = ?path, error = %err, "failed to read build output");
            return;
        }
    };
    let request = PipelineRequest {
        raw_output,
        ..Default::default()
    };
    match orchestrator.run(request, cancel).await {
        Ok(outcome) => {
            info!(
                file = ?path,
                booklet = ?outcome.booklet_path,
                duration_ms = outcome.total_duration_ms,
                "booklet written"
            );
        }
        Err(err) => {
            error!(file = ?path, code = err.code(), error = %err, "run failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_reports_each_log_once() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("a.log"), "x").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "x").unwrap();

        let mut seen = HashSet::new();
        let first = scan_new_logs(temp_dir.path(), &mut seen).unwrap();
        assert_eq!(first.len(), 1);
        assert!(first[0].ends_with("a.log"));

        let second = scan_new_logs(temp_dir.path(), &mut seen).unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_run_one_persists_booklet() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = temp_dir.path().join("build.log");
        std::fs::write(
            &log,
            "Program.cs(10,5): error CS0103: The name 'Console' does not exist in the current context",
        )
        .unwrap();

        let config = OrchestratorConfig {
            booklet_dir: temp_dir.path().join("booklets"),
            ..Default::default()
        };
        let orchestrator = build_orchestrator(config.clone());
        let (_tx, rx) = watch::channel(false);

        run_one(&orchestrator, &log, rx).await;

        let runs: Vec<_> = std::fs::read_dir(&config.booklet_dir)
            .unwrap()
            .collect::<std::io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].path().join("booklet.json").exists());
    }

    #[tokio::test]
    async fn test_watch_loop_exits_on_shutdown() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = OrchestratorConfig {
            booklet_dir: temp_dir.path().join("booklets"),
            ..Default::default()
        };
        let orchestrator = Arc::new(build_orchestrator(config));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        // Already-signalled shutdown returns without polling.
        watch_loop(orchestrator, temp_dir.path(), Duration::from_secs(1), rx).await;
    }
}
