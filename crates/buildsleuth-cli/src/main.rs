//! buildsleuth - build-error research pipeline CLI
//!
//! ## Commands
//!
//! - `parse`: Parse raw build output into structured compiler errors
//! - `run`: Execute the full research pipeline and persist a booklet
//! - `show`: Load a persisted booklet by run ID, verifying its digest
//! - `status`: Show the resolved orchestrator configuration

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, Level};

use buildsleuth_core::{
    FsBookletStore, OfflineContextAnalyzer, OfflineDocumentationAnalyzer, OfflinePatternValidator,
    OfflineSynthesizer, OrchestratorConfig, ParserDispatcher, PipelineRequest,
    ResearchOrchestrator, TracingAlertSink,
};

#[derive(Parser)]
#[command(name = "buildsleuth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build-error research pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse raw build output into structured compiler errors
    Parse {
        /// Path to a file containing raw build output
        input: PathBuf,

        /// Emit the parsed batch as JSON instead of terminal text
        #[arg(long)]
        json: bool,
    },

    /// Execute the full research pipeline on a build-output file
    Run {
        /// Path to a file containing raw build output
        input: PathBuf,

        /// Optional file with code context for the analysis stages
        #[arg(long)]
        code_context: Option<PathBuf>,

        /// Optional file describing the project structure
        #[arg(long)]
        structure: Option<PathBuf>,

        /// Optional file describing the project codebase
        #[arg(long)]
        codebase: Option<PathBuf>,

        /// Optional file with project coding standards
        #[arg(long)]
        standards: Option<PathBuf>,

        /// Root directory for persisted booklets (default: from config/env)
        #[arg(long)]
        booklet_dir: Option<PathBuf>,

        /// Cap on simultaneous stage calls across runs
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Per-stage timeout in seconds (0 disables)
        #[arg(long)]
        stage_timeout_secs: Option<u64>,
    },

    /// Load a persisted booklet by run ID, verifying its digest
    Show {
        /// Run ID (booklet directory name)
        run_id: String,

        /// Root directory containing persisted booklets
        #[arg(long)]
        booklet_dir: Option<PathBuf>,

        /// Print the raw booklet JSON instead of the markdown rendering
        #[arg(long)]
        json: bool,
    },

    /// Show the resolved orchestrator configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    buildsleuth_core::init_tracing(cli.log_json, level);

    match cli.command {
        Commands::Parse { input, json } => cmd_parse(&input, json),
        Commands::Run {
            input,
            code_context,
            structure,
            codebase,
            standards,
            booklet_dir,
            max_concurrent,
            stage_timeout_secs,
        } => {
            let mut config = OrchestratorConfig::from_env();
            if let Some(dir) = booklet_dir {
                config.booklet_dir = dir;
            }
            if let Some(n) = max_concurrent {
                config.max_concurrent_stage_calls = n;
            }
            if let Some(secs) = stage_timeout_secs {
                config.stage_timeout_secs = secs;
            }
            let request = build_request(
                &input,
                code_context.as_deref(),
                structure.as_deref(),
                codebase.as_deref(),
                standards.as_deref(),
            )?;
            cmd_run(request, config).await
        }
        Commands::Show {
            run_id,
            booklet_dir,
            json,
        } => {
            let root = booklet_dir.unwrap_or_else(|| OrchestratorConfig::from_env().booklet_dir);
            cmd_show(&run_id, &root, json)
        }
        Commands::Status => cmd_status(),
    }
}

/// Parse raw build output and print the structured batch
fn cmd_parse(input: &std::path::Path, json: bool) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read build output: {:?}", input))?;

    let batch = ParserDispatcher::new().parse_output(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    println!(
        "Parsed {} error(s), {} warning(s)",
        batch.error_count, batch.warning_count
    );
    for err in &batch.errors {
        println!(
            "  [{}] {} {} at {}:{}:{} - {}",
            err.source.as_str(),
            err.severity.as_str(),
            err.code,
            err.location.file,
            err.location.line,
            err.location.column,
            err.message
        );
    }
    Ok(())
}

fn build_request(
    input: &std::path::Path,
    code_context: Option<&std::path::Path>,
    structure: Option<&std::path::Path>,
    codebase: Option<&std::path::Path>,
    standards: Option<&std::path::Path>,
) -> Result<PipelineRequest> {
    let raw_output = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read build output: {:?}", input))?;
    Ok(PipelineRequest {
        raw_output,
        code_context: read_optional(code_context)?,
        project_structure: read_optional(structure)?,
        project_codebase: read_optional(codebase)?,
        project_standards: read_optional(standards)?,
    })
}

fn read_optional(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(p) => {
            std::fs::read_to_string(p).with_context(|| format!("Failed to read file: {:?}", p))
        }
        None => Ok(String::new()),
    }
}

/// Execute one pipeline run with the offline analyzer suite
async fn cmd_run(request: PipelineRequest, config: OrchestratorConfig) -> Result<()> {
    let store = Arc::new(FsBookletStore::new(config.booklet_dir.clone()));
    let orchestrator = ResearchOrchestrator::new(
        Arc::new(OfflineDocumentationAnalyzer),
        Arc::new(OfflineContextAnalyzer),
        Arc::new(OfflinePatternValidator),
        Arc::new(OfflineSynthesizer),
        store,
        Arc::new(TracingAlertSink),
        config,
    );

    // Ctrl-C flips the cancel signal; the run winds down cooperatively.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling run");
            let _ = cancel_tx.send(true);
        }
    });

    match orchestrator.run(request, cancel_rx).await {
        Ok(outcome) => {
            println!("Run: {}", outcome.booklet.id);
            println!("Booklet: {:?}", outcome.booklet_path);
            println!(
                "Errors: {} | Warnings: {}",
                outcome.booklet.metadata.error_count, outcome.booklet.metadata.warning_count
            );
            println!("Total: {}ms", outcome.total_duration_ms);
            for (step, ms) in &outcome.step_timings {
                println!("  {}: {}ms", step, ms);
            }
            Ok(())
        }
        Err(err) => anyhow::bail!("pipeline failed [{}]: {}", err.code(), err),
    }
}

/// Load a persisted booklet, verifying its digest
fn cmd_show(run_id: &str, root: &std::path::Path, json: bool) -> Result<()> {
    let store = FsBookletStore::new(root);
    let booklet = store
        .load(run_id)
        .with_context(|| format!("Failed to load booklet for run: {}", run_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&booklet)?);
    } else {
        println!("{}", booklet.render_markdown());
    }
    Ok(())
}

/// Show the resolved orchestrator configuration
fn cmd_status() -> Result<()> {
    let config = OrchestratorConfig::from_env();
    println!("buildsleuth {}", buildsleuth_core::VERSION);
    println!(
        "max_concurrent_stage_calls: {}",
        config.max_concurrent_stage_calls
    );
    println!("stage_timeout_secs: {}", config.stage_timeout_secs);
    println!("booklet_dir: {:?}", config.booklet_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = "\
Build started 10:42:01 AM.
Program.cs(10,5): error CS0103: The name 'Console' does not exist in the current context
Service.cs(3,1): warning CS8600: Converting null literal to non-nullable type.
    1 Warning(s)
    1 Error(s)";

    #[test]
    fn test_build_request_reads_all_inputs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("build.log");
        std::fs::write(&input, SAMPLE_OUTPUT).unwrap();
        let standards = temp_dir.path().join("standards.md");
        std::fs::write(&standards, "canonical logging required").unwrap();

        let request =
            build_request(&input, None, None, None, Some(standards.as_path())).unwrap();
        assert_eq!(request.raw_output, SAMPLE_OUTPUT);
        assert_eq!(request.project_standards, "canonical logging required");
        assert!(request.code_context.is_empty());
    }

    #[test]
    fn test_build_request_missing_input_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nope.log");
        let err = build_request(&missing, None, None, None, None).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read build output"));
    }

    #[tokio::test]
    async fn test_cmd_run_persists_booklet_to_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("build.log");
        std::fs::write(&input, SAMPLE_OUTPUT).unwrap();

        let config = OrchestratorConfig {
            booklet_dir: temp_dir.path().join("booklets"),
            ..Default::default()
        };
        let request = build_request(&input, None, None, None, None).unwrap();

        cmd_run(request, config.clone()).await.unwrap();

        // Exactly one booklet directory with all three artifacts.
        let runs: Vec<_> = std::fs::read_dir(&config.booklet_dir)
            .unwrap()
            .collect::<std::io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(runs.len(), 1);
        let run_dir = runs[0].path();
        assert!(run_dir.join("booklet.json").exists());
        assert!(run_dir.join("booklet.digest").exists());
        assert!(run_dir.join("booklet.md").exists());

        // And show can read it back with digest verification.
        let run_id = runs[0].file_name().to_string_lossy().to_string();
        cmd_show(&run_id, &config.booklet_dir, true).unwrap();
    }

    #[tokio::test]
    async fn test_cmd_run_warning_only_fails_with_code() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("build.log");
        std::fs::write(
            &input,
            "Service.cs(3,1): warning CS8600: Converting null literal.",
        )
        .unwrap();

        let config = OrchestratorConfig {
            booklet_dir: temp_dir.path().join("booklets"),
            ..Default::default()
        };
        let request = build_request(&input, None, None, None, None).unwrap();

        let err = cmd_run(request, config).await.unwrap_err();
        assert!(err.to_string().contains("NO_ERRORS_FOUND"));
    }
}
