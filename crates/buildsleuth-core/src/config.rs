//! Orchestrator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tunables for the pipeline orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Cap on simultaneously in-flight stage calls across all runs.
    ///
    /// Protects the shared downstream model backend; within a single run
    /// the stages are sequential regardless of this value.
    pub max_concurrent_stage_calls: usize,

    /// Per-stage timeout applied at the collaborator boundary, in seconds.
    /// A timeout is treated like any other stage failure. Zero disables it.
    pub stage_timeout_secs: u64,

    /// Root directory for persisted booklets.
    pub booklet_dir: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_stage_calls: 3,
            stage_timeout_secs: 120,
            booklet_dir: PathBuf::from(".buildsleuth/booklets"),
        }
    }
}

impl OrchestratorConfig {
    /// Defaults overlaid with `BUILDSLEUTH_*` environment variables:
    /// `BUILDSLEUTH_MAX_CONCURRENT`, `BUILDSLEUTH_STAGE_TIMEOUT_SECS`,
    /// `BUILDSLEUTH_BOOKLET_DIR`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = env_parse::<usize>("BUILDSLEUTH_MAX_CONCURRENT") {
            if n > 0 {
                config.max_concurrent_stage_calls = n;
            }
        }
        if let Some(secs) = env_parse::<u64>("BUILDSLEUTH_STAGE_TIMEOUT_SECS") {
            config.stage_timeout_secs = secs;
        }
        if let Ok(dir) = std::env::var("BUILDSLEUTH_BOOKLET_DIR") {
            if !dir.is_empty() {
                config.booklet_dir = PathBuf::from(dir);
            }
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
