//! Booklet persistence gateway.
//!
//! Each successful save produces a new, distinctly-named artifact — one
//! directory per run id, never deduplicated across runs, since every
//! invocation represents an independent analysis request.

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::watch;

use crate::domain::ResearchBooklet;

/// Persistence collaborator for assembled booklets.
#[async_trait]
pub trait BookletStore: Send + Sync {
    /// Persist the booklet and return the path of the primary artifact.
    ///
    /// Implementations must honor the cancel signal at their own await
    /// points; a triggered cancel before any bytes are written should
    /// return an error rather than a partial artifact.
    async fn save(
        &self,
        booklet: &ResearchBooklet,
        cancel: &watch::Receiver<bool>,
    ) -> anyhow::Result<PathBuf>;
}

/// Filesystem store writing one directory per run:
/// `<root>/<run-id>/booklet.json` (machine artifact), `booklet.digest`
/// (SHA-256 of the JSON), and `booklet.md` (rendered markdown).
#[derive(Debug, Clone)]
pub struct FsBookletStore {
    root: PathBuf,
}

impl FsBookletStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read back `<root>/<run-id>/booklet.json`, verifying the digest.
    pub fn load(&self, run_id: &str) -> anyhow::Result<ResearchBooklet> {
        let dir = self.root.join(run_id);
        let json = std::fs::read(dir.join("booklet.json"))?;
        let recorded = std::fs::read_to_string(dir.join("booklet.digest"))?;
        let actual = hex_digest(&json);
        if recorded.trim() != actual {
            anyhow::bail!(
                "booklet digest mismatch for run {run_id}: expected {}, got {actual}",
                recorded.trim()
            );
        }
        Ok(serde_json::from_slice(&json)?)
    }
}

#[async_trait]
impl BookletStore for FsBookletStore {
    async fn save(
        &self,
        booklet: &ResearchBooklet,
        cancel: &watch::Receiver<bool>,
    ) -> anyhow::Result<PathBuf> {
        if *cancel.borrow() {
            anyhow::bail!("persistence cancelled before write");
        }

        let dir = self.root.join(booklet.id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        let json = serde_json::to_vec_pretty(booklet)?;
        let digest = hex_digest(&json);
        let markdown = booklet.render_markdown();

        let json_path = dir.join("booklet.json");
        tokio::fs::write(&json_path, &json).await?;
        tokio::fs::write(dir.join("booklet.digest"), digest.as_bytes()).await?;
        tokio::fs::write(dir.join("booklet.md"), markdown.as_bytes()).await?;

        Ok(json_path)
    }
}

fn hex_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convenience for callers that only need the digest of a serialized
/// booklet (e.g. provenance fields in reports).
pub fn booklet_digest(booklet: &ResearchBooklet) -> anyhow::Result<String> {
    Ok(hex_digest(&serde_json::to_vec_pretty(booklet)?))
}
