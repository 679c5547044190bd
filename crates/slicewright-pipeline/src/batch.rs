//! Batch execution over independent slices.
//!
//! Slices have no ordering dependency between them, so jobs fan out
//! concurrently; the CPU-bound pipeline runs on blocking threads while the
//! per-slice lock is held. One malformed spec fails its own slice and
//! nothing else.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use slicewright_common_fs as fs;
use slicewright_common_core::Result;

use crate::identity::{SliceIdentity, SPEC_FILE_NAME};
use crate::locks::LockRegistry;
use crate::slice::{generate_slice, SliceAction};

/// One unit of batch work: a spec and the directory its files land in.
#[derive(Debug, Clone)]
pub struct SliceJob {
    /// Path to the slice's spec document.
    pub spec_path: PathBuf,
    /// Directory the generated file set is written to.
    pub out_dir: PathBuf,
}

/// Outcome of one slice's pipeline run.
#[derive(Debug)]
pub struct SliceOutcome {
    /// `domain/slice`, or the spec path when identity could not be derived.
    pub label: String,
    /// What happened.
    pub result: anyhow::Result<SliceAction>,
}

/// Collected outcomes of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SliceOutcome>,
}

impl BatchReport {
    /// Number of failed slices.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Whether every slice succeeded.
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}

/// Discover every slice spec under a tree root. A slice spec is any
/// `spec.md` at `<root>/<domain>/<slice>/spec.md`; its directory is the
/// generation target.
pub fn discover_jobs(root: &Path) -> Result<Vec<SliceJob>> {
    let jobs = fs::collect_files(root, "md")?
        .into_iter()
        .filter(|p| p.file_name().map(|n| n == SPEC_FILE_NAME).unwrap_or(false))
        .filter(|p| SliceIdentity::from_spec_path(p).is_ok())
        .map(|spec_path| {
            let out_dir = spec_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            SliceJob { spec_path, out_dir }
        })
        .collect();
    Ok(jobs)
}

/// Run the generate-or-regenerate pipeline over a batch of slices.
pub async fn run_generate_batch(jobs: Vec<SliceJob>, locks: Arc<LockRegistry>) -> BatchReport {
    let futures = jobs.into_iter().map(|job| {
        let locks = Arc::clone(&locks);
        async move {
            let label = SliceIdentity::from_spec_path(&job.spec_path)
                .map(|id| id.key())
                .unwrap_or_else(|_| job.spec_path.display().to_string());

            let _guard = locks.acquire(&label).await;

            let spec_path = job.spec_path.clone();
            let out_dir = job.out_dir.clone();
            let result =
                match tokio::task::spawn_blocking(move || generate_slice(&spec_path, &out_dir))
                    .await
                {
                    Ok(result) => result,
                    Err(join_err) => Err(anyhow::anyhow!("pipeline task panicked: {join_err}")),
                };

            if let Err(err) = &result {
                warn!(slice = %label, error = %err, "slice pipeline failed");
            }
            SliceOutcome { label, result }
        }
    });

    BatchReport {
        outcomes: futures::future::join_all(futures).await,
    }
}
