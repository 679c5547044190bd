//! `slicewright generate` - the generate-or-regenerate operation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use slicewright_pipeline::{discover_jobs, run_generate_batch, LockRegistry, SliceJob};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::render_batch_report;

/// Generate or regenerate slice file sets from their specs
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// A slice tree root, or a single spec file
    pub path: PathBuf,

    /// Output directory (single-spec mode only; defaults to the spec's
    /// directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl GenerateCommand {
    pub async fn run(&self, format: OutputFormat) -> Result<(), CliError> {
        let jobs = if self.path.is_file() {
            let out_dir = match &self.out {
                Some(dir) => dir.clone(),
                None => self
                    .path
                    .parent()
                    .map(PathBuf::from)
                    .ok_or_else(|| CliError::Config("spec file has no parent directory".into()))?,
            };
            vec![SliceJob {
                spec_path: self.path.clone(),
                out_dir,
            }]
        } else {
            if self.out.is_some() {
                return Err(CliError::Config(
                    "--out only applies when generating a single spec file".into(),
                ));
            }
            discover_jobs(&self.path)?
        };

        if jobs.is_empty() {
            return Err(CliError::Config(format!(
                "no slice specs found under '{}'",
                self.path.display()
            )));
        }

        let total = jobs.len();
        let report = run_generate_batch(jobs, Arc::new(LockRegistry::new())).await;
        render_batch_report(&report, format);

        let failed = report.failures();
        if failed > 0 {
            return Err(CliError::BatchFailed { failed, total });
        }
        Ok(())
    }
}
