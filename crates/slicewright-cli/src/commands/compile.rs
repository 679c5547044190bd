//! `slicewright compile` - the compile-contract operation.

use std::path::PathBuf;

use clap::Args;

use slicewright_common_fs as fs;
use slicewright_pipeline::SliceIdentity;
use slicewright_spec::compile_spec;

use crate::cli::OutputFormat;
use crate::error::CliError;

const MAX_SPEC_SIZE: usize = 1024 * 1024;

/// Compile a slice spec into its canonical contract artifact
#[derive(Debug, Args)]
pub struct CompileCommand {
    /// Path to the slice spec document
    pub spec: PathBuf,

    /// Owning domain; defaults to the spec location's domain directory
    #[arg(long)]
    pub domain: Option<String>,

    /// Slice name; defaults to the spec location's slice directory
    #[arg(long)]
    pub slice: Option<String>,

    /// Write the artifact to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CompileCommand {
    pub async fn run(&self, _format: OutputFormat) -> Result<(), CliError> {
        let (domain, slice) = match (&self.domain, &self.slice) {
            (Some(domain), Some(slice)) => (domain.clone(), slice.clone()),
            _ => {
                let identity = SliceIdentity::from_spec_path(&self.spec)?;
                (
                    self.domain.clone().unwrap_or(identity.domain),
                    self.slice.clone().unwrap_or(identity.slice),
                )
            }
        };

        let source = fs::read_to_string(&self.spec, MAX_SPEC_SIZE)?;
        let contract = compile_spec(&source, &domain, &slice)?;
        let canonical = contract
            .to_canonical_json()
            .map_err(|e| CliError::Config(format!("contract serialization failed: {e}")))?;

        match &self.output {
            Some(path) => {
                fs::write_string_atomic(path, &canonical)?;
                tracing::info!(path = %path.display(), "contract artifact written");
            }
            // The artifact is already canonical JSON; both formats print it
            // as-is.
            None => print!("{canonical}"),
        }
        Ok(())
    }
}
