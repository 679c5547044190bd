//! `slicewright lint` - the boundary-lint operation.

use std::path::PathBuf;

use clap::Args;

use slicewright_common_fs as fs;
use slicewright_lint::{is_clean, BoundaryLinter, DomainRegistry, ImportGraphBuilder};
use slicewright_pipeline::collect_slice_states;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output::render_violations;

const MAX_REGISTRY_SIZE: usize = 256 * 1024;

/// Lint the generated tree against the boundary rules
#[derive(Debug, Args)]
pub struct LintCommand {
    /// Root of the source tree to scan for imports
    #[arg(long)]
    pub root: PathBuf,

    /// Domain registry YAML (domains, shared-infra, frozen-legacy,
    /// bridge adapters)
    #[arg(long)]
    pub registry: PathBuf,

    /// Root of the slice tree holding specs and contracts; defaults to
    /// --root
    #[arg(long)]
    pub slices: Option<PathBuf>,
}

impl LintCommand {
    pub async fn run(&self, format: OutputFormat) -> Result<(), CliError> {
        let registry_source = fs::read_to_string(&self.registry, MAX_REGISTRY_SIZE)?;
        let registry = DomainRegistry::from_yaml(&registry_source)
            .map_err(|e| CliError::Config(format!("invalid domain registry: {e}")))?;

        // CPU-bound scan and lint run off the async thread.
        let root = self.root.clone();
        let slices_root = self.slices.clone().unwrap_or_else(|| self.root.clone());
        let violations = tokio::task::spawn_blocking(move || {
            let graph = ImportGraphBuilder::new(registry.clone()).scan_tree(&root)?;
            let states = collect_slice_states(&slices_root)?;
            Ok::<_, slicewright_common_core::Error>(
                BoundaryLinter::new().lint(&graph, &states, &registry),
            )
        })
        .await
        .map_err(|e| CliError::Config(format!("lint task failed: {e}")))??;

        render_violations(&violations, format);

        if !is_clean(&violations) {
            return Err(CliError::Violations {
                count: violations.len(),
            });
        }
        Ok(())
    }
}
