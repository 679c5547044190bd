//! CLI argument definitions using clap derive macros.

use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{CompileCommand, GenerateCommand, LintCommand};
use crate::error::CliError;

/// Slicewright - contract-driven slice generation and boundary linting.
///
/// Compiles slice specs into canonical contracts, regenerates skeletons
/// around preserved hand-written code, and enforces domain isolation.
#[derive(Debug, Parser)]
#[command(
    name = "slicewright",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile a slice spec into its canonical contract artifact
    Compile(CompileCommand),
    /// Generate or regenerate slice file sets from their specs
    Generate(GenerateCommand),
    /// Lint the generated tree against the boundary rules
    Lint(LintCommand),
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.command {
            Command::Compile(cmd) => cmd.run(self.format).await,
            Command::Generate(cmd) => cmd.run(self.format).await,
            Command::Lint(cmd) => cmd.run(self.format).await,
        }
    }
}
