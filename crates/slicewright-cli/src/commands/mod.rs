//! Subcommand implementations.

mod compile;
mod generate;
mod lint;

pub use compile::CompileCommand;
pub use generate::GenerateCommand;
pub use lint::LintCommand;
