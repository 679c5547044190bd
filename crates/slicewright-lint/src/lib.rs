//! Boundary linting for generated slice trees.
//!
//! Builds a domain-tagged import graph from a source tree and evaluates it,
//! together with per-slice file and contract state, against the isolation
//! and integrity rules. The linter reports; it never mutates and never
//! throws.

pub mod graph;
pub mod linter;
pub mod registry;

pub use graph::*;
pub use linter::*;
pub use registry::*;
