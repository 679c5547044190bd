//! Slice specification system.
//!
//! This crate turns a structured slice spec document into a typed
//! intermediate representation and compiles that IR into a canonical
//! contract artifact with byte-stable serialization. The contract is the
//! machine-derived source of truth downstream generation and linting hang
//! off of; the spec document itself stays human-owned.

pub mod contract;
pub mod error;
pub mod parsing;
pub mod types;

pub use contract::*;
pub use error::*;
pub use parsing::*;
pub use types::*;
