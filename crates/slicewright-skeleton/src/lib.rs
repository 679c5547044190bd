//! Skeleton generation and marker-preserving regeneration.
//!
//! Produces the fixed set of source files belonging to a slice from its
//! contract, and regenerates them in place without ever touching the
//! hand-written code held inside marker-delimited preserved regions.

pub mod engine;
pub mod error;
pub mod generator;
pub mod markers;
pub mod writer;

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use markers::*;
pub use writer::*;
