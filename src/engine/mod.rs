//! Assignment resolution engine
//!
//! Data flows one way: the source lists objects and raw assignments, the
//! normalizer turns records into canonical targets, the resolver matches
//! targets against tracked groups, and the processor/runner stage and commit
//! trails category by category.

pub mod normalizer;
pub mod processor;
pub mod resolver;
pub mod runner;
mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use processor::CategoryProcessor;
pub use runner::{track_groups, RunSummary, Runner};
pub use source::{AssignmentSource, GroupDirectory};
