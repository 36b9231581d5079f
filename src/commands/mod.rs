//! Command implementations
//!
//! Every command is an `impl Repository` block that writes its human
//! readable output to the repository's writer.

pub mod plumbing;
