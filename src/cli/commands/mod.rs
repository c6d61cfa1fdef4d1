//! Command implementations.

pub mod completions;
pub mod parse;
pub mod report;
pub mod version;
