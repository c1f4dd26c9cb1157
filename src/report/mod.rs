//! Monthly report pipeline: parse an uploaded workbook, split it per
//! assignee, and compute team-lead analytics from a stored original.

pub mod analytics;
pub mod builder;
pub mod codec;
pub mod partition;
pub mod pipeline;
pub mod row;
#[cfg(test)]
mod tests;

pub use pipeline::{SplitOutcome, analyze_workbook, split_workbook};
