//! Service layer for observability queries.
//!
//! Services sit on top of the coverage maps: they own the fitted model and
//! turn map values into per-target answers.

pub mod observability;

pub use observability::{cumulative_days, observability, CoverageModel};
