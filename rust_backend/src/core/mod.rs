//! Core domain types and the crate error.
//!
//! - [`domain`]: sky positions, efficiency thresholds and query results
//! - [`error`]: [`ObservabilityError`] and the [`CoverageResult`] alias

pub mod domain;
pub mod error;

pub use domain::{EfficiencyClass, EfficiencyThreshold, Frame, ObservabilityResult, SkyPosition};
pub use error::{CoverageResult, ObservabilityError};
