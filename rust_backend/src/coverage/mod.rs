//! Coverage maps: sample grids, fitted interpolants and the map builder.

pub mod builder;
pub mod grid;
pub mod interpolant;

pub use builder::{build_interpolant, fit_raw_grid};
pub use grid::{CoverageGrid, GridPoint, GridSample, RawGrid, WrappedGrid};
pub use interpolant::CoverageInterpolant;
