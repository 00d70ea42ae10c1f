//! Scattered-data interpolation.
//!
//! - [`triangulation`]: incremental Delaunay triangulation with point location
//! - [`clough_tocher`]: C¹ piecewise-cubic interpolant built on top of it

pub mod clough_tocher;
pub mod triangulation;

pub use clough_tocher::{CloughTocher2d, InterpolationError};
pub use triangulation::{Triangle, Triangulation, TriangulationError};
