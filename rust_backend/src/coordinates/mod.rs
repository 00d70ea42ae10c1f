//! Coordinate transforms between the equatorial frame and the mission frame.
//!
//! The coverage maps are expressed in geocentric mean ecliptic coordinates;
//! targets and raster grids arrive as right ascension / declination.

pub mod ecliptic;

pub use ecliptic::{to_equatorial, to_mission, J2000_MEAN_OBLIQUITY};
