//! Sample collections for one efficiency threshold map.
//!
//! A map goes through three stages:
//!
//! 1. [`RawGrid`]: equatorial samples exactly as loaded
//! 2. [`CoverageGrid`]: mission-frame samples with no-data replaced by 0.0
//! 3. [`WrappedGrid`]: the coverage grid plus copies across the 0/360 seam

use crate::coordinates::ecliptic::to_mission;
use crate::core::domain::SkyPosition;
use crate::core::error::{CoverageResult, ObservabilityError};

/// Points within this many degrees of the seam are mirrored across it.
pub const WRAP_MARGIN_DEG: f64 = 10.0;

/// One sample of a coverage map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSample {
    pub position: SkyPosition,
    pub value: f64,
}

/// Equatorial samples as read from a source, before any processing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    samples: Vec<GridSample>,
}

impl RawGrid {
    pub fn new(samples: Vec<GridSample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[GridSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Mission-frame sample, angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

/// Mission-frame samples of one map with no-data absorbed to 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageGrid {
    points: Vec<GridPoint>,
}

impl CoverageGrid {
    /// Replace no-data values and transform every sample to the mission frame.
    ///
    /// Fails with `DataLoad` on an empty grid or a non-finite coordinate.
    pub fn from_raw(raw: &RawGrid) -> CoverageResult<Self> {
        if raw.is_empty() {
            return Err(ObservabilityError::DataLoad(
                "Coverage grid contains no samples".to_string(),
            ));
        }

        let mut no_data = 0usize;
        let mut points = Vec::with_capacity(raw.len());
        for (i, sample) in raw.samples().iter().enumerate() {
            sample.position.ensure_finite().map_err(|e| {
                ObservabilityError::DataLoad(format!("Sample {}: {}", i, e))
            })?;

            let value = if sample.value.is_finite() {
                sample.value
            } else {
                no_data += 1;
                0.0
            };
            let mission = to_mission(&sample.position);
            points.push(GridPoint {
                lon: mission.lon().value(),
                lat: mission.lat().value(),
                value,
            });
        }

        if no_data > 0 {
            log::debug!("Replaced {} no-data values with 0.0", no_data);
        }
        Ok(Self { points })
    }

    /// Build directly from mission-frame points; non-finite values become 0.0.
    pub fn from_points(points: Vec<GridPoint>) -> Self {
        let points = points
            .into_iter()
            .map(|p| GridPoint {
                value: if p.value.is_finite() { p.value } else { 0.0 },
                ..p
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample at a mission-frame position, for diagnostics.
    pub fn position(&self, index: usize) -> Option<SkyPosition> {
        self.points
            .get(index)
            .map(|p| SkyPosition::mission(p.lon, p.lat))
    }
}

/// A [`CoverageGrid`] extended across the longitude seam.
///
/// Points with `lon > 350` are copied to `lon - 360` and points with
/// `lon < 10` to `lon + 360`. The order is negative mirrors, originals,
/// then positive mirrors, so the originals win when duplicates are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedGrid {
    points: Vec<GridPoint>,
    originals: usize,
    mirrored_low: usize,
}

impl WrappedGrid {
    pub fn mirror(grid: &CoverageGrid) -> Self {
        let low: Vec<GridPoint> = grid
            .points()
            .iter()
            .filter(|p| p.lon > 360.0 - WRAP_MARGIN_DEG)
            .map(|p| GridPoint {
                lon: p.lon - 360.0,
                ..*p
            })
            .collect();
        let high: Vec<GridPoint> = grid
            .points()
            .iter()
            .filter(|p| p.lon < WRAP_MARGIN_DEG)
            .map(|p| GridPoint {
                lon: p.lon + 360.0,
                ..*p
            })
            .collect();

        let mirrored_low = low.len();
        let mut points = low;
        points.reserve(grid.len() + high.len());
        points.extend_from_slice(grid.points());
        points.extend(high);

        log::debug!(
            "Mirrored {} points across the seam ({} below 0, {} above 360)",
            points.len() - grid.len(),
            mirrored_low,
            points.len() - grid.len() - mirrored_low
        );

        Self {
            points,
            originals: grid.len(),
            mirrored_low,
        }
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// The unmirrored samples.
    pub fn originals(&self) -> &[GridPoint] {
        &self.points[self.mirrored_low..self.mirrored_low + self.originals]
    }

    pub fn mirrored_count(&self) -> usize {
        self.points.len() - self.originals
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Coordinates and values split for fitting.
    pub fn to_arrays(&self) -> (Vec<[f64; 2]>, Vec<f64>) {
        self.points
            .iter()
            .map(|p| ([p.lon, p.lat], p.value))
            .unzip()
    }
}
