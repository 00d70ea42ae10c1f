//! One pipeline for every efficiency threshold map.
//!
//! Load, absorb no-data, transform to the mission frame, mirror across the
//! seam, fit. The per-threshold differences live entirely in [`MapConfig`].

use std::path::Path;
use std::time::Instant;

use crate::config::MapConfig;
use crate::core::error::{CoverageResult, ObservabilityError};
use crate::io::loaders::GridLoader;

use super::grid::{CoverageGrid, RawGrid, WrappedGrid};
use super::interpolant::CoverageInterpolant;

/// Build the interpolant for one map, resolving its source against `data_dir`.
///
/// # Errors
/// * `DataLoad` if the source cannot be read or holds unusable samples
/// * `Fit` if fewer than 3 distinct, non-collinear sites remain
pub fn build_interpolant(map: &MapConfig, data_dir: &Path) -> CoverageResult<CoverageInterpolant> {
    let start = Instant::now();
    let source = map.source.resolve(data_dir);

    let loaded = GridLoader::load(&source, map.longitude)
        .map_err(ObservabilityError::data_load)?;
    log::debug!(
        "Loaded {} samples for the {} map from {:?} source",
        loaded.num_samples,
        map.threshold,
        loaded.source_type
    );

    let interpolant = fit_raw_grid(&loaded.grid, map.clamp_max)?;

    log::info!(
        "Built {} coverage map: {} samples, {} sites in {:.2?}",
        map.threshold,
        loaded.num_samples,
        interpolant.site_count(),
        start.elapsed()
    );
    Ok(interpolant)
}

/// Run the pipeline from an already loaded grid.
pub fn fit_raw_grid(raw: &RawGrid, clamp_max: f64) -> CoverageResult<CoverageInterpolant> {
    let grid = CoverageGrid::from_raw(raw)?;
    let wrapped = WrappedGrid::mirror(&grid);
    CoverageInterpolant::fit(&wrapped, clamp_max)
}
