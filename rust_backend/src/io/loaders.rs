use anyhow::{bail, ensure, Context, Result};
use qtty::Degrees;
use std::path::Path;

use crate::config::{GridSource, LongitudeDecoder};
use crate::core::domain::{Frame, SkyPosition};
use crate::coverage::grid::{GridSample, RawGrid};
use crate::parsing::raster_parser::{self, Raster};
use crate::parsing::table_parser::{self, TableColumns};

/// Represents the storage format of a coverage map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridSourceType {
    Raster,
    Table,
}

/// Result of loading one coverage map
#[derive(Debug)]
pub struct GridLoadResult {
    pub grid: RawGrid,
    pub source_type: GridSourceType,
    pub num_samples: usize,
}

impl GridLoadResult {
    pub fn new(grid: RawGrid, source_type: GridSourceType) -> Self {
        let num_samples = grid.len();
        Self {
            grid,
            source_type,
            num_samples,
        }
    }
}

/// Unified interface for loading coverage maps from raster or table sources
pub struct GridLoader;

impl GridLoader {
    /// Load a map from an already resolved source
    pub fn load(source: &GridSource, decoder: LongitudeDecoder) -> Result<GridLoadResult> {
        match source {
            GridSource::Raster {
                longitude_grid,
                latitude_grid,
                values,
            } => Self::load_from_rasters(longitude_grid, latitude_grid, values, decoder),
            GridSource::Table { path } => Self::load_from_table(path, decoder),
        }
    }

    /// Load a map from three co-indexed raster files
    pub fn load_from_rasters(
        longitude_path: &Path,
        latitude_path: &Path,
        values_path: &Path,
        decoder: LongitudeDecoder,
    ) -> Result<GridLoadResult> {
        let lon = raster_parser::parse_raster_file(longitude_path)
            .context("Failed to parse longitude grid")?;
        let lat = raster_parser::parse_raster_file(latitude_path)
            .context("Failed to parse latitude grid")?;
        let values = raster_parser::parse_raster_file(values_path)
            .context("Failed to parse value grid")?;

        let grid = rasters_to_grid(&lon, &lat, &values, decoder)
            .with_context(|| format!("Invalid raster map {}", values_path.display()))?;

        Ok(GridLoadResult::new(grid, GridSourceType::Raster))
    }

    /// Load a map from a header-less `(angle proxy, latitude, value)` CSV
    pub fn load_from_table(path: &Path, decoder: LongitudeDecoder) -> Result<GridLoadResult> {
        let columns =
            table_parser::parse_table_csv_to_columns(path).context("Failed to parse CSV file")?;

        let grid = columns_to_grid(&columns, decoder)
            .with_context(|| format!("Invalid table map {}", path.display()))?;

        Ok(GridLoadResult::new(grid, GridSourceType::Table))
    }
}

/// Combine three rasters of identical shape into equatorial samples
pub fn rasters_to_grid(
    lon: &Raster,
    lat: &Raster,
    values: &Raster,
    decoder: LongitudeDecoder,
) -> Result<RawGrid> {
    ensure!(
        lon.shape() == lat.shape() && lat.shape() == values.shape(),
        "Raster shapes differ: longitude {:?}, latitude {:?}, values {:?}",
        lon.shape(),
        lat.shape(),
        values.shape()
    );

    let samples = lon
        .values()
        .iter()
        .zip(lat.values())
        .zip(values.values())
        .enumerate()
        .map(|(i, ((&l, &b), &v))| {
            let cols = lon.cols();
            sample(l, b, v, decoder)
                .with_context(|| format!("Raster cell ({}, {})", i / cols + 1, i % cols + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    to_raw_grid(samples)
}

/// Convert parsed table columns into equatorial samples
pub fn columns_to_grid(columns: &TableColumns, decoder: LongitudeDecoder) -> Result<RawGrid> {
    let samples = columns
        .angle_proxy
        .iter()
        .zip(&columns.latitude)
        .zip(&columns.value)
        .enumerate()
        .map(|(i, ((&l, &b), &v))| {
            sample(l, b, v, decoder).with_context(|| format!("Table row {}", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    to_raw_grid(samples)
}

fn sample(raw_lon: f64, lat: f64, value: f64, decoder: LongitudeDecoder) -> Result<GridSample> {
    if !raw_lon.is_finite() || !lat.is_finite() {
        bail!("Non-finite coordinate ({}, {})", raw_lon, lat);
    }

    Ok(GridSample {
        position: SkyPosition::new(decoder.decode(raw_lon), Degrees::new(lat), Frame::Equatorial),
        value,
    })
}

fn to_raw_grid(samples: Vec<GridSample>) -> Result<RawGrid> {
    if samples.is_empty() {
        bail!("Coverage map contains no samples");
    }
    Ok(RawGrid::new(samples))
}
