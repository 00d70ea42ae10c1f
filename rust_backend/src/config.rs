//! Coverage map configuration file support.
//!
//! This module describes where the three efficiency threshold maps come from
//! and how their longitude column is encoded, read from a TOML file:
//!
//! ```toml
//! data_dir = "data"
//!
//! [[maps]]
//! threshold = 50
//! longitude = "degrees"
//! [maps.source]
//! format = "raster"
//! longitude_grid = "ra_grid.dat"
//! latitude_grid = "dec_grid.dat"
//! values = "6am_700_10_noMoon_conf5_V9_50d_49m.dat"
//!
//! [[maps]]
//! threshold = 70
//! longitude = "negative_hours"
//! [maps.source]
//! format = "table"
//! path = "70pc_Cheops_Map_data.csv"
//! ```

use qtty::{Degree, Degrees, HourAngles};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::EfficiencyThreshold;
use crate::core::error::{CoverageResult, ObservabilityError};

/// Default upper bound for interpolated cumulative observable time.
pub const DEFAULT_CLAMP_MAX: f64 = 80.0;

/// Coverage configuration from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Base directory for relative source paths.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub maps: Vec<MapConfig>,
}

/// Per-threshold pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub threshold: EfficiencyThreshold,
    pub source: GridSource,
    #[serde(default)]
    pub longitude: LongitudeDecoder,
    #[serde(default = "default_clamp_max")]
    pub clamp_max: f64,
}

/// Where the samples of one map are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum GridSource {
    /// Three co-indexed whitespace-delimited grids.
    Raster {
        longitude_grid: PathBuf,
        latitude_grid: PathBuf,
        values: PathBuf,
    },
    /// Header-less CSV with `(angle proxy, latitude, value)` rows.
    Table { path: PathBuf },
}

/// How the raw longitude column maps to equatorial longitude in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongitudeDecoder {
    /// Plain degrees, `value mod 360`.
    #[default]
    Degrees,
    /// Hour-like code, `(-15 * value) mod 360`.
    NegativeHours,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_clamp_max() -> f64 {
    DEFAULT_CLAMP_MAX
}

impl LongitudeDecoder {
    pub fn decode(self, raw: f64) -> Degrees {
        match self {
            LongitudeDecoder::Degrees => Degrees::new(raw).wrap_pos(),
            LongitudeDecoder::NegativeHours => HourAngles::new(-raw).to::<Degree>().wrap_pos(),
        }
    }
}

impl GridSource {
    /// Resolve relative paths against `data_dir`.
    pub fn resolve(&self, data_dir: &Path) -> GridSource {
        match self {
            GridSource::Raster {
                longitude_grid,
                latitude_grid,
                values,
            } => GridSource::Raster {
                longitude_grid: data_dir.join(longitude_grid),
                latitude_grid: data_dir.join(latitude_grid),
                values: data_dir.join(values),
            },
            GridSource::Table { path } => GridSource::Table {
                path: data_dir.join(path),
            },
        }
    }
}

impl Default for CoverageConfig {
    /// Layout of the reference deployment's `data/` directory.
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            maps: vec![
                MapConfig {
                    threshold: EfficiencyThreshold::Fifty,
                    source: GridSource::Raster {
                        longitude_grid: PathBuf::from("ra_grid.dat"),
                        latitude_grid: PathBuf::from("dec_grid.dat"),
                        values: PathBuf::from("6am_700_10_noMoon_conf5_V9_50d_49m.dat"),
                    },
                    longitude: LongitudeDecoder::Degrees,
                    clamp_max: DEFAULT_CLAMP_MAX,
                },
                MapConfig {
                    threshold: EfficiencyThreshold::Seventy,
                    source: GridSource::Table {
                        path: PathBuf::from("70pc_Cheops_Map_data.csv"),
                    },
                    longitude: LongitudeDecoder::NegativeHours,
                    clamp_max: DEFAULT_CLAMP_MAX,
                },
                MapConfig {
                    threshold: EfficiencyThreshold::Eighty,
                    source: GridSource::Table {
                        path: PathBuf::from("80pc_Cheops_Map_data.csv"),
                    },
                    longitude: LongitudeDecoder::NegativeHours,
                    clamp_max: DEFAULT_CLAMP_MAX,
                },
            ],
        }
    }
}

impl CoverageConfig {
    /// Load coverage configuration from a TOML file.
    ///
    /// A relative `data_dir` is resolved against the directory containing the
    /// file.
    ///
    /// # Returns
    /// * `Ok(CoverageConfig)` if successful
    /// * `Err(ObservabilityError::Configuration)` if the file cannot be read,
    ///   parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoverageResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ObservabilityError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> CoverageResult<Self> {
        let config: CoverageConfig = toml::from_str(content).map_err(|e| {
            ObservabilityError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `coverage.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> CoverageResult<Self> {
        let search_paths = [
            PathBuf::from("coverage.toml"),
            PathBuf::from("rust_backend/coverage.toml"),
            PathBuf::from("../coverage.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ObservabilityError::Configuration(
            "No coverage.toml found in standard locations".to_string(),
        ))
    }

    /// [`Self::from_default_location`], falling back to [`Self::default`]
    /// when no file is found.
    pub fn discover() -> CoverageResult<Self> {
        match Self::from_default_location() {
            Ok(config) => Ok(config),
            Err(ObservabilityError::Configuration(msg)) if msg.starts_with("No coverage.toml") => {
                log::info!("No coverage.toml found, using the default data layout");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Check that every threshold appears exactly once with a usable clamp.
    pub fn validate(&self) -> CoverageResult<()> {
        for threshold in EfficiencyThreshold::ALL {
            let count = self
                .maps
                .iter()
                .filter(|m| m.threshold == threshold)
                .count();
            if count != 1 {
                return Err(ObservabilityError::Configuration(format!(
                    "Expected exactly one map for threshold {}, found {}",
                    threshold, count
                )));
            }
        }

        for map in &self.maps {
            if !map.clamp_max.is_finite() || map.clamp_max <= 0.0 {
                return Err(ObservabilityError::Configuration(format!(
                    "Map {} has invalid clamp_max {}",
                    map.threshold, map.clamp_max
                )));
            }
        }

        Ok(())
    }

    pub fn map(&self, threshold: EfficiencyThreshold) -> Option<&MapConfig> {
        self.maps.iter().find(|m| m.threshold == threshold)
    }
}
