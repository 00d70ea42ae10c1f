//! Coverage map loading.
//!
//! The loader combines the raster and table parsers with the configured
//! longitude decoding and produces [`RawGrid`](crate::coverage::grid::RawGrid)s
//! ready for the map builder.
//!
//! # Example
//!
//! ```no_run
//! use sky_observability::config::{GridSource, LongitudeDecoder};
//! use sky_observability::io::loaders::GridLoader;
//! use std::path::PathBuf;
//!
//! let source = GridSource::Table {
//!     path: PathBuf::from("data/80pc_Cheops_Map_data.csv"),
//! };
//! let result = GridLoader::load(&source, LongitudeDecoder::NegativeHours)
//!     .expect("Failed to load");
//! println!("Loaded {} samples", result.num_samples);
//! ```

pub mod loaders;

#[cfg(test)]
mod loaders_tests;

pub use loaders::{GridLoadResult, GridLoader, GridSourceType};
