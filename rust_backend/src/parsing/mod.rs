//! Parsers for the coverage map source formats.
//!
//! # Parsers
//!
//! - [`raster_parser`]: whitespace-delimited numeric grids (`.dat`), one file
//!   per coordinate and one for the values
//! - [`table_parser`]: header-less CSV tables of `(angle proxy, latitude, value)`
//!
//! # Example
//!
//! ```no_run
//! use sky_observability::parsing::raster_parser::parse_raster_file;
//! use std::path::Path;
//!
//! let ra = parse_raster_file(Path::new("data/ra_grid.dat"))
//!     .expect("Failed to parse raster");
//! println!("{} x {} grid", ra.rows(), ra.cols());
//! ```

pub mod raster_parser;
pub mod table_parser;


pub use raster_parser::Raster;
pub use table_parser::TableColumns;
