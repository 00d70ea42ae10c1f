//! Sky-coverage observability estimation.
//!
//! Three efficiency threshold maps (50, 70 and 80%) describe how long a
//! target can be observed from the mission's orbit. They are sampled on a
//! sky grid, fitted with C¹ Clough–Tocher interpolants in the geocentric
//! mean ecliptic frame and queried per target.
//!
//! ```no_run
//! use sky_observability::{CoverageConfig, CoverageModel, SkyPosition};
//!
//! let config = CoverageConfig::from_default_location()?;
//! let model = CoverageModel::build(&config)?;
//! let result = model.evaluate(&SkyPosition::equatorial(279.23, 38.78))?;
//! println!("{} days, class {}", result.observable_days.value(), result.max_efficiency.percent());
//! # Ok::<(), sky_observability::ObservabilityError>(())
//! ```

pub mod config;
pub mod coordinates;
pub mod core;
pub mod coverage;
pub mod interpolation;
pub mod io;
pub mod parsing;
pub mod services;

pub use config::{CoverageConfig, GridSource, LongitudeDecoder, MapConfig};
pub use core::{
    CoverageResult, EfficiencyClass, EfficiencyThreshold, Frame, ObservabilityError,
    ObservabilityResult, SkyPosition,
};
pub use coverage::CoverageInterpolant;
pub use services::{observability, CoverageModel};
