//! Domain models for sky positions, efficiency thresholds and query results.
//!
//! This module provides the core data structures shared by the coverage map
//! builder and the observability evaluator.

use qtty::{Days, Degrees};
use serde::{Deserialize, Serialize};

use super::error::{CoverageResult, ObservabilityError};

/// Reference frame a [`SkyPosition`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frame {
    /// Equatorial frame: right ascension / declination.
    Equatorial,
    /// Mission-fixed frame of the coverage maps (geocentric mean ecliptic).
    Mission,
}

/// A celestial coordinate pair tagged with its reference frame.
///
/// `lon` is right ascension for [`Frame::Equatorial`] and ecliptic longitude
/// for [`Frame::Mission`]; `lat` is declination or ecliptic latitude.
///
/// # Examples
///
/// ```
/// use sky_observability::core::domain::{Frame, SkyPosition};
///
/// let vega = SkyPosition::equatorial(279.2347, 38.7837);
/// assert_eq!(vega.frame(), Frame::Equatorial);
/// assert!(vega.ensure_finite().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    lon: Degrees,
    lat: Degrees,
    frame: Frame,
}

impl SkyPosition {
    pub fn new(lon: Degrees, lat: Degrees, frame: Frame) -> Self {
        Self { lon, lat, frame }
    }

    /// Right ascension / declination in degrees.
    pub fn equatorial(ra_deg: f64, dec_deg: f64) -> Self {
        Self::new(Degrees::new(ra_deg), Degrees::new(dec_deg), Frame::Equatorial)
    }

    /// Mission-frame longitude / latitude in degrees.
    pub fn mission(lon_deg: f64, lat_deg: f64) -> Self {
        Self::new(Degrees::new(lon_deg), Degrees::new(lat_deg), Frame::Mission)
    }

    pub fn lon(&self) -> Degrees {
        self.lon
    }

    pub fn lat(&self) -> Degrees {
        self.lat
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Reject positions that cannot be pushed through the transform.
    ///
    /// Both angles must be finite and the latitude must lie in [-90, 90].
    pub fn ensure_finite(&self) -> CoverageResult<()> {
        let (lon, lat) = (self.lon.value(), self.lat.value());
        if !lon.is_finite() || !lat.is_finite() {
            return Err(ObservabilityError::InvalidInput(format!(
                "Non-finite position ({}, {})",
                lon, lat
            )));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ObservabilityError::InvalidInput(format!(
                "Latitude {} outside [-90, 90]",
                lat
            )));
        }
        Ok(())
    }
}

/// Minimum duty-cycle guarantee a coverage map was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EfficiencyThreshold {
    Fifty,
    Seventy,
    Eighty,
}

impl EfficiencyThreshold {
    /// All thresholds, in the order the evaluator queries them.
    pub const ALL: [EfficiencyThreshold; 3] = [
        EfficiencyThreshold::Fifty,
        EfficiencyThreshold::Seventy,
        EfficiencyThreshold::Eighty,
    ];

    pub fn percent(self) -> u8 {
        match self {
            EfficiencyThreshold::Fifty => 50,
            EfficiencyThreshold::Seventy => 70,
            EfficiencyThreshold::Eighty => 80,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            EfficiencyThreshold::Fifty => 0,
            EfficiencyThreshold::Seventy => 1,
            EfficiencyThreshold::Eighty => 2,
        }
    }
}

impl std::fmt::Display for EfficiencyThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl TryFrom<u8> for EfficiencyThreshold {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            50 => Ok(EfficiencyThreshold::Fifty),
            70 => Ok(EfficiencyThreshold::Seventy),
            80 => Ok(EfficiencyThreshold::Eighty),
            other => Err(format!(
                "Unknown efficiency threshold: {}. Use 50, 70 or 80",
                other
            )),
        }
    }
}

impl From<EfficiencyThreshold> for u8 {
    fn from(threshold: EfficiencyThreshold) -> Self {
        threshold.percent()
    }
}

/// Highest efficiency tier at which a target accumulates more than half a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EfficiencyClass {
    None,
    Fifty,
    Seventy,
    Eighty,
}

impl EfficiencyClass {
    /// Cumulative time a tier must exceed to count as achieved.
    pub const ACHIEVED_ABOVE: f64 = 0.5;

    /// Classify from the three clamped map values.
    ///
    /// The comparison is strict: a value of exactly 0.5 does not qualify.
    pub fn classify(v50: f64, v70: f64, v80: f64) -> Self {
        if v80 > Self::ACHIEVED_ABOVE {
            EfficiencyClass::Eighty
        } else if v70 > Self::ACHIEVED_ABOVE {
            EfficiencyClass::Seventy
        } else if v50 > Self::ACHIEVED_ABOVE {
            EfficiencyClass::Fifty
        } else {
            EfficiencyClass::None
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            EfficiencyClass::None => 0,
            EfficiencyClass::Fifty => 50,
            EfficiencyClass::Seventy => 70,
            EfficiencyClass::Eighty => 80,
        }
    }
}

impl TryFrom<u8> for EfficiencyClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EfficiencyClass::None),
            50 => Ok(EfficiencyClass::Fifty),
            70 => Ok(EfficiencyClass::Seventy),
            80 => Ok(EfficiencyClass::Eighty),
            other => Err(format!("Unknown efficiency class: {}", other)),
        }
    }
}

impl From<EfficiencyClass> for u8 {
    fn from(class: EfficiencyClass) -> Self {
        class.percent()
    }
}

/// Outcome of one observability query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityResult {
    /// Clamped value of the 50% map at the target.
    pub cumulative_time_50: f64,
    /// Estimated number of fully observable days, in [0, 365].
    pub observable_days: Days,
    pub max_efficiency: EfficiencyClass,
}
