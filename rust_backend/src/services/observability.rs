//! Observability estimation service.
//!
//! Turns the three efficiency threshold maps into a single answer per target:
//! the cumulative time at 50% efficiency, an estimate of how many days the
//! target is observable, and the highest efficiency tier it reaches.
//!
//! ## Banding
//! Each map value counts the time spent at or above its threshold, so the
//! differences between consecutive maps isolate the 50-70% and 70-80% bands.
//! Each band is divided by its nominal duty cycle:
//!
//! ```text
//! days = (v50 - v70) / 0.60 + (v70 - v80) / 0.75 + v80 / 0.90
//! ```
//!
//! clamped to [0, 365].

use qtty::Days;

use crate::config::CoverageConfig;
use crate::coordinates::ecliptic::to_mission;
use crate::core::domain::{EfficiencyClass, EfficiencyThreshold, ObservabilityResult, SkyPosition};
use crate::core::error::{CoverageResult, ObservabilityError};
use crate::coverage::builder::build_interpolant;
use crate::coverage::interpolant::CoverageInterpolant;

/// Nominal duty cycle of the 50-70% band.
pub const FIFTY_BAND_DUTY: f64 = 0.60;
/// Nominal duty cycle of the 70-80% band.
pub const SEVENTY_BAND_DUTY: f64 = 0.75;
/// Nominal duty cycle above 80%.
pub const EIGHTY_BAND_DUTY: f64 = 0.90;
/// Upper bound of the observable-days estimate.
pub const MAX_OBSERVABLE_DAYS: f64 = 365.0;

/// Estimated observable days from the three clamped map values.
///
/// No ordering between the inputs is assumed; inconsistent values are
/// absorbed by the final clamp.
pub fn cumulative_days(v50: f64, v70: f64, v80: f64) -> Days {
    let days = (v50 - v70) / FIFTY_BAND_DUTY
        + (v70 - v80) / SEVENTY_BAND_DUTY
        + v80 / EIGHTY_BAND_DUTY;
    Days::new(days.clamp(0.0, MAX_OBSERVABLE_DAYS))
}

/// The three fitted maps, built once and queried many times.
///
/// Immutable after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct CoverageModel {
    interpolants: [CoverageInterpolant; 3],
}

impl CoverageModel {
    /// Load and fit every map described by `config`.
    ///
    /// Any failing map aborts the build.
    pub fn build(config: &CoverageConfig) -> CoverageResult<Self> {
        config.validate()?;

        let build = |threshold: EfficiencyThreshold| -> CoverageResult<CoverageInterpolant> {
            let map = config.map(threshold).ok_or_else(|| {
                ObservabilityError::Configuration(format!("No map configured for {}", threshold))
            })?;
            build_interpolant(map, &config.data_dir)
        };

        let model = Self::from_interpolants(
            build(EfficiencyThreshold::Fifty)?,
            build(EfficiencyThreshold::Seventy)?,
            build(EfficiencyThreshold::Eighty)?,
        );
        log::info!("Coverage model ready ({} maps)", EfficiencyThreshold::ALL.len());
        Ok(model)
    }

    /// Assemble a model from already fitted maps.
    pub fn from_interpolants(
        fifty: CoverageInterpolant,
        seventy: CoverageInterpolant,
        eighty: CoverageInterpolant,
    ) -> Self {
        Self {
            interpolants: [fifty, seventy, eighty],
        }
    }

    pub fn interpolant(&self, threshold: EfficiencyThreshold) -> &CoverageInterpolant {
        &self.interpolants[threshold.index()]
    }

    /// Estimate observability of one target.
    ///
    /// ## Arguments
    /// * `position` - Target position; equatorial positions are transformed
    ///   to the mission frame, mission-frame positions only have their
    ///   longitude wrapped into [0, 360)
    ///
    /// ## Returns
    /// The clamped 50% map value, the observable days estimate and the
    /// highest efficiency class whose map value exceeds 0.5
    ///
    /// ## Errors
    /// `InvalidInput` for non-finite angles or a latitude outside [-90, 90]
    pub fn evaluate(&self, position: &SkyPosition) -> CoverageResult<ObservabilityResult> {
        position.ensure_finite()?;
        let mission = to_mission(position);

        let [v50, v70, v80] = EfficiencyThreshold::ALL.map(|t| self.interpolant(t).value_at(&mission));

        Ok(ObservabilityResult {
            cumulative_time_50: v50,
            observable_days: cumulative_days(v50, v70, v80),
            max_efficiency: EfficiencyClass::classify(v50, v70, v80),
        })
    }

    /// Evaluate a batch of targets; one result per input, in order.
    pub fn evaluate_many(&self, positions: &[SkyPosition]) -> Vec<CoverageResult<ObservabilityResult>> {
        positions.iter().map(|p| self.evaluate(p)).collect()
    }
}

/// Estimate observability with a caller-supplied model, or build one from the
/// discovered configuration when `model` is `None`.
///
/// Building a model is expensive; callers with more than one query should
/// build a [`CoverageModel`] once and pass it in.
pub fn observability(
    position: &SkyPosition,
    model: Option<&CoverageModel>,
) -> CoverageResult<ObservabilityResult> {
    match model {
        Some(model) => model.evaluate(position),
        None => {
            position.ensure_finite()?;
            let config = CoverageConfig::discover()?;
            CoverageModel::build(&config)?.evaluate(position)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::grid::{CoverageGrid, GridPoint, WrappedGrid};
    use approx::assert_abs_diff_eq;

    fn uniform(value: f64) -> CoverageInterpolant {
        let mut points = Vec::new();
        for j in 0..=12 {
            for i in 0..24 {
                points.push(GridPoint {
                    lon: i as f64 * 15.0,
                    lat: -90.0 + j as f64 * 15.0,
                    value,
                });
            }
        }
        CoverageInterpolant::fit_default(&WrappedGrid::mirror(&CoverageGrid::from_points(points)))
            .unwrap()
    }

    /// Positive everywhere, peaks at lon 180
    fn ramp(scale: f64) -> CoverageInterpolant {
        let mut points = Vec::new();
        for j in 0..=12 {
            for i in 0..24 {
                let lon = i as f64 * 15.0;
                points.push(GridPoint {
                    lon,
                    lat: -90.0 + j as f64 * 15.0,
                    value: scale * (1.5 - lon.to_radians().cos()),
                });
            }
        }
        CoverageInterpolant::fit_default(&WrappedGrid::mirror(&CoverageGrid::from_points(points)))
            .unwrap()
    }

    fn model(v50: f64, v70: f64, v80: f64) -> CoverageModel {
        CoverageModel::from_interpolants(uniform(v50), uniform(v70), uniform(v80))
    }

    #[test]
    fn test_cumulative_days_banding() {
        assert_abs_diff_eq!(cumulative_days(0.9, 0.9, 0.9).value(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cumulative_days(6.0, 3.0, 0.0).value(), 9.0, epsilon = 1e-12);
        assert_eq!(cumulative_days(0.0, 0.0, 0.0).value(), 0.0);
    }

    #[test]
    fn test_cumulative_days_is_clamped() {
        assert_abs_diff_eq!(cumulative_days(80.0, 0.0, 0.0).value(), 80.0 / 0.6, epsilon = 1e-9);
        // inverted maps would give a negative estimate
        assert_eq!(cumulative_days(0.0, 80.0, 0.0).value(), 0.0);
        assert_eq!(cumulative_days(400.0, 0.0, 0.0).value(), MAX_OBSERVABLE_DAYS);
    }

    #[test]
    fn test_uniform_high_coverage() {
        let result = model(0.9, 0.9, 0.9)
            .evaluate(&SkyPosition::equatorial(83.8, -5.4))
            .unwrap();

        assert_abs_diff_eq!(result.cumulative_time_50, 0.9, epsilon = 1e-9);
        assert_abs_diff_eq!(result.observable_days.value(), 1.0, epsilon = 1e-9);
        assert_eq!(result.max_efficiency, EfficiencyClass::Eighty);
    }

    #[test]
    fn test_no_coverage() {
        let result = model(0.0, 0.0, 0.0)
            .evaluate(&SkyPosition::equatorial(266.4, -29.0))
            .unwrap();

        assert_eq!(result.cumulative_time_50, 0.0);
        assert_eq!(result.observable_days.value(), 0.0);
        assert_eq!(result.max_efficiency, EfficiencyClass::None);
    }

    #[test]
    fn test_class_picks_highest_tier_above_half() {
        let m = model(10.0, 2.0, 0.4);
        let result = m.evaluate(&SkyPosition::equatorial(10.0, 10.0)).unwrap();
        assert_eq!(result.max_efficiency, EfficiencyClass::Seventy);
        assert_abs_diff_eq!(
            result.observable_days.value(),
            8.0 / 0.60 + 1.6 / 0.75 + 0.4 / 0.90,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_invalid_positions() {
        let m = model(1.0, 1.0, 1.0);
        for position in [
            SkyPosition::equatorial(f64::NAN, 0.0),
            SkyPosition::equatorial(0.0, f64::INFINITY),
            SkyPosition::equatorial(0.0, 91.0),
        ] {
            assert!(matches!(
                m.evaluate(&position).unwrap_err(),
                ObservabilityError::InvalidInput(_)
            ));
        }
    }

    #[test]
    fn test_evaluate_many_keeps_order_and_errors() {
        let m = model(0.9, 0.9, 0.9);
        let results = m.evaluate_many(&[
            SkyPosition::equatorial(10.0, 10.0),
            SkyPosition::equatorial(f64::NAN, 10.0),
            SkyPosition::mission(200.0, -45.0),
        ]);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(
            results[2].as_ref().unwrap().max_efficiency,
            EfficiencyClass::Eighty
        );
    }

    #[test]
    fn test_observability_uses_supplied_model() {
        let m = model(0.9, 0.9, 0.0);
        let position = SkyPosition::equatorial(120.0, 30.0);
        assert_eq!(
            observability(&position, Some(&m)).unwrap(),
            m.evaluate(&position).unwrap()
        );
    }

    #[test]
    fn test_observability_rejects_bad_input_before_building() {
        let err = observability(&SkyPosition::equatorial(f64::NAN, 0.0), None).unwrap_err();
        assert!(matches!(err, ObservabilityError::InvalidInput(_)));
    }

    #[test]
    fn test_mission_longitude_outside_range_wraps() {
        let m = CoverageModel::from_interpolants(ramp(20.0), ramp(8.0), ramp(2.0));

        for (outside, inside) in [(370.0, 10.0), (-30.0, 330.0), (725.0, 5.0)] {
            let wrapped = m.evaluate(&SkyPosition::mission(outside, 0.0)).unwrap();
            let direct = m.evaluate(&SkyPosition::mission(inside, 0.0)).unwrap();
            assert_eq!(wrapped, direct, "lon {}", outside);
            assert_eq!(wrapped.max_efficiency, EfficiencyClass::Eighty);
        }
    }

    #[test]
    fn test_interpolant_lookup() {
        let m = model(1.0, 2.0, 3.0);
        let probe = SkyPosition::mission(100.0, 0.0);
        assert_abs_diff_eq!(
            m.interpolant(EfficiencyThreshold::Seventy).value_at(&probe),
            2.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            m.interpolant(EfficiencyThreshold::Eighty).value_at(&probe),
            3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoverageModel>();
    }
}
