//! Clamped coverage surface: missing or non-finite fits read as 0.0, then
//! every value is clamped to `[0, clamp_max]`.

use crate::config::DEFAULT_CLAMP_MAX;
use crate::coordinates::ecliptic::to_mission;
use crate::core::domain::SkyPosition;
use crate::core::error::{CoverageResult, ObservabilityError};
use crate::interpolation::CloughTocher2d;

use super::grid::WrappedGrid;

/// Fitted surface of one efficiency threshold map.
///
/// Queries never fail: positions outside the fitted area, or where the fit
/// produces a non-finite number, read as 0.0, and every value is clamped to
/// `[0, clamp_max]`.
#[derive(Debug, Clone)]
pub struct CoverageInterpolant {
    fit: CloughTocher2d,
    clamp_max: f64,
}

impl CoverageInterpolant {
    /// Fit a Clough–Tocher surface to the wrapped grid.
    pub fn fit(grid: &WrappedGrid, clamp_max: f64) -> CoverageResult<Self> {
        if !clamp_max.is_finite() || clamp_max <= 0.0 {
            return Err(ObservabilityError::Configuration(format!(
                "clamp_max must be finite and positive, got {}",
                clamp_max
            )));
        }

        let (points, values) = grid.to_arrays();
        let fit = CloughTocher2d::new(&points, &values)?;
        Ok(Self { fit, clamp_max })
    }

    /// Same as [`Self::fit`] with the default clamp.
    pub fn fit_default(grid: &WrappedGrid) -> CoverageResult<Self> {
        Self::fit(grid, DEFAULT_CLAMP_MAX)
    }

    pub fn clamp_max(&self) -> f64 {
        self.clamp_max
    }

    /// Number of distinct sites the surface was fitted on.
    pub fn site_count(&self) -> usize {
        self.fit.triangulation().points().len()
    }

    /// Unclamped fit at mission-frame `(lon, lat)` in degrees.
    pub fn raw_value(&self, lon: f64, lat: f64) -> Option<f64> {
        self.fit.evaluate(lon, lat)
    }

    /// Clamped value at `position`; equatorial input is transformed first.
    pub fn value_at(&self, position: &SkyPosition) -> f64 {
        let mission = to_mission(position);
        let raw = self
            .raw_value(mission.lon().value(), mission.lat().value())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        raw.clamp(0.0, self.clamp_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::grid::{CoverageGrid, GridPoint};
    use approx::assert_abs_diff_eq;

    fn sky_grid(step: f64, f: impl Fn(f64, f64) -> f64) -> WrappedGrid {
        let mut points = Vec::new();
        let n_lon = (360.0 / step) as usize;
        let n_lat = (160.0 / step) as usize + 1;
        for j in 0..n_lat {
            let lat = -80.0 + j as f64 * step;
            for i in 0..n_lon {
                let lon = i as f64 * step;
                points.push(GridPoint {
                    lon,
                    lat,
                    value: f(lon, lat),
                });
            }
        }
        WrappedGrid::mirror(&CoverageGrid::from_points(points))
    }

    fn smooth(lon: f64, lat: f64) -> f64 {
        40.0 + 20.0 * lon.to_radians().cos() * lat.to_radians().cos()
    }

    #[test]
    fn test_continuous_across_the_seam() {
        let interp = CoverageInterpolant::fit_default(&sky_grid(5.0, smooth)).unwrap();

        for lat in [-60.0, -12.5, 0.0, 33.0, 70.0] {
            let west = interp.value_at(&SkyPosition::mission(359.999, lat));
            let east = interp.value_at(&SkyPosition::mission(0.001, lat));
            assert!((west - east).abs() < 0.1, "lat {}: {} vs {}", lat, west, east);
        }
    }

    #[test]
    fn test_matches_smooth_field() {
        let interp = CoverageInterpolant::fit_default(&sky_grid(5.0, smooth)).unwrap();

        for &(lon, lat) in &[(12.3, 4.4), (181.0, -40.0), (277.7, 61.2)] {
            let got = interp.value_at(&SkyPosition::mission(lon, lat));
            assert!((got - smooth(lon, lat)).abs() < 0.05, "({}, {})", lon, lat);
        }
    }

    #[test]
    fn test_outside_hull_reads_zero() {
        let interp = CoverageInterpolant::fit_default(&sky_grid(10.0, |_, _| 30.0)).unwrap();

        assert_eq!(interp.value_at(&SkyPosition::mission(120.0, 85.0)), 0.0);
        assert!(interp.raw_value(120.0, -89.0).is_none());
        assert_abs_diff_eq!(
            interp.value_at(&SkyPosition::mission(120.0, 45.0)),
            30.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_values_are_clamped() {
        let high = CoverageInterpolant::fit(&sky_grid(10.0, |_, _| 120.0), 80.0).unwrap();
        assert_eq!(high.value_at(&SkyPosition::mission(50.0, 10.0)), 80.0);

        let low = CoverageInterpolant::fit(&sky_grid(10.0, |_, _| -3.0), 80.0).unwrap();
        assert_eq!(low.value_at(&SkyPosition::mission(50.0, 10.0)), 0.0);

        let tight = CoverageInterpolant::fit(&sky_grid(10.0, |_, _| 120.0), 5.0).unwrap();
        assert_eq!(tight.clamp_max(), 5.0);
        assert_eq!(tight.value_at(&SkyPosition::mission(50.0, 10.0)), 5.0);
    }

    #[test]
    fn test_equatorial_queries_are_transformed() {
        let interp = CoverageInterpolant::fit_default(&sky_grid(5.0, smooth)).unwrap();
        let equatorial = SkyPosition::equatorial(100.0, 20.0);
        let mission = to_mission(&equatorial);

        assert_eq!(interp.value_at(&equatorial), interp.value_at(&mission));
    }

    #[test]
    fn test_fit_errors() {
        let tiny = WrappedGrid::mirror(&CoverageGrid::from_points(vec![
            GridPoint {
                lon: 100.0,
                lat: 0.0,
                value: 1.0,
            },
            GridPoint {
                lon: 110.0,
                lat: 0.0,
                value: 1.0,
            },
        ]));
        let err = CoverageInterpolant::fit_default(&tiny).unwrap_err();
        assert!(matches!(err, ObservabilityError::Fit(_)));

        let grid = sky_grid(30.0, |_, _| 1.0);
        assert!(matches!(
            CoverageInterpolant::fit(&grid, f64::NAN).unwrap_err(),
            ObservabilityError::Configuration(_)
        ));
    }

    #[test]
    fn test_interpolant_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoverageInterpolant>();
    }
}
