//! Equatorial ↔ geocentric mean ecliptic rotation.
//!
//! The rotation is a single turn about the x-axis (towards the vernal
//! equinox) by the mean obliquity of the ecliptic at J2000.0. No precession,
//! nutation or aberration is applied: positions are treated as static.

use once_cell::sync::Lazy;
use qtty::{Arcseconds, Degree, Degrees, Radians};

use crate::core::domain::{Frame, SkyPosition};

/// Mean obliquity of the ecliptic at J2000.0 (IAU 2006): 84381.406″.
pub const J2000_MEAN_OBLIQUITY: Arcseconds = Arcseconds::new(84381.406);

static OBLIQUITY_SIN_COS: Lazy<(f64, f64)> = Lazy::new(|| J2000_MEAN_OBLIQUITY.sin_cos());

/// Transform a position into the mission frame.
///
/// Equatorial input is rotated; mission-frame input only has its longitude
/// wrapped. Output longitude is normalised to [0, 360).
///
/// # Examples
///
/// ```
/// use sky_observability::coordinates::to_mission;
/// use sky_observability::core::domain::SkyPosition;
///
/// // The vernal equinox lies on both fundamental planes.
/// let p = to_mission(&SkyPosition::equatorial(0.0, 0.0));
/// assert!(p.lon().value().abs() < 1e-12);
/// assert!(p.lat().value().abs() < 1e-12);
/// ```
pub fn to_mission(position: &SkyPosition) -> SkyPosition {
    match position.frame() {
        Frame::Mission => {
            SkyPosition::new(position.lon().wrap_pos(), position.lat(), Frame::Mission)
        }
        Frame::Equatorial => {
            let (lon, lat) = rotate(position.lon(), position.lat(), 1.0);
            SkyPosition::new(lon, lat, Frame::Mission)
        }
    }
}

/// Transform a position into the equatorial frame.
pub fn to_equatorial(position: &SkyPosition) -> SkyPosition {
    match position.frame() {
        Frame::Equatorial => {
            SkyPosition::new(position.lon().wrap_pos(), position.lat(), Frame::Equatorial)
        }
        Frame::Mission => {
            let (lon, lat) = rotate(position.lon(), position.lat(), -1.0);
            SkyPosition::new(lon, lat, Frame::Equatorial)
        }
    }
}

/// Rotate about the x-axis by `sign * obliquity`.
fn rotate(lon: Degrees, lat: Degrees, sign: f64) -> (Degrees, Degrees) {
    let (sin_eps, cos_eps) = *OBLIQUITY_SIN_COS;
    let sin_eps = sign * sin_eps;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    let x = cos_lat * cos_lon;
    let y = cos_lat * sin_lon;
    let z = sin_lat;

    let y_rot = y * cos_eps + z * sin_eps;
    let z_rot = -y * sin_eps + z * cos_eps;

    let out_lon = Radians::new(y_rot.atan2(x)).to::<Degree>().wrap_pos();
    let out_lat = Radians::new(z_rot.clamp(-1.0, 1.0).asin()).to::<Degree>();
    (out_lon, out_lat)
}
