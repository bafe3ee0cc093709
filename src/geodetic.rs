//! Geometry of the WGS84 reference ellipsoid.

use crate::constants::{WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS};

/// Get the distance from the centre of the Earth to WGS84 "sea level" at the
/// given geodetic latitude \[degrees\]. The result is in \[metres\].
///
/// This treats the ellipsoid surface as the point (a cos φ, b sin φ), which is
/// a simplification, but it is the same radius that gets subtracted back out
/// in [`crate::geometry::to_geocentric`], so the two always agree.
///
/// Latitudes outside \[-90, 90\] are not rejected; the trigonometry simply
/// wraps.
pub fn sea_level_radius(latitude_deg: f64) -> f64 {
    let (s_lat, c_lat) = latitude_deg.to_radians().sin_cos();
    (WGS84_EQUATORIAL_RADIUS * c_lat).hypot(WGS84_POLAR_RADIUS * s_lat)
}
