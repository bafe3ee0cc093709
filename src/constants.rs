//! Useful constants.
//!
//! The string defaults describe the LEDA correlator at OVRO; they seed
//! [`crate::write::ArrayMetadata::default`] rather than being used directly.

use marlu::LatLngHeight;

/// WGS84 equatorial (semi-major) radius \[metres\].
pub const WGS84_EQUATORIAL_RADIUS: f64 = 6378137.0;
/// WGS84 polar (semi-minor) radius \[metres\].
pub const WGS84_POLAR_RADIUS: f64 = 6356752.3142;

/// The name given to the single zenith field.
pub const FIELD_NAME: &str = "Zenith";
pub const ANTENNA_NAME_PREFIX: &str = "ANT";
pub const STATION_NAME: &str = "LWA-OVRO";
pub const CORRELATOR_NAME: &str = "LEDA512";
pub const OBSERVER: &str = "Default";
pub const PROJECT: &str = "Default";
/// CASA uses the telescope name to look up the reference position.
pub const TELESCOPE_NAME: &str = "OVRO_MMA";
pub const ANTENNA_TYPE: &str = "GROUND-BASED";
pub const ANTENNA_MOUNT: &str = "X-Y";
/// \[metres\]
pub const ANTENNA_DISH_DIAMETER: f64 = 2.0;
/// \[seconds\]
pub const DEFAULT_INT_TIME: f64 = 8.33;

/// Row intervals written for "valid forever" sub-table entries \[seconds\].
pub const FOREVER_INTERVAL: f64 = 1e30;

lazy_static::lazy_static! {
    /// Nominal centre of the OVRO-LWA, used when no array position is given.
    pub static ref OVRO_LWA_POSITION: LatLngHeight = LatLngHeight {
        longitude_rad: (-118.2816819_f64).to_radians(),
        latitude_rad: 37.2397808_f64.to_radians(),
        height_metres: 1183.48,
    };
}
