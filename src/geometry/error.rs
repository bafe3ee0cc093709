//! Errors from converting antenna offsets into geocentric positions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Could not convert geodetic position (lon {longitude_deg}°, lat {latitude_deg}°, height {height_m} m) to geocentric: {reason}")]
    Conversion {
        longitude_deg: f64,
        latitude_deg: f64,
        height_m: f64,
        reason: String,
    },

    #[error("Antenna {index}: {source}")]
    Antenna {
        index: usize,
        #[source]
        source: Box<GeometryError>,
    },
}
