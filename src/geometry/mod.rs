//! Convert local antenna offsets into geocentric positions.
//!
//! Each antenna is placed at (0°, 0°) on the Earth, offset by its local East,
//! North and Up components, and then rotated to the array's latitude and
//! longitude. The result is treated as a WGS84 geodetic position and handed to
//! a [`GeodeticConverter`] to get geocentric XYZ.

mod error;

pub use error::GeometryError;

use log::{debug, trace};
use marlu::{
    erfa::{transform::geodetic_to_geocentric, Ellipsoid},
    LatLngHeight, XyzGeocentric,
};

use crate::{constants::OVRO_LWA_POSITION, geodetic::sea_level_radius};

/// An antenna's position relative to the array centre. All units are in
/// \[metres\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AntennaOffset {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl AntennaOffset {
    pub fn new(east: f64, north: f64, up: f64) -> AntennaOffset {
        AntennaOffset { east, north, up }
    }
}

/// The nominal centre of the array. Longitude and latitude are in \[degrees\],
/// altitude is in \[metres\] above WGS84 sea level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrayReference {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

impl ArrayReference {
    pub fn new(longitude_deg: f64, latitude_deg: f64, altitude_m: f64) -> ArrayReference {
        ArrayReference {
            longitude_deg,
            latitude_deg,
            altitude_m,
        }
    }

    pub fn to_latlngheight(self) -> LatLngHeight {
        LatLngHeight {
            longitude_rad: self.longitude_deg.to_radians(),
            latitude_rad: self.latitude_deg.to_radians(),
            height_metres: self.altitude_m,
        }
    }
}

impl Default for ArrayReference {
    fn default() -> Self {
        ArrayReference::from(*OVRO_LWA_POSITION)
    }
}

impl From<LatLngHeight> for ArrayReference {
    fn from(pos: LatLngHeight) -> Self {
        ArrayReference {
            longitude_deg: pos.longitude_rad.to_degrees(),
            latitude_deg: pos.latitude_rad.to_degrees(),
            altitude_m: pos.height_metres,
        }
    }
}

/// Something that can turn a geodetic (ellipsoidal) position into a
/// geocentric Cartesian one.
pub trait GeodeticConverter {
    fn geodetic_to_geocentric(&self, pos: LatLngHeight) -> Result<XyzGeocentric, GeometryError>;
}

/// Geodetic to geocentric conversion on the WGS84 ellipsoid, done by ERFA
/// (`eraGd2gce`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Wgs84;

impl GeodeticConverter for Wgs84 {
    fn geodetic_to_geocentric(&self, pos: LatLngHeight) -> Result<XyzGeocentric, GeometryError> {
        let err = |reason: String| GeometryError::Conversion {
            longitude_deg: pos.longitude_rad.to_degrees(),
            latitude_deg: pos.latitude_rad.to_degrees(),
            height_m: pos.height_metres,
            reason,
        };
        if !(pos.longitude_rad.is_finite()
            && pos.latitude_rad.is_finite()
            && pos.height_metres.is_finite())
        {
            return Err(err("non-finite input".to_string()));
        }
        if pos.latitude_rad.abs() > std::f64::consts::FRAC_PI_2 {
            return Err(err("latitude outside [-90°, 90°]".to_string()));
        }
        if pos.height_metres <= -sea_level_radius(pos.latitude_rad.to_degrees()) {
            return Err(err("height is below the centre of the Earth".to_string()));
        }

        let [x, y, z] = geodetic_to_geocentric(
            Ellipsoid::WGS84,
            pos.longitude_rad,
            pos.latitude_rad,
            pos.height_metres,
        )
        .map_err(|e| err(e.to_string()))?;
        Ok(XyzGeocentric { x, y, z })
    }
}

/// casacore's `Rot3D`: a rotation about `axis` (0 = x, 1 = y, 2 = z) by
/// `angle` \[radians\].
fn rot3d(axis: usize, angle: f64) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    let a1 = (axis + 1) % 3;
    let a2 = (axis + 2) % 3;
    let mut m = [[0.0; 3]; 3];
    m[axis][axis] = 1.0;
    m[a1][a1] = c;
    m[a2][a1] = s;
    m[a1][a2] = -s;
    m[a2][a2] = c;
    m
}

fn mat_vec(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Calculate geocentric positions for antennas.
///
/// The frame used for the rotation has its origin at the centre of the Earth,
/// X towards (0° lat, 0° lon), Y towards (0° lat, 90°E) and Z towards the
/// North pole. The output has one position per offset, in the same order. If
/// any antenna fails to convert, no positions are returned.
pub fn to_geocentric<C: GeodeticConverter + ?Sized>(
    offsets: &[AntennaOffset],
    reference: ArrayReference,
    converter: &C,
) -> Result<Vec<XyzGeocentric>, GeometryError> {
    debug!(
        "Converting {} antenna offsets around lon {}° lat {}° alt {} m",
        offsets.len(),
        reference.longitude_deg,
        reference.latitude_deg,
        reference.altitude_m
    );
    // Negative to rotate towards the North pole.
    let r_lat = rot3d(1, -reference.latitude_deg.to_radians());
    let r_lon = rot3d(2, reference.longitude_deg.to_radians());
    let sea_level = sea_level_radius(reference.latitude_deg);

    offsets
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            // Offsets are E, N, Up; we want XYZ as above.
            let local = [
                offset.up + sea_level + reference.altitude_m,
                offset.east,
                offset.north,
            ];
            let [x, y, z] = mat_vec(&r_lon, mat_vec(&r_lat, local));

            // The rotated vector includes the Earth's radius; WGS84 heights
            // are relative to sea level, so take it back out.
            let geodetic = LatLngHeight {
                longitude_rad: y.atan2(x),
                latitude_rad: z.atan2(x.hypot(y)),
                height_metres: (x * x + y * y + z * z).sqrt() - sea_level,
            };
            trace!("Antenna {i}: {geodetic:?}");
            converter
                .geodetic_to_geocentric(geodetic)
                .map_err(|e| GeometryError::Antenna {
                    index: i,
                    source: Box::new(e),
                })
        })
        .collect()
}

/// [`to_geocentric`] with the [`Wgs84`] converter.
pub fn to_geocentric_wgs84(
    offsets: &[AntennaOffset],
    reference: ArrayReference,
) -> Result<Vec<XyzGeocentric>, GeometryError> {
    to_geocentric(offsets, reference, &Wgs84)
}
