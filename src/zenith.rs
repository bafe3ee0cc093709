//! The direction of the local zenith.
//!
//! The zenith is trivially (az 0°, el 90°) in the horizon frame; getting it
//! into J2000 needs the LMST, precession and nutation at the epoch, which are
//! left to a [`CelestialConverter`].

use std::f64::consts::FRAC_PI_2;
use std::fmt::Display;

use hifitime::{Duration, Epoch};
use log::debug;
use marlu::{
    precession::{get_lmst, precess_time},
    AzEl, LatLngHeight, RADec,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZenithError {
    #[error("Could not convert the horizon direction (az {az_deg}°, el {el_deg}°) to J2000: {reason}")]
    Conversion {
        az_deg: f64,
        el_deg: f64,
        reason: &'static str,
    },
}

/// The reference frames a [`Direction`] can be expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionFrame {
    /// Azimuth and elevation, local to an observer at an instant.
    AzEl,
    J2000,
}

/// A sky direction, always tagged with its frame. For [`DirectionFrame::AzEl`]
/// the coordinates are (az, el), for [`DirectionFrame::J2000`] they are (RA,
/// Dec). All angles are in \[radians\].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction {
    pub longitude_rad: f64,
    pub latitude_rad: f64,
    pub frame: DirectionFrame,
}

impl Direction {
    /// The zenith in the horizon frame. This is what gets written when no
    /// epoch-specific direction is available.
    pub fn zenith_azel() -> Direction {
        Direction {
            longitude_rad: 0.0,
            latitude_rad: FRAC_PI_2,
            frame: DirectionFrame::AzEl,
        }
    }

    pub fn j2000(radec: RADec) -> Direction {
        Direction {
            longitude_rad: radec.ra,
            latitude_rad: radec.dec,
            frame: DirectionFrame::J2000,
        }
    }

    /// Get this direction as a [`RADec`], if it's in J2000.
    pub fn to_radec(self) -> Option<RADec> {
        match self.frame {
            DirectionFrame::J2000 => Some(RADec {
                ra: self.longitude_rad,
                dec: self.latitude_rad,
            }),
            DirectionFrame::AzEl => None,
        }
    }

    /// The coordinates as a two-element vector, the way casacore stores
    /// direction cells.
    pub fn to_vec(self) -> [f64; 2] {
        [self.longitude_rad, self.latitude_rad]
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}°, {:.6}°) {:?}",
            self.longitude_rad.to_degrees(),
            self.latitude_rad.to_degrees(),
            self.frame
        )
    }
}

/// Something that can express a horizon-frame direction, seen from
/// `location` at `epoch`, in J2000.
pub trait CelestialConverter {
    fn horizon_to_j2000(
        &self,
        azel: AzEl,
        epoch: Epoch,
        location: LatLngHeight,
    ) -> Result<RADec, ZenithError>;
}

/// Convert with `marlu`: horizon -> hour angle -> apparent RA at the LMST ->
/// precessed (with nutation and aberration) to J2000.
#[derive(Clone, Copy, Debug)]
pub struct Precession {
    /// UT1 - UTC. Zero makes LSTs wrong by up to 0.9 seconds.
    pub dut1: Duration,
}

impl Default for Precession {
    fn default() -> Self {
        Precession {
            dut1: Duration::from_seconds(0.0),
        }
    }
}

impl CelestialConverter for Precession {
    fn horizon_to_j2000(
        &self,
        azel: AzEl,
        epoch: Epoch,
        location: LatLngHeight,
    ) -> Result<RADec, ZenithError> {
        let err = |reason| ZenithError::Conversion {
            az_deg: azel.az.to_degrees(),
            el_deg: azel.el.to_degrees(),
            reason,
        };
        if !(location.longitude_rad.is_finite() && location.latitude_rad.is_finite()) {
            return Err(err("the location is not finite"));
        }
        if location.latitude_rad.abs() > FRAC_PI_2 {
            return Err(err("the location's latitude is outside [-90°, 90°]"));
        }

        // Work out the apparent RA/Dec first; the precession needs something
        // to precess.
        let lmst = get_lmst(location.longitude_rad, epoch, self.dut1);
        let radec_now = azel.to_hadec(location.latitude_rad).to_radec(lmst);
        let info = precess_time(
            location.longitude_rad,
            location.latitude_rad,
            radec_now,
            epoch,
            self.dut1,
        );
        let radec = info.hadec_j2000.to_radec(info.lmst_j2000);
        debug!(
            "LMST {}°, J2000 LMST {}°, J2000 latitude {}°",
            info.lmst.to_degrees(),
            info.lmst_j2000.to_degrees(),
            info.array_latitude_j2000.to_degrees()
        );

        if !(radec.ra.is_finite() && radec.dec.is_finite()) {
            return Err(err("the precessed direction is not finite"));
        }
        Ok(radec)
    }
}

/// Get the J2000 direction of the zenith above `location` at `epoch`.
pub fn zenith<C: CelestialConverter + ?Sized>(
    location: LatLngHeight,
    epoch: Epoch,
    converter: &C,
) -> Result<Direction, ZenithError> {
    let up = AzEl {
        az: 0.0,
        el: FRAC_PI_2,
    };
    let radec = converter.horizon_to_j2000(up, epoch, location)?;
    let dir = Direction::j2000(radec);
    debug!("Zenith at {epoch}: {dir}");
    Ok(dir)
}
