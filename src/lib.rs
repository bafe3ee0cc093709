//! Geometry, timing and calibration plumbing for building LEDA measurement
//! sets.
//!
//! Antenna positions are supplied as East-North-Up offsets from a reference
//! point on the WGS84 ellipsoid, converted to geocentric coordinates and
//! paired up into baselines (auto-correlations included). The correlator's
//! phase centre is the zenith, which is found in J2000 for the observation
//! epoch. Calibration tables are read per antenna, validated and have their
//! flags packed into bytes for the correlator.

pub mod baselines;
pub mod calibration;
pub mod constants;
pub mod epoch;
pub mod geodetic;
pub mod geometry;
pub mod read;
pub mod write;
pub mod zenith;

pub use baselines::{enumerate_baselines, num_baselines, Baseline, BaselineError};
pub use calibration::{flags::FlagPackError, load_cal_table, CalTable, CalTableError};
pub use epoch::{parse_epoch, EpochParseError};
pub use geodetic::sea_level_radius;
pub use geometry::{
    to_geocentric, to_geocentric_wgs84, AntennaOffset, ArrayReference, GeometryError,
};
pub use read::{antennas::AntennaReadError, binary::BinaryCalError};
pub use write::{ArrayMetadata, RecordError};
pub use zenith::{zenith, Direction, DirectionFrame, Precession, ZenithError};

use thiserror::Error;

/// Any error this crate can produce.
#[derive(Error, Debug)]
pub enum LedaError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Baseline(#[from] BaselineError),

    #[error(transparent)]
    Epoch(#[from] EpochParseError),

    #[error(transparent)]
    Zenith(#[from] ZenithError),

    #[error(transparent)]
    FlagPack(#[from] FlagPackError),

    #[error(transparent)]
    CalTable(#[from] CalTableError),

    #[error(transparent)]
    AntennaRead(#[from] AntennaReadError),

    #[error(transparent)]
    BinaryCal(#[from] BinaryCalError),

    #[error(transparent)]
    Record(#[from] RecordError),
}
