//! Sub-table rows describing the array, its feeds, the zenith field and the
//! correlator setup.
//!
//! Nothing here touches disk; the rows are plain values for whatever writes
//! the measurement set to consume. Times are MJD UTC \[seconds\] as casacore
//! stores them.

use hifitime::Epoch;
use itertools::Itertools;
use log::debug;
use marlu::{c32, XyzGeocentric};
use thiserror::Error;
use vec1::Vec1;

use crate::constants::*;
use crate::zenith::Direction;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("A spectral window needs at least one channel")]
    NoChannels,

    #[error("The observation finishes ({finish}) before it starts ({start})")]
    TimeRange { start: f64, finish: f64 },
}

/// Names and fixed properties written into the sub-tables.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayMetadata {
    /// Antennas are named this followed by a 1-based, 3-digit number.
    pub antenna_name_prefix: String,
    pub station_name: String,
    pub correlator_name: String,
    pub observer: String,
    pub project: String,
    pub telescope_name: String,
    pub antenna_type: String,
    pub antenna_mount: String,
    /// \[metres\]
    pub dish_diameter: f64,
    /// \[seconds\]
    pub integration_time: f64,
}

impl Default for ArrayMetadata {
    fn default() -> Self {
        ArrayMetadata {
            antenna_name_prefix: ANTENNA_NAME_PREFIX.to_string(),
            station_name: STATION_NAME.to_string(),
            correlator_name: CORRELATOR_NAME.to_string(),
            observer: OBSERVER.to_string(),
            project: PROJECT.to_string(),
            telescope_name: TELESCOPE_NAME.to_string(),
            antenna_type: ANTENNA_TYPE.to_string(),
            antenna_mount: ANTENNA_MOUNT.to_string(),
            dish_diameter: ANTENNA_DISH_DIAMETER,
            integration_time: DEFAULT_INT_TIME,
        }
    }
}

impl ArrayMetadata {
    /// The name of the antenna with 0-based index `antenna`, e.g. "ANT001".
    pub fn antenna_name(&self, antenna: usize) -> String {
        format!("{}{:03}", self.antenna_name_prefix, antenna + 1)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AntennaRow {
    pub name: String,
    pub station: String,
    pub antenna_type: String,
    pub mount: String,
    /// Geocentric position \[metres\].
    pub position: XyzGeocentric,
    pub offset: [f64; 3],
    pub dish_diameter: f64,
}

pub fn antenna_rows(positions: &[XyzGeocentric], metadata: &ArrayMetadata) -> Vec<AntennaRow> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &position)| AntennaRow {
            name: metadata.antenna_name(i),
            station: metadata.station_name.clone(),
            antenna_type: metadata.antenna_type.clone(),
            mount: metadata.antenna_mount.clone(),
            position,
            offset: [0.0; 3],
            dish_diameter: metadata.dish_diameter,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeedRow {
    pub antenna_id: i32,
    pub feed_id: i32,
    /// -1 means "all".
    pub spectral_window_id: i32,
    pub beam_id: i32,
    pub time: f64,
    pub interval: f64,
    pub num_receptors: i32,
    pub polarization_type: [&'static str; 2],
    pub pol_response: [[c32; 2]; 2],
    pub receptor_angle: [f64; 2],
    pub beam_offset: [[f64; 2]; 2],
    pub position: [f64; 3],
}

/// One feed per antenna with two linear (X, Y) receptors.
pub fn feed_rows(num_antennas: usize) -> Vec<FeedRow> {
    let one = c32::new(1.0, 0.0);
    let zero = c32::new(0.0, 0.0);
    (0..num_antennas)
        .map(|i| FeedRow {
            antenna_id: i as i32,
            feed_id: 0,
            spectral_window_id: -1,
            beam_id: -1,
            time: 0.0,
            interval: FOREVER_INTERVAL,
            num_receptors: 2,
            polarization_type: ["X", "Y"],
            pol_response: [[one, zero], [zero, one]],
            receptor_angle: [0.0; 2],
            beam_offset: [[0.0; 2]; 2],
            position: [0.0; 3],
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldRow {
    pub name: String,
    pub delay_dir: Direction,
    pub phase_dir: Direction,
    pub reference_dir: Direction,
    pub source_id: i32,
}

/// The single zenith field. Without a direction, the zenith is given in the
/// horizon frame.
pub fn field_row(direction: Option<Direction>) -> FieldRow {
    let dir = direction.unwrap_or_else(Direction::zenith_azel);
    FieldRow {
        name: FIELD_NAME.to_string(),
        delay_dir: dir,
        phase_dir: dir,
        reference_dir: dir,
        source_id: 0,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointingRow {
    pub antenna_id: i32,
    pub time: f64,
    pub time_origin: f64,
    pub interval: f64,
    pub num_poly: i32,
    pub direction: Direction,
    pub target: Direction,
    pub tracking: bool,
}

/// Every antenna points at the zenith from `time` onwards.
pub fn pointing_rows(
    num_antennas: usize,
    time: Epoch,
    direction: Option<Direction>,
) -> Vec<PointingRow> {
    let dir = direction.unwrap_or_else(Direction::zenith_azel);
    let time_origin = time.to_mjd_utc_seconds();
    (0..num_antennas)
        .map(|i| PointingRow {
            antenna_id: i as i32,
            time: 0.0,
            time_origin,
            interval: FOREVER_INTERVAL,
            num_poly: 0,
            direction: dir,
            target: dir,
            tracking: false,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceRow {
    pub source_id: i32,
    pub name: String,
    /// Midpoint of the observation.
    pub time: f64,
    pub interval: f64,
    pub spectral_window_id: i32,
    pub num_lines: i32,
    pub calibration_group: i32,
    pub code: String,
    pub direction: Direction,
    pub proper_motion: [f64; 2],
}

pub fn source_row(
    start: Epoch,
    finish: Epoch,
    direction: Option<Direction>,
) -> Result<SourceRow, RecordError> {
    let (start, finish) = time_range(start, finish)?;
    Ok(SourceRow {
        source_id: 0,
        name: FIELD_NAME.to_string(),
        time: (start + finish) / 2.0,
        interval: finish - start,
        spectral_window_id: -1,
        num_lines: 0,
        calibration_group: 0,
        code: String::new(),
        direction: direction.unwrap_or_else(Direction::zenith_azel),
        proper_motion: [0.0; 2],
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObservationRow {
    /// \[start, finish\]
    pub time_range: [f64; 2],
    pub observer: String,
    pub project: String,
    pub telescope_name: String,
}

pub fn observation_row(
    start: Epoch,
    finish: Epoch,
    metadata: &ArrayMetadata,
) -> Result<ObservationRow, RecordError> {
    let (start, finish) = time_range(start, finish)?;
    Ok(ObservationRow {
        time_range: [start, finish],
        observer: metadata.observer.clone(),
        project: metadata.project.clone(),
        telescope_name: metadata.telescope_name.clone(),
    })
}

fn time_range(start: Epoch, finish: Epoch) -> Result<(f64, f64), RecordError> {
    let start = start.to_mjd_utc_seconds();
    let finish = finish.to_mjd_utc_seconds();
    if finish < start {
        return Err(RecordError::TimeRange { start, finish });
    }
    Ok((start, finish))
}

/// Linear correlation types, with their casacore Stokes codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorrType {
    XX = 9,
    XY = 10,
    YX = 11,
    YY = 12,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolarizationRow {
    pub corr_type: [CorrType; 4],
    /// The receptor pair of each correlation.
    pub corr_product: [[i32; 2]; 4],
}

impl PolarizationRow {
    pub fn num_corr(&self) -> usize {
        self.corr_type.len()
    }
}

pub fn polarization_row() -> PolarizationRow {
    let corr_type = [CorrType::XX, CorrType::XY, CorrType::YX, CorrType::YY];
    let mut corr_product = [[0; 2]; 4];
    for (product, (r1, r2)) in corr_product
        .iter_mut()
        .zip((0..2).cartesian_product(0..2))
    {
        *product = [r1, r2];
    }
    PolarizationRow {
        corr_type,
        corr_product,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessorRow {
    pub processor_type: String,
    pub sub_type: String,
}

pub fn processor_row(metadata: &ArrayMetadata) -> ProcessorRow {
    ProcessorRow {
        processor_type: "CORRELATOR".to_string(),
        sub_type: metadata.correlator_name.clone(),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpectralWindowRow {
    /// The centre frequency, formatted.
    pub name: String,
    /// The lower edge of the band \[Hz\].
    pub ref_frequency: f64,
    /// Channel centres \[Hz\].
    pub chan_freqs: Vec1<f64>,
    /// Width of every channel \[Hz\]. Also used for the effective bandwidth
    /// and resolution.
    pub chan_width: f64,
    pub total_bandwidth: f64,
    /// 1 is TOPO.
    pub meas_freq_ref: i32,
    pub net_sideband: i32,
    pub freq_group_name: String,
}

impl SpectralWindowRow {
    pub fn num_chans(&self) -> usize {
        self.chan_freqs.len()
    }
}

/// A band of `num_chans` equal channels `bandwidth` wide, centred on
/// `centre_freq` (both \[Hz\]).
pub fn spectral_window_row(
    num_chans: usize,
    centre_freq: f64,
    bandwidth: f64,
) -> Result<SpectralWindowRow, RecordError> {
    let ref_frequency = centre_freq - bandwidth / 2.0;
    let chan_width = bandwidth / num_chans as f64;
    let chan_freqs = Vec1::try_from_vec(
        (0..num_chans)
            .map(|i| ref_frequency + (i as f64 + 0.5) * chan_width)
            .collect(),
    )
    .map_err(|_| RecordError::NoChannels)?;
    debug!(
        "Spectral window: {num_chans} channels of {chan_width} Hz from {ref_frequency} Hz"
    );

    Ok(SpectralWindowRow {
        name: centre_freq.to_string(),
        ref_frequency,
        chan_freqs,
        chan_width,
        total_bandwidth: bandwidth,
        meas_freq_ref: 1,
        net_sideband: 1,
        freq_group_name: "Group 1".to_string(),
    })
}
