//! Baselines of a zenith-pointed, non-tracking array.
//!
//! Baselines are ordered with the first antenna index outermost, and every
//! antenna is paired with itself, so antenna pair (i, j) with i <= j always
//! has the same baseline index for a given number of antennas. Writers of
//! per-baseline rows rely on this ordering.

use marlu::XyzGeocentric;
use thiserror::Error;

/// The (x,y,z) coordinates of a baseline. All units are in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct XyzBaseline {
    /// x-coordinate \[metres\]
    pub x: f64,
    /// y-coordinate \[metres\]
    pub y: f64,
    /// z-coordinate \[metres\]
    pub z: f64,
}

/// A pair of antennas and the vector between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub ant1: usize,
    pub ant2: usize,
    /// `position[ant1] - position[ant2]`.
    pub xyz: XyzBaseline,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaselineError {
    #[error("There are no antennas, so there are no baselines")]
    NoAntennas,

    #[error("Antenna index {index} is out of range for {num_antennas} antennas")]
    AntennaOutOfRange { index: usize, num_antennas: usize },

    #[error("Antenna pair ({ant1}, {ant2}) is not ordered; the first index must not exceed the second")]
    Unordered { ant1: usize, ant2: usize },

    #[error("Baseline index {index} is out of range for {num_baselines} baselines")]
    BaselineOutOfRange { index: usize, num_baselines: usize },
}

/// The number of baselines (auto-correlations included) for `num_antennas`.
pub fn num_baselines(num_antennas: usize) -> usize {
    num_antennas * (num_antennas + 1) / 2
}

/// For each pair of positions (including each position with itself),
/// calculate a baseline. This is a single snapshot; Earth rotation is
/// ignored.
pub fn enumerate_baselines(positions: &[XyzGeocentric]) -> Vec<Baseline> {
    let n = positions.len();
    let mut baselines = Vec::with_capacity(num_baselines(n));
    for (i, p1) in positions.iter().enumerate() {
        for (j, p2) in positions.iter().enumerate().skip(i) {
            baselines.push(Baseline {
                ant1: i,
                ant2: j,
                xyz: XyzBaseline {
                    x: p1.x - p2.x,
                    y: p1.y - p2.y,
                    z: p1.z - p2.z,
                },
            });
        }
    }
    baselines
}

/// Get the baseline index of antennas `ant1` and `ant2`.
pub fn baseline_index(
    ant1: usize,
    ant2: usize,
    num_antennas: usize,
) -> Result<usize, BaselineError> {
    if num_antennas == 0 {
        return Err(BaselineError::NoAntennas);
    }
    for index in [ant1, ant2] {
        if index >= num_antennas {
            return Err(BaselineError::AntennaOutOfRange {
                index,
                num_antennas,
            });
        }
    }
    if ant1 > ant2 {
        return Err(BaselineError::Unordered { ant1, ant2 });
    }
    // Each earlier first antenna `a` contributes `num_antennas - a` baselines.
    Ok(ant1 * (2 * num_antennas - ant1 + 1) / 2 + ant2 - ant1)
}

/// Get the antenna pair of baseline `index`. The inverse of
/// [`baseline_index`].
pub fn baseline_pair(index: usize, num_antennas: usize) -> Result<(usize, usize), BaselineError> {
    if num_antennas == 0 {
        return Err(BaselineError::NoAntennas);
    }
    let total = num_baselines(num_antennas);
    if index >= total {
        return Err(BaselineError::BaselineOutOfRange {
            index,
            num_baselines: total,
        });
    }
    let mut row_start = 0;
    for ant1 in 0..num_antennas {
        let row_len = num_antennas - ant1;
        if index < row_start + row_len {
            return Ok((ant1, ant1 + index - row_start));
        }
        row_start += row_len;
    }
    unreachable!("index was checked against the number of baselines")
}
