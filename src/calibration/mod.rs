//! Ingest per-antenna complex gains and their flags.
//!
//! A calibration table is only accepted if it has exactly one row per
//! antenna, in antenna order, and every row's gains and flags have the same
//! shape. Anything else is treated as a caller error and nothing is returned.

mod error;
pub mod flags;
#[cfg(test)]
mod tests;

pub use error::CalTableError;

use log::{debug, trace};
use marlu::c32;
use ndarray::prelude::*;

use crate::read::CalRead;
use flags::flags_to_bytes;

/// One antenna's calibration: its gains and a flag for each gain (`true`
/// means the gain shouldn't be used).
#[derive(Debug, Clone, Copy)]
pub struct CalibrationEntry<'a> {
    pub antenna: usize,
    pub gains: ArrayView2<'a, c32>,
    pub flags: ArrayView2<'a, bool>,
}

/// A validated calibration table. The first axis of both arrays is the
/// antenna index; the remaining two are the per-row cell shape.
#[derive(Debug, Clone)]
pub struct CalTable {
    pub gains: Array3<c32>,
    pub flags: Array3<bool>,
}

impl CalTable {
    pub fn num_antennas(&self) -> usize {
        self.gains.len_of(Axis(0))
    }

    /// The shape of each antenna's gains and flags.
    pub fn cell_shape(&self) -> (usize, usize) {
        let (_, a, b) = self.gains.dim();
        (a, b)
    }

    pub fn entries(&self) -> impl Iterator<Item = CalibrationEntry<'_>> {
        self.gains
            .outer_iter()
            .zip(self.flags.outer_iter())
            .enumerate()
            .map(|(antenna, (gains, flags))| CalibrationEntry {
                antenna,
                gains,
                flags,
            })
    }

    /// All flags, one byte each, in antenna-major order.
    pub fn packed_flags(&self) -> Vec<u8> {
        flags_to_bytes(&self.flags)
    }

    pub fn num_flagged(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Read and validate a calibration table from `store`, which must contain
/// one row per antenna (`expected_num_antennas` rows), row `i` being for
/// antenna `i`. The cell shape is taken from row 0 and enforced on all other
/// rows.
pub fn load_cal_table<R: CalRead + ?Sized>(
    store: &mut R,
    expected_num_antennas: usize,
) -> Result<CalTable, CalTableError> {
    let num_rows = store.num_rows()?;
    debug!("Calibration table has {num_rows} rows");
    if num_rows == 0 {
        return Err(CalTableError::Empty);
    }
    if num_rows != expected_num_antennas {
        return Err(CalTableError::RowCount {
            rows: num_rows,
            expected: expected_num_antennas,
        });
    }

    // Check for a "simple" table, one row per antenna.
    let antenna1 = store.antenna1()?;
    if antenna1.len() != num_rows {
        return Err(CalTableError::AntennaColumnLength {
            rows: num_rows,
            len: antenna1.len(),
        });
    }
    if let Some((row, &antenna)) = antenna1
        .iter()
        .enumerate()
        .find(|(row, antenna)| usize::try_from(**antenna).ok() != Some(*row))
    {
        return Err(CalTableError::AntennaIndex { row, antenna });
    }

    let first_gains = store.gains(0)?;
    let cell_dim = first_gains.dim();
    trace!("Calibration cell shape: {cell_dim:?}");
    let mut gains = Array3::zeros((num_rows, cell_dim.0, cell_dim.1));
    let mut flags = Array3::from_elem(gains.dim(), false);
    gains.index_axis_mut(Axis(0), 0).assign(&first_gains);

    for row in 0..num_rows {
        if row > 0 {
            let row_gains = store.gains(row)?;
            check_shape("gains", row, cell_dim, row_gains.dim())?;
            gains.index_axis_mut(Axis(0), row).assign(&row_gains);
        }
        let row_flags = store.flags(row)?;
        check_shape("flags", row, cell_dim, row_flags.dim())?;
        flags.index_axis_mut(Axis(0), row).assign(&row_flags);
    }

    let table = CalTable { gains, flags };
    debug!(
        "Read calibration for {} antennas, {} of {} gains flagged",
        table.num_antennas(),
        table.num_flagged(),
        table.flags.len()
    );
    Ok(table)
}

fn check_shape(
    column: &'static str,
    row: usize,
    expected: (usize, usize),
    got: (usize, usize),
) -> Result<(), CalTableError> {
    if expected != got {
        return Err(CalTableError::CellShape {
            column,
            row,
            expected: vec![expected.0, expected.1],
            got: vec![got.0, got.1],
        });
    }
    Ok(())
}
