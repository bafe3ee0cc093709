//! Readers for the inputs: antenna offset lists and calibration tables.

pub mod antennas;
pub mod binary;
pub mod ms;

use marlu::c32;
use ndarray::Array2;

use crate::calibration::CalTableError;

/// Access to a per-antenna calibration table. Implementors are handles to an
/// already-opened store; the caller owns the store and is responsible for
/// serialising access to it.
pub trait CalRead {
    fn num_rows(&mut self) -> Result<usize, CalTableError>;

    /// The antenna index stored with each row.
    fn antenna1(&mut self) -> Result<Vec<i32>, CalTableError>;

    /// The complex gains of `row`.
    fn gains(&mut self, row: usize) -> Result<Array2<c32>, CalTableError>;

    /// The flags of `row`; `true` is flagged.
    fn flags(&mut self, row: usize) -> Result<Array2<bool>, CalTableError>;
}
