//! Errors associated with reading calibration tables.

use std::path::PathBuf;

use marlu::rubbl_casatables;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalTableError {
    #[error("Supplied file path {0} does not exist or is not readable!")]
    BadFile(PathBuf),

    #[error("The calibration table contains no rows!")]
    Empty,

    #[error("The calibration table has {rows} rows, but there are {expected} antennas; expected one row per antenna")]
    RowCount { rows: usize, expected: usize },

    #[error("The calibration table has {rows} rows, but its ANTENNA1 column has {len} values")]
    AntennaColumnLength { rows: usize, len: usize },

    #[error("Row {row} of the calibration table is for antenna {antenna}; expected one row per antenna, in antenna order")]
    AntennaIndex { row: usize, antenna: i32 },

    #[error("Calibration table {column} in row {row} has shape {got:?}, but row 0 has shape {expected:?}")]
    CellShape {
        column: &'static str,
        row: usize,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Error when trying to interface with calibration table: {0}")]
    Table(#[from] rubbl_casatables::TableError),

    #[error("Error from casacore: {0}")]
    Casacore(#[from] rubbl_casatables::CasacoreError),
}
