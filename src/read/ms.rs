//! Read casacore calibration tables (e.g. those written by CASA's `bandpass`
//! and `gaincal` tasks).

use std::path::{Path, PathBuf};

use log::{debug, trace};
use marlu::{c32, rubbl_casatables};
use ndarray::Array2;
use rubbl_casatables::{Table, TableOpenMode};

use super::CalRead;
use crate::calibration::CalTableError;

/// Column of complex gains.
pub const GAIN_COL: &str = "CPARAM";
pub const FLAG_COL: &str = "FLAG";
pub const ANTENNA_COL: &str = "ANTENNA1";

pub struct MsCalTable {
    /// The path to the calibration table on disk.
    pub path: PathBuf,

    table: Table,
}

impl MsCalTable {
    /// Open a calibration table read only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<MsCalTable, CalTableError> {
        let path = path.as_ref();
        debug!("Using calibration table: {}", path.display());
        if !path.exists() {
            return Err(CalTableError::BadFile(path.to_path_buf()));
        }
        let table = Table::open(path, TableOpenMode::Read)?;
        Ok(MsCalTable {
            path: path.to_path_buf(),
            table,
        })
    }
}

impl CalRead for MsCalTable {
    fn num_rows(&mut self) -> Result<usize, CalTableError> {
        Ok(self.table.n_rows() as usize)
    }

    fn antenna1(&mut self) -> Result<Vec<i32>, CalTableError> {
        let antenna1: Vec<i32> = self.table.get_col_as_vec(ANTENNA_COL)?;
        trace!("There are {} {ANTENNA_COL} values", antenna1.len());
        Ok(antenna1)
    }

    fn gains(&mut self, row: usize) -> Result<Array2<c32>, CalTableError> {
        let gains: Array2<c32> = self.table.get_cell(GAIN_COL, row as u64)?;
        Ok(gains)
    }

    fn flags(&mut self, row: usize) -> Result<Array2<bool>, CalTableError> {
        let flags: Array2<bool> = self.table.get_cell(FLAG_COL, row as u64)?;
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use marlu::rubbl_casatables::{GlueDataType, TableCreateMode, TableDesc, TableDescCreateMode};

    use super::*;
    use crate::calibration::{load_cal_table, CalTableError};

    fn gains(ant: usize) -> Array2<c32> {
        Array2::from_shape_fn((4, 2), |(c, p)| {
            c32::new(ant as f32 + 0.25, (c * 2 + p) as f32)
        })
    }

    fn flags(ant: usize) -> Array2<bool> {
        Array2::from_shape_fn((4, 2), |(c, p)| (ant + c * 2 + p) % 3 == 0)
    }

    /// Write a calibration table with one row per entry of `antenna1`.
    fn write_cal_table(path: &Path, antenna1: &[i32]) {
        let mut desc = TableDesc::new("", TableDescCreateMode::TDM_SCRATCH).unwrap();
        desc.add_scalar_column(GlueDataType::TpInt, ANTENNA_COL, None, false, false)
            .unwrap();
        desc.add_array_column(GlueDataType::TpComplex, GAIN_COL, None, None, false, false)
            .unwrap();
        desc.add_array_column(GlueDataType::TpBool, FLAG_COL, None, None, false, false)
            .unwrap();
        let mut table = Table::new(path, desc, antenna1.len(), TableCreateMode::New).unwrap();
        for (row, &ant) in antenna1.iter().enumerate() {
            table.put_cell(ANTENNA_COL, row as u64, &ant).unwrap();
            table.put_cell(GAIN_COL, row as u64, &gains(row)).unwrap();
            table.put_cell(FLAG_COL, row as u64, &flags(row)).unwrap();
        }
    }

    #[test]
    fn test_read_simple_cal_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simple.bcal");
        write_cal_table(&path, &[0, 1, 2]);

        let mut store = MsCalTable::open(&path).unwrap();
        assert_eq!(store.num_rows().unwrap(), 3);
        assert_eq!(store.antenna1().unwrap(), [0, 1, 2]);
        let table = load_cal_table(&mut store, 3).unwrap();
        assert_eq!(table.cell_shape(), (4, 2));
        for entry in table.entries() {
            assert_eq!(entry.gains, gains(entry.antenna));
            assert_eq!(entry.flags, flags(entry.antenna));
        }

        // Flags are packed antenna-major, then channel, then polarisation.
        let packed = table.packed_flags();
        let expected: Vec<u8> = (0..3)
            .flat_map(|a| flags(a).iter().map(|&f| u8::from(f)).collect::<Vec<_>>())
            .collect();
        assert_eq!(packed, expected);
    }

    #[test]
    fn test_read_out_of_order_cal_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shuffled.bcal");
        write_cal_table(&path, &[0, 2, 1]);

        let mut store = MsCalTable::open(&path).unwrap();
        assert!(matches!(
            load_cal_table(&mut store, 3),
            Err(CalTableError::AntennaIndex { row: 1, antenna: 2 })
        ));
    }

    #[test]
    fn test_missing_cal_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MsCalTable::open(dir.path().join("nothing.bcal")),
            Err(CalTableError::BadFile(_))
        ));
    }
}
