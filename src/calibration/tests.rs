use marlu::c32;
use ndarray::prelude::*;

use super::*;
use crate::calibration::flags::unpack_flags;

/// A calibration table held in memory.
struct MemCalTable {
    antenna1: Vec<i32>,
    gains: Vec<Array2<c32>>,
    flags: Vec<Array2<bool>>,
}

impl MemCalTable {
    fn new(antenna1: Vec<i32>) -> MemCalTable {
        let gains = antenna1
            .iter()
            .map(|&a| {
                Array2::from_shape_fn((4, 2), |(c, p)| c32::new(a as f32, (c * 2 + p) as f32))
            })
            .collect();
        let flags = antenna1
            .iter()
            .map(|&a| Array2::from_shape_fn((4, 2), |(c, p)| (a + (c + p) as i32) % 3 == 0))
            .collect();
        MemCalTable {
            antenna1,
            gains,
            flags,
        }
    }
}

impl CalRead for MemCalTable {
    fn num_rows(&mut self) -> Result<usize, CalTableError> {
        Ok(self.gains.len())
    }

    fn antenna1(&mut self) -> Result<Vec<i32>, CalTableError> {
        Ok(self.antenna1.clone())
    }

    fn gains(&mut self, row: usize) -> Result<Array2<c32>, CalTableError> {
        Ok(self.gains[row].clone())
    }

    fn flags(&mut self, row: usize) -> Result<Array2<bool>, CalTableError> {
        Ok(self.flags[row].clone())
    }
}

#[test]
fn test_load_simple_table() {
    let mut store = MemCalTable::new(vec![0, 1, 2]);
    let table = load_cal_table(&mut store, 3).unwrap();
    assert_eq!(table.num_antennas(), 3);
    assert_eq!(table.cell_shape(), (4, 2));

    for (entry, (gains, flags)) in table
        .entries()
        .zip(store.gains.iter().zip(store.flags.iter()))
    {
        assert_eq!(entry.gains, *gains);
        assert_eq!(entry.flags, *flags);
    }
    assert_eq!(table.entries().count(), 3);
    assert_eq!(table.entries().last().unwrap().antenna, 2);
}

#[test]
fn test_packed_flags_follow_antenna_order() {
    let mut store = MemCalTable::new(vec![0, 1, 2]);
    let table = load_cal_table(&mut store, 3).unwrap();
    let packed = table.packed_flags();
    assert_eq!(packed.len(), 3 * 4 * 2);
    assert_eq!(
        packed.iter().filter(|&&b| b == 1).count(),
        table.num_flagged()
    );

    // Antenna 1's flags are the second block of 8 bytes.
    let mut ant1 = Array2::from_elem((4, 2), false);
    unpack_flags(&packed[8..16], &mut ant1).unwrap();
    assert_eq!(ant1, store.flags[1]);

    let mut all = Array3::from_elem((3, 4, 2), false);
    unpack_flags(&packed, &mut all).unwrap();
    assert_eq!(all, table.flags);
}

#[test]
fn test_out_of_order_antennas_are_rejected() {
    let mut store = MemCalTable::new(vec![0, 2, 1]);
    assert!(matches!(
        load_cal_table(&mut store, 3),
        Err(CalTableError::AntennaIndex { row: 1, antenna: 2 })
    ));

    // Sparse.
    let mut store = MemCalTable::new(vec![0, 1, 3]);
    assert!(matches!(
        load_cal_table(&mut store, 3),
        Err(CalTableError::AntennaIndex { row: 2, antenna: 3 })
    ));

    let mut store = MemCalTable::new(vec![-1, 1]);
    assert!(matches!(
        load_cal_table(&mut store, 2),
        Err(CalTableError::AntennaIndex { row: 0, antenna: -1 })
    ));
}

#[test]
fn test_row_count_must_match() {
    let mut store = MemCalTable::new(vec![0, 1, 2]);
    assert!(matches!(
        load_cal_table(&mut store, 4),
        Err(CalTableError::RowCount {
            rows: 3,
            expected: 4
        })
    ));

    let mut store = MemCalTable::new(vec![]);
    assert!(matches!(
        load_cal_table(&mut store, 0),
        Err(CalTableError::Empty)
    ));

    let mut store = MemCalTable::new(vec![0, 1]);
    store.antenna1.push(2);
    assert!(matches!(
        load_cal_table(&mut store, 2),
        Err(CalTableError::AntennaColumnLength { rows: 2, len: 3 })
    ));
}

#[test]
fn test_heterogeneous_shapes_are_rejected() {
    let mut store = MemCalTable::new(vec![0, 1, 2]);
    store.gains[2] = Array2::zeros((3, 2));
    match load_cal_table(&mut store, 3) {
        Err(CalTableError::CellShape {
            column,
            row,
            expected,
            got,
        }) => {
            assert_eq!(column, "gains");
            assert_eq!(row, 2);
            assert_eq!(expected, [4, 2]);
            assert_eq!(got, [3, 2]);
        }
        r => panic!("expected a shape error, got {r:?}"),
    }

    let mut store = MemCalTable::new(vec![0, 1, 2]);
    store.flags[0] = Array2::from_elem((2, 4), false);
    assert!(matches!(
        load_cal_table(&mut store, 3),
        Err(CalTableError::CellShape {
            column: "flags",
            row: 0,
            ..
        })
    ));
}
