//! Convert boolean flag arrays to and from one byte per flag.
//!
//! Both directions walk the array in logical (row-major) order, regardless of
//! its memory layout, and both require the byte buffer to be exactly as long
//! as the array. Nothing is written if the lengths differ.

use ndarray::{ArrayBase, Data, DataMut, Dimension};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Flag array has {array_len} elements, but the byte buffer has {buffer_len}")]
pub struct FlagPackError {
    pub array_len: usize,
    pub buffer_len: usize,
}

/// Write `flags` into `bytes` as 1 (flagged) or 0 (unflagged).
pub fn pack_flags<S, D>(flags: &ArrayBase<S, D>, bytes: &mut [u8]) -> Result<(), FlagPackError>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    if flags.len() != bytes.len() {
        return Err(FlagPackError {
            array_len: flags.len(),
            buffer_len: bytes.len(),
        });
    }
    flags
        .iter()
        .zip(bytes.iter_mut())
        .for_each(|(&f, b)| *b = u8::from(f));
    Ok(())
}

/// Write `bytes` into `flags`; any non-zero byte is flagged.
pub fn unpack_flags<S, D>(bytes: &[u8], flags: &mut ArrayBase<S, D>) -> Result<(), FlagPackError>
where
    S: DataMut<Elem = bool>,
    D: Dimension,
{
    if flags.len() != bytes.len() {
        return Err(FlagPackError {
            array_len: flags.len(),
            buffer_len: bytes.len(),
        });
    }
    flags
        .iter_mut()
        .zip(bytes.iter())
        .for_each(|(f, &b)| *f = b != 0);
    Ok(())
}

/// Pack `flags` into a new, correctly-sized buffer.
pub fn flags_to_bytes<S, D>(flags: &ArrayBase<S, D>) -> Vec<u8>
where
    S: Data<Elem = bool>,
    D: Dimension,
{
    flags.iter().map(|&f| u8::from(f)).collect()
}

#[cfg(test)]
mod tests {
    use ndarray::prelude::*;

    use super::*;

    fn some_flags() -> Array3<bool> {
        Array3::from_shape_fn((3, 4, 2), |(i, j, k)| (i + 2 * j + k) % 3 == 0)
    }

    #[test]
    fn test_pack_then_unpack() {
        let flags = some_flags();
        let mut bytes = vec![0xff; flags.len()];
        pack_flags(&flags, &mut bytes).unwrap();
        assert!(bytes.iter().all(|&b| b == 0 || b == 1));
        assert_eq!(bytes, flags_to_bytes(&flags));

        let mut unpacked = Array3::from_elem(flags.dim(), false);
        unpack_flags(&bytes, &mut unpacked).unwrap();
        assert_eq!(unpacked, flags);

        let empty = Array2::<bool>::from_elem((0, 4), true);
        let mut bytes = vec![];
        pack_flags(&empty, &mut bytes).unwrap();
        let mut unpacked = Array2::from_elem((0, 4), false);
        unpack_flags(&bytes, &mut unpacked).unwrap();
    }

    #[test]
    fn test_logical_order_is_used() {
        let flags = array![[true, false, false], [true, true, false]];
        assert_eq!(flags_to_bytes(&flags), [1, 0, 0, 1, 1, 0]);
        // A transposed view is walked in its own logical order, not memory
        // order.
        assert_eq!(flags_to_bytes(&flags.t()), [1, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn test_any_nonzero_byte_is_flagged() {
        let mut flags = Array1::from_elem(4, false);
        unpack_flags(&[0, 1, 2, 255], &mut flags).unwrap();
        assert_eq!(flags, array![false, true, true, true]);
    }

    #[test]
    fn test_size_mismatches_fail_without_writing() {
        let flags = some_flags();
        for len in [0, 1, flags.len() - 1, flags.len() + 1, 100] {
            let mut bytes = vec![7; len];
            assert_eq!(
                pack_flags(&flags, &mut bytes),
                Err(FlagPackError {
                    array_len: flags.len(),
                    buffer_len: len
                })
            );
            assert!(bytes.iter().all(|&b| b == 7));

            let mut out = Array3::from_elem(flags.dim(), true);
            assert!(unpack_flags(&bytes, &mut out).is_err());
            assert!(out.iter().all(|&f| f));
        }
    }
}
