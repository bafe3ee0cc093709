//! Read and write the flat binary calibration tables handed to the LEDA
//! correlator.
//!
//! Both kinds start with a one-byte type tag and two little-endian `i32`s (the
//! number of antennas and channels), followed by one byte per flag and then
//! the gains as little-endian `f32` (real, imaginary) pairs.
//!
//! * 'B' (bandpass): flags and gains are `[antenna][channel][pol]`, 2 pols.
//! * 'J' (full Jones): flags are `[antenna][channel]`, gains are 2x2 Jones
//!   matrices per `[antenna][channel]`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use marlu::{c32, Jones};
use ndarray::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinaryCalError {
    #[error("{file} is not a {expected} calibration table (type '{expected_tag}'); got type '{got}'")]
    WrongType {
        file: PathBuf,
        expected: &'static str,
        expected_tag: char,
        got: char,
    },

    #[error("{file} has a negative {what} ({value})")]
    NegativeDimension {
        file: PathBuf,
        what: &'static str,
        value: i32,
    },

    #[error("Could not read calibration table {file}: {err}")]
    IO {
        file: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("{file} claims {num_antennas} antennas and {num_chans} channels, which is too large to read")]
    TooLarge {
        file: PathBuf,
        num_antennas: usize,
        num_chans: usize,
    },

    #[error("{file} should be {expected} bytes for its dimensions, but it is {got} bytes")]
    Size {
        file: PathBuf,
        expected: u64,
        got: u64,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

const BANDPASS_TAG: u8 = b'B';
const JONES_TAG: u8 = b'J';
/// Tag byte and two `i32`s.
const HEADER_LEN: u64 = 9;

/// Bandpass (per-polarisation) gains.
#[derive(Debug, Clone, PartialEq)]
pub struct BandpassCal {
    /// `[antenna][channel][pol]`
    pub gains: Array3<c32>,
    /// `[antenna][channel][pol]`
    pub flags: Array3<bool>,
}

/// Polarised (full Jones) gains.
#[derive(Debug, Clone)]
pub struct JonesCal {
    /// `[antenna][channel]`
    pub gains: Array2<Jones<f32>>,
    /// `[antenna][channel]`
    pub flags: Array2<bool>,
}

/// Read the tag and dimensions shared by both table kinds.
fn read_header<R: Read>(
    reader: &mut R,
    file: &Path,
    expected: &'static str,
    tag: u8,
) -> Result<(usize, usize), BinaryCalError> {
    let io_err = |err| BinaryCalError::IO {
        file: file.to_path_buf(),
        err,
    };
    let got = reader.read_u8().map_err(io_err)?;
    if got != tag {
        return Err(BinaryCalError::WrongType {
            file: file.to_path_buf(),
            expected,
            expected_tag: char::from(tag),
            got: char::from(got),
        });
    }
    let mut dim = |what| -> Result<usize, BinaryCalError> {
        let value = reader.read_i32::<LittleEndian>().map_err(io_err)?;
        usize::try_from(value).map_err(|_| BinaryCalError::NegativeDimension {
            file: file.to_path_buf(),
            what,
            value,
        })
    };
    let num_antennas = dim("number of antennas")?;
    let num_chans = dim("number of channels")?;
    debug!("{}: {num_antennas} antennas, {num_chans} channels", file.display());
    Ok((num_antennas, num_chans))
}

/// Check the file is exactly as long as its header says before anything is
/// allocated. Returns the number of flags and complex gains to read.
fn check_size(
    file: &Path,
    num_antennas: usize,
    num_chans: usize,
    flags_per_cell: usize,
    gains_per_cell: usize,
) -> Result<(usize, usize), BinaryCalError> {
    let too_large = || BinaryCalError::TooLarge {
        file: file.to_path_buf(),
        num_antennas,
        num_chans,
    };
    let cells = num_antennas.checked_mul(num_chans).ok_or_else(too_large)?;
    let num_flags = cells.checked_mul(flags_per_cell).ok_or_else(too_large)?;
    let num_gains = cells.checked_mul(gains_per_cell).ok_or_else(too_large)?;
    let expected = u64::try_from(num_gains)
        .ok()
        .and_then(|n| n.checked_mul(8))
        .and_then(|n| n.checked_add(num_flags as u64))
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or_else(too_large)?;

    let got = std::fs::metadata(file)
        .map_err(|err| BinaryCalError::IO {
            file: file.to_path_buf(),
            err,
        })?
        .len();
    if got != expected {
        return Err(BinaryCalError::Size {
            file: file.to_path_buf(),
            expected,
            got,
        });
    }
    Ok((num_flags, num_gains))
}

fn read_flags<R: Read>(reader: &mut R, n: usize) -> std::io::Result<Vec<bool>> {
    let mut bytes = vec![0; n];
    reader.read_exact(&mut bytes)?;
    Ok(bytes.into_iter().map(|b| b != 0).collect())
}

fn read_gains<R: Read>(reader: &mut R, n: usize) -> std::io::Result<Vec<c32>> {
    let mut floats = vec![0.0; 2 * n];
    reader.read_f32_into::<LittleEndian>(&mut floats)?;
    Ok(floats
        .chunks_exact(2)
        .map(|re_im| c32::new(re_im[0], re_im[1]))
        .collect())
}

fn write_header<W: Write>(
    writer: &mut W,
    tag: u8,
    num_antennas: usize,
    num_chans: usize,
) -> std::io::Result<()> {
    let as_i32 = |n: usize| {
        i32::try_from(n).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "dimension too large")
        })
    };
    writer.write_u8(tag)?;
    writer.write_i32::<LittleEndian>(as_i32(num_antennas)?)?;
    writer.write_i32::<LittleEndian>(as_i32(num_chans)?)?;
    Ok(())
}

impl BandpassCal {
    pub fn read<P: AsRef<Path>>(file: P) -> Result<BandpassCal, BinaryCalError> {
        let file = file.as_ref();
        let io_err = |err| BinaryCalError::IO {
            file: file.to_path_buf(),
            err,
        };
        let mut reader = BufReader::new(File::open(file).map_err(io_err)?);
        let (num_antennas, num_chans) = read_header(&mut reader, file, "bandpass", BANDPASS_TAG)?;
        let shape = (num_antennas, num_chans, 2);
        let (num_flags, num_gains) = check_size(file, num_antennas, num_chans, 2, 2)?;

        let flags = read_flags(&mut reader, num_flags).map_err(io_err)?;
        let gains = read_gains(&mut reader, num_gains).map_err(io_err)?;
        Ok(BandpassCal {
            gains: Array3::from_shape_vec(shape, gains)?,
            flags: Array3::from_shape_vec(shape, flags)?,
        })
    }

    pub fn write<P: AsRef<Path>>(&self, file: P) -> std::io::Result<()> {
        let (num_antennas, num_chans, _) = self.gains.dim();
        let mut writer = BufWriter::new(File::create(file)?);
        write_header(&mut writer, BANDPASS_TAG, num_antennas, num_chans)?;
        for &f in self.flags.iter() {
            writer.write_u8(u8::from(f))?;
        }
        for g in self.gains.iter() {
            writer.write_f32::<LittleEndian>(g.re)?;
            writer.write_f32::<LittleEndian>(g.im)?;
        }
        writer.flush()
    }

    /// `None` if any index is out of range.
    pub fn flag(&self, ant: usize, chan: usize, pol: usize) -> Option<bool> {
        self.flags.get((ant, chan, pol)).copied()
    }

    pub fn gain(&self, ant: usize, chan: usize, pol: usize) -> Option<c32> {
        self.gains.get((ant, chan, pol)).copied()
    }
}

impl JonesCal {
    pub fn read<P: AsRef<Path>>(file: P) -> Result<JonesCal, BinaryCalError> {
        let file = file.as_ref();
        let io_err = |err| BinaryCalError::IO {
            file: file.to_path_buf(),
            err,
        };
        let mut reader = BufReader::new(File::open(file).map_err(io_err)?);
        let (num_antennas, num_chans) = read_header(&mut reader, file, "polarised", JONES_TAG)?;
        let shape = (num_antennas, num_chans);
        let (num_flags, num_gains) = check_size(file, num_antennas, num_chans, 1, 4)?;

        let flags = read_flags(&mut reader, num_flags).map_err(io_err)?;
        let gains = read_gains(&mut reader, num_gains)
            .map_err(io_err)?
            .chunks_exact(4)
            .map(|j| Jones::from([j[0], j[1], j[2], j[3]]))
            .collect();
        Ok(JonesCal {
            gains: Array2::from_shape_vec(shape, gains)?,
            flags: Array2::from_shape_vec(shape, flags)?,
        })
    }

    pub fn write<P: AsRef<Path>>(&self, file: P) -> std::io::Result<()> {
        let (num_antennas, num_chans) = self.gains.dim();
        let mut writer = BufWriter::new(File::create(file)?);
        write_header(&mut writer, JONES_TAG, num_antennas, num_chans)?;
        for &f in self.flags.iter() {
            writer.write_u8(u8::from(f))?;
        }
        for j in self.gains.iter() {
            for c in [j[0], j[1], j[2], j[3]] {
                writer.write_f32::<LittleEndian>(c.re)?;
                writer.write_f32::<LittleEndian>(c.im)?;
            }
        }
        writer.flush()
    }

    pub fn flag(&self, ant: usize, chan: usize) -> Option<bool> {
        self.flags.get((ant, chan)).copied()
    }

    /// The gain for the receptor pair (`pol1`, `pol2`). `None` if any index is
    /// out of range.
    pub fn gain(&self, ant: usize, chan: usize, pol1: usize, pol2: usize) -> Option<c32> {
        if pol1 > 1 || pol2 > 1 {
            return None;
        }
        self.gains.get((ant, chan)).map(|j| j[pol1 * 2 + pol2])
    }
}
