//! Read plain-text antenna offset lists.
//!
//! The file is whitespace-separated numbers, three per antenna (East, North,
//! Up, all in metres), in antenna order. Line breaks carry no meaning.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::geometry::AntennaOffset;

#[derive(Error, Debug)]
pub enum AntennaReadError {
    #[error("Couldn't read antenna file {file}: {err}")]
    IO {
        file: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Expected {expected} numbers for {num_antennas} antennas, but only found {got}")]
    TooFew {
        num_antennas: usize,
        expected: usize,
        got: usize,
    },

    #[error("Couldn't parse '{token}' (value {index}) as a number")]
    Parse { token: String, index: usize },
}

/// Parse the first `num_antennas` offsets out of `text`. Anything after them is
/// ignored.
pub fn parse_antenna_offsets(
    text: &str,
    num_antennas: usize,
) -> Result<Vec<AntennaOffset>, AntennaReadError> {
    let expected = 3 * num_antennas;
    let values = text
        .split_whitespace()
        .take(expected)
        .enumerate()
        .map(|(index, token)| {
            token.parse::<f64>().map_err(|_| AntennaReadError::Parse {
                token: token.to_string(),
                index,
            })
        })
        .collect::<Result<Vec<f64>, _>>()?;
    if values.len() < expected {
        return Err(AntennaReadError::TooFew {
            num_antennas,
            expected,
            got: values.len(),
        });
    }

    Ok(values
        .chunks_exact(3)
        .map(|enu| AntennaOffset::new(enu[0], enu[1], enu[2]))
        .collect())
}

/// Read `num_antennas` offsets from the file at `path`.
pub fn read_antenna_offsets<P: AsRef<Path>>(
    path: P,
    num_antennas: usize,
) -> Result<Vec<AntennaOffset>, AntennaReadError> {
    let path = path.as_ref();
    debug!("Reading {num_antennas} antenna offsets from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|err| AntennaReadError::IO {
        file: path.to_path_buf(),
        err,
    })?;
    let offsets = parse_antenna_offsets(&text, num_antennas)?;
    let num_values = text.split_whitespace().count();
    if num_values > 3 * num_antennas {
        warn!(
            "{} has {num_values} values; only the first {} were used",
            path.display(),
            3 * num_antennas
        );
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_offsets() {
        let text = "0 0 0\n10.5 -2 1e-3\n\n  -7.25\t3 0.5\n";
        let offsets = parse_antenna_offsets(text, 3).unwrap();
        assert_eq!(
            offsets,
            [
                AntennaOffset::new(0.0, 0.0, 0.0),
                AntennaOffset::new(10.5, -2.0, 1e-3),
                AntennaOffset::new(-7.25, 3.0, 0.5),
            ]
        );

        // Fewer antennas than are in the text.
        assert_eq!(parse_antenna_offsets(text, 1).unwrap().len(), 1);
        assert!(parse_antenna_offsets(text, 0).unwrap().is_empty());
    }

    #[test]
    fn test_parse_bad_offsets() {
        assert!(matches!(
            parse_antenna_offsets("1 2 3 4 5", 2),
            Err(AntennaReadError::TooFew {
                num_antennas: 2,
                expected: 6,
                got: 5
            })
        ));
        assert!(matches!(
            parse_antenna_offsets("1 2 three", 1),
            Err(AntennaReadError::Parse { index: 2, .. })
        ));
    }

    #[test]
    fn test_read_offsets_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1 2 3").unwrap();
        writeln!(file, "4 5 6").unwrap();
        file.flush().unwrap();
        let offsets = read_antenna_offsets(file.path(), 2).unwrap();
        assert_eq!(offsets[1], AntennaOffset::new(4.0, 5.0, 6.0));

        let missing = file.path().with_extension("does-not-exist");
        assert!(matches!(
            read_antenna_offsets(missing, 2),
            Err(AntennaReadError::IO { .. })
        ));
    }
}
