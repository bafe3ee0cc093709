//! Parse the `YYYY-MM-DD-HH:MM:SS.s` UTC timestamps used to describe
//! observations.

use hifitime::{Duration, Epoch};
use log::trace;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EpochParseError {
    #[error("'{text}' is not a timestamp of the form YYYY-MM-DD-HH:MM:SS.s")]
    Format { text: String },

    #[error("Could not parse the {field} of timestamp '{text}'")]
    Field { text: String, field: &'static str },

    #[error("Timestamp '{text}' is not a valid UTC date and time: {reason}")]
    Calendar { text: String, reason: String },

    #[error("Time offset {0} s is not a finite number")]
    Offset(f64),
}

/// Parse one integer field, allowing only ASCII digits.
fn parse_field<T: std::str::FromStr>(
    s: &str,
    text: &str,
    field: &'static str,
) -> Result<T, EpochParseError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EpochParseError::Field {
            text: text.to_string(),
            field,
        });
    }
    s.parse().map_err(|_| EpochParseError::Field {
        text: text.to_string(),
        field,
    })
}

/// Take a UTC date and time string of the form `YYYY-MM-DD-HH:MM:SS.s` and an
/// offset in seconds, and return the epoch `offset_seconds` after the
/// timestamp. The seconds may have any number of decimal places (or none).
pub fn parse_epoch(text: &str, offset_seconds: f64) -> Result<Epoch, EpochParseError> {
    let format_err = || EpochParseError::Format {
        text: text.to_string(),
    };

    let mut date_parts = text.trim().splitn(4, '-');
    let (year, month, day, time) = match (
        date_parts.next(),
        date_parts.next(),
        date_parts.next(),
        date_parts.next(),
    ) {
        (Some(y), Some(m), Some(d), Some(t)) => (y, m, d, t),
        _ => return Err(format_err()),
    };
    let time_parts: Vec<&str> = time.split(':').collect();
    let [hour, minute, second] = time_parts.as_slice() else {
        return Err(format_err());
    };

    let year: i32 = parse_field(year, text, "year")?;
    let month: u8 = parse_field(month, text, "month")?;
    let day: u8 = parse_field(day, text, "day")?;
    let hour: u8 = parse_field(hour, text, "hour")?;
    let minute: u8 = parse_field(minute, text, "minute")?;
    let (whole, frac) = second.split_once('.').unwrap_or((*second, ""));
    let second: u8 = parse_field(whole, text, "seconds")?;
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EpochParseError::Field {
            text: text.to_string(),
            field: "seconds",
        });
    }
    // Only digits are left, so this can't fail.
    let frac: f64 = format!("0.{frac}").parse().unwrap_or(0.0);

    let epoch = Epoch::maybe_from_gregorian_utc(year, month, day, hour, minute, second, 0)
        .map_err(|e| EpochParseError::Calendar {
            text: text.to_string(),
            reason: e.to_string(),
        })?;
    // hifitime rolls some impossible dates over (e.g. Feb 30 -> Mar 1).
    let (y, mo, d, h, mi, s, _) = epoch.to_gregorian_utc();
    if (y, mo, d, h, mi, s) != (year, month, day, hour, minute, second) {
        return Err(EpochParseError::Calendar {
            text: text.to_string(),
            reason: "no such date or time".to_string(),
        });
    }
    let epoch = epoch + Duration::from_seconds(frac);

    if !offset_seconds.is_finite() {
        return Err(EpochParseError::Offset(offset_seconds));
    }
    let epoch = epoch + Duration::from_seconds(offset_seconds);
    trace!("Parsed '{text}' + {offset_seconds} s as {epoch}");
    Ok(epoch)
}

#[cfg(test)]
mod tests {
    use hifitime::TimeUnits;

    use super::*;

    #[test]
    fn test_parse_epoch() {
        let e = parse_epoch("2020-01-01-00:00:00.0", 0.0).unwrap();
        assert_eq!(e, Epoch::from_gregorian_utc_at_midnight(2020, 1, 1));

        let e = parse_epoch("2013-07-11-03:24:09.25", 0.0).unwrap();
        assert_eq!(
            e,
            Epoch::from_gregorian_utc(2013, 7, 11, 3, 24, 9, 250_000_000)
        );

        // No decimal point is fine, too.
        let e = parse_epoch("2013-07-11-03:24:09", 0.0).unwrap();
        assert_eq!(e, Epoch::from_gregorian_utc(2013, 7, 11, 3, 24, 9, 0));

        // Fractions that round up to a whole second carry into the minute.
        let e = parse_epoch("2020-01-01-00:00:59.9999999999", 0.0).unwrap();
        let next_minute = Epoch::from_gregorian_utc(2020, 1, 1, 0, 1, 0, 0);
        assert!((e - next_minute).abs() < 1.microseconds());

        // Leap day.
        let e = parse_epoch("2020-02-29-12:00:00", 0.0).unwrap();
        assert_eq!(e, Epoch::from_gregorian_utc(2020, 2, 29, 12, 0, 0, 0));
    }

    #[test]
    fn test_offset_is_added() {
        let base = parse_epoch("2020-01-01-00:00:00.0", 0.0).unwrap();
        let later = parse_epoch("2020-01-01-00:00:00.0", 3600.0).unwrap();
        assert_eq!(later - base, 1.hours());

        let earlier = parse_epoch("2020-01-01-00:00:00.0", -1800.0).unwrap();
        assert_eq!(base - earlier, 30.minutes());
    }

    #[test]
    fn test_bad_timestamps() {
        for text in [
            "not-a-date",
            "",
            "2020-01-01",
            "2020-01-01 00:00:00.0",
            "2020-01-01-00:00",
            "2020-01-01-00:00:00:00",
            "2020-01-01-00:00:00.0abc",
            "2020-xx-01-00:00:00.0",
            "2020-01-01-00:00:.5",
            "2020-13-01-00:00:00.0",
            "2020-02-30-00:00:00.0",
            "2021-02-29-00:00:00.0",
            "2020-04-31-00:00:00.0",
            "2020-01-00-00:00:00.0",
            "2020-01-01-00:60:00.0",
            "2020-01-01-25:00:00.0",
        ] {
            assert!(parse_epoch(text, 0.0).is_err(), "'{text}' should not parse");
        }
        assert!(matches!(
            parse_epoch("not-a-date", 0.0),
            Err(EpochParseError::Format { .. })
        ));
        assert!(matches!(
            parse_epoch("2020-02-30-00:00:00.0", 0.0),
            Err(EpochParseError::Calendar { .. })
        ));
    }

    #[test]
    fn test_bad_offset() {
        assert_eq!(
            parse_epoch("2020-01-01-00:00:00.0", f64::INFINITY),
            Err(EpochParseError::Offset(f64::INFINITY))
        );
    }
}
