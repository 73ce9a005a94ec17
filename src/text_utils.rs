use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the timestamp {}", num_str, date_str)),
    }
}

/// Parses `created_at` as the backend serializes it. RFC 3339 with an offset
/// is the usual shape, but a naive `YYYY-MM-DD HH:MM:SS[.fff]` (with either
/// a space or a `T` separator) is accepted too and read as UTC.
pub fn parse_timestamp(buf: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(fixed) = DateTime::parse_from_rfc3339(buf) {
        return Ok(fixed.with_timezone(&Utc));
    }

    lazy_static! {
        static ref TS_REGEX: Regex = Regex::new(
            r#"(\d{4})-(\d{1,2})-(\d{1,2})[ T](\d{1,2}):(\d{1,2}):(\d{1,2})(\.\d+)?"#
        ).unwrap();
    }

    let Some(caps) = TS_REGEX.captures(buf) else {
        return Err(format!("Unable to parse timestamp {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    // Regex instead of a fixed format string, so single-digit fields pass too
    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = to_u32(caps.index(4))?;
    let mn: u32 = to_u32(caps.index(5))?;
    let s: u32 = to_u32(caps.index(6))?;

    let date = match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => return Err(format!("Invalid date in timestamp {}", buf)),
    };
    let time = match NaiveTime::from_hms_opt(h, mn, s) {
        Some(time) => time,
        None => return Err(format!("Invalid time in timestamp {}", buf)),
    };

    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Long-form publication stamp, e.g. "June 5, 2025, 02:31 PM".
pub fn format_published(date_time: &DateTime<Utc>) -> String {
    date_time.format("%B %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2025-06-05T14:31:00+00:00").unwrap();
        assert_eq!(format_published(&ts), "June 5, 2025, 02:31 PM");

        // Offsets are normalized to UTC before display
        let ts = parse_timestamp("2025-06-05T16:31:00+02:00").unwrap();
        assert_eq!(format_published(&ts), "June 5, 2025, 02:31 PM");
    }

    #[test]
    fn test_parse_naive() {
        let ts = parse_timestamp("2025-06-05 14:31:00.123").unwrap();
        assert_eq!(format_published(&ts), "June 5, 2025, 02:31 PM");

        let ts = parse_timestamp("2025-6-5 9:4:2").unwrap();
        assert_eq!(format_published(&ts), "June 5, 2025, 09:04 AM");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_timestamp("not a date").is_err());
        assert!(parse_timestamp("2025-13-40 99:00:00").is_err());
    }

    #[test]
    fn test_ordering_uses_full_timestamp() {
        let morning = parse_timestamp("2025-06-05T09:00:00+00:00").unwrap();
        let evening = parse_timestamp("2025-06-05T21:00:00+00:00").unwrap();
        assert!(evening > morning);
    }
}
