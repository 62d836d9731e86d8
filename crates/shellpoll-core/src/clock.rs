//! Wall-clock helpers: unix seconds and human-readable UTC timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Whole seconds since the Unix epoch (floor). Clocks before the epoch read as 0.
pub fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Format unix seconds as an ISO-8601 UTC timestamp.
/// Example: `2026-02-15T01:30:00Z`
pub fn format_iso8601(secs: u64) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(secs);
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Split unix seconds into UTC (year, month, day, hour, minute, second).
/// Leap seconds are ignored.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let (days, rem) = (secs / 86_400, secs % 86_400);
    let (year, month, day) = civil_from_days(days);
    (year, month, day, rem / 3600, rem / 60 % 60, rem % 60)
}

/// Days since 1970-01-01 to a proleptic Gregorian date, counting in
/// 400-year eras that start on March 1 so the leap day ends each year.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let day_of_era = z % 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 { shifted_month + 3 } else { shifted_month - 9 };
    let year = era * 400 + year_of_era + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_format_epoch() {
        assert_eq!(format_iso8601(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_format_known_date() {
        // 2000-01-01 00:00:00 UTC
        assert_eq!(format_iso8601(946_684_800), "2000-01-01T00:00:00Z");
    }

    #[test]
    fn test_format_leap_day() {
        // 2024-02-29 12:34:56 UTC
        assert_eq!(format_iso8601(1_709_210_096), "2024-02-29T12:34:56Z");
    }

    #[test]
    fn test_format_end_of_year() {
        // 2023-12-31 23:59:59 UTC
        assert_eq!(format_iso8601(1_704_067_199), "2023-12-31T23:59:59Z");
    }

    #[test]
    fn test_unix_seconds_floors() {
        let at = UNIX_EPOCH + Duration::from_millis(1_999);
        assert_eq!(unix_seconds(at), 1);
    }

    #[test]
    fn test_unix_seconds_before_epoch_is_zero() {
        let at = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(unix_seconds(at), 0);
    }

    #[test]
    fn test_century_leap_rules() {
        // 2000 is a leap year, 2100 is not.
        assert_eq!(format_iso8601(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(format_iso8601(4_107_542_400), "2100-03-01T00:00:00Z");
        assert_eq!(format_iso8601(4_107_542_399), "2100-02-28T23:59:59Z");
    }
}
