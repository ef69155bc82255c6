//! Offset-naive calendar arithmetic shared by the grammars.
//!
//! Every instant is a [`NaiveDateTime`] read as local wall time. No timezone
//! conversion happens anywhere in this module. Additions are checked: an
//! instant pushed outside chrono's representable range yields `None` rather
//! than panicking, and the caller turns that into an invalid result.

use chrono::{DateTime, Datelike, Days, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

use crate::error::{RaceTimeError, Result};

/// Text layouts accepted by [`parse_instant`] after RFC 3339.
const INSTANT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

// ── Basic arithmetic ────────────────────────────────────────────────────────

/// Midnight at the start of `instant`'s calendar day.
pub fn normalize_to_midnight(instant: NaiveDateTime) -> NaiveDateTime {
    instant.date().and_time(NaiveTime::MIN)
}

/// Add a signed number of minutes.
pub fn add_minutes(instant: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    let delta = TimeDelta::try_minutes(minutes)?;
    instant.checked_add_signed(delta)
}

/// Add a signed number of calendar days, keeping the wall-clock time.
pub fn add_days(instant: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let step = Days::new(days.unsigned_abs());
    if days >= 0 {
        instant.checked_add_days(step)
    } else {
        instant.checked_sub_days(step)
    }
}

/// Signed whole minutes from `from` to `to`, truncated toward zero.
///
/// Negative when `to` precedes `from`. Grammars that only resolve forward
/// are responsible for rejecting negative values.
pub fn elapsed_minutes(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_minutes()
}

// ── Roll-forward resolution ─────────────────────────────────────────────────

/// Next occurrence of `hour:minute` strictly after `after`.
///
/// Starts from midnight of `after`'s day; a candidate at or before `after`
/// moves to the following day.
pub fn next_clock_time(after: NaiveDateTime, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let candidate = after.date().and_hms_opt(hour, minute, 0)?;
    if candidate > after {
        Some(candidate)
    } else {
        add_days(candidate, 1)
    }
}

/// Next occurrence of `weekday` at `hour:minute` strictly after `after`.
///
/// When `after` already falls on `weekday` and the time has passed (or is
/// exactly now), the result is the same weekday one week later.
pub fn next_weekday_time(
    after: NaiveDateTime,
    weekday: Weekday,
    hour: u32,
    minute: u32,
) -> Option<NaiveDateTime> {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - after.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let day = add_days(normalize_to_midnight(after), days_ahead)?;
    let candidate = day.date().and_hms_opt(hour, minute, 0)?;

    if days_ahead == 0 && candidate <= after {
        add_days(candidate, 7)
    } else {
        Some(candidate)
    }
}

// ── Text instants ───────────────────────────────────────────────────────────

/// Parse a race-start instant from text.
///
/// Accepts RFC 3339 (the offset is dropped and the local wall time kept),
/// `YYYY-MM-DDTHH:MM[:SS]` and `YYYY-MM-DD HH:MM[:SS]`.
///
/// # Errors
///
/// Returns [`RaceTimeError::InvalidDatetime`] if no layout matches.
///
/// # Examples
///
/// ```
/// use race_time::arithmetic::parse_instant;
///
/// let start = parse_instant("2024-04-13T06:00").unwrap();
/// assert_eq!(start.to_string(), "2024-04-13 06:00:00");
/// ```
pub fn parse_instant(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| RaceTimeError::InvalidDatetime(format!("'{s}'")))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // ── basic arithmetic ────────────────────────────────────────────────

    #[test]
    fn test_normalize_to_midnight() {
        let t = NaiveDate::from_ymd_opt(2024, 4, 13)
            .unwrap()
            .and_hms_milli_opt(17, 42, 9, 250)
            .unwrap();
        assert_eq!(normalize_to_midnight(t), at(2024, 4, 13, 0, 0));
    }

    #[test]
    fn test_add_minutes_crosses_midnight() {
        assert_eq!(add_minutes(at(2024, 4, 13, 23, 30), 45), Some(at(2024, 4, 14, 0, 15)));
        assert_eq!(add_minutes(at(2024, 4, 13, 0, 10), -20), Some(at(2024, 4, 12, 23, 50)));
    }

    #[test]
    fn test_add_minutes_overflow_is_none() {
        assert_eq!(add_minutes(at(2024, 4, 13, 6, 0), i64::MAX), None);
        assert_eq!(add_minutes(NaiveDateTime::MAX, 1), None);
    }

    #[test]
    fn test_add_days_calendar() {
        // 2024 is a leap year
        assert_eq!(add_days(at(2024, 2, 28, 8, 0), 1), Some(at(2024, 2, 29, 8, 0)));
        assert_eq!(add_days(at(2024, 3, 1, 8, 0), -1), Some(at(2024, 2, 29, 8, 0)));
        assert_eq!(add_days(at(2024, 12, 31, 8, 0), 1), Some(at(2025, 1, 1, 8, 0)));
    }

    #[test]
    fn test_elapsed_minutes_signed() {
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(elapsed_minutes(start, at(2024, 4, 14, 8, 0)), 1560);
        assert_eq!(elapsed_minutes(start, at(2024, 4, 13, 5, 0)), -60);
        assert_eq!(elapsed_minutes(start, start), 0);
    }

    #[test]
    fn test_elapsed_minutes_truncates_toward_zero() {
        let start = at(2024, 4, 13, 6, 0);
        let later = start + TimeDelta::seconds(119);
        let earlier = start - TimeDelta::seconds(119);
        assert_eq!(elapsed_minutes(start, later), 1);
        assert_eq!(elapsed_minutes(start, earlier), -1);
    }

    // ── roll-forward ────────────────────────────────────────────────────

    #[test]
    fn test_next_clock_time_same_day() {
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(next_clock_time(start, 14, 0), Some(at(2024, 4, 13, 14, 0)));
    }

    #[test]
    fn test_next_clock_time_rolls_to_tomorrow() {
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(next_clock_time(start, 5, 0), Some(at(2024, 4, 14, 5, 0)));
        // Exactly now is not strictly after
        assert_eq!(next_clock_time(start, 6, 0), Some(at(2024, 4, 14, 6, 0)));
    }

    #[test]
    fn test_next_clock_time_out_of_range() {
        assert_eq!(next_clock_time(at(2024, 4, 13, 6, 0), 24, 0), None);
    }

    #[test]
    fn test_next_weekday_later_this_week() {
        // 2024-04-13 is a Saturday
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(
            next_weekday_time(start, Weekday::Sun, 10, 0),
            Some(at(2024, 4, 14, 10, 0))
        );
        assert_eq!(
            next_weekday_time(start, Weekday::Fri, 14, 0),
            Some(at(2024, 4, 19, 14, 0))
        );
    }

    #[test]
    fn test_next_weekday_same_day() {
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(
            next_weekday_time(start, Weekday::Sat, 18, 0),
            Some(at(2024, 4, 13, 18, 0))
        );
        assert_eq!(
            next_weekday_time(start, Weekday::Sat, 6, 0),
            Some(at(2024, 4, 20, 6, 0))
        );
        assert_eq!(
            next_weekday_time(start, Weekday::Sat, 5, 59),
            Some(at(2024, 4, 20, 5, 59))
        );
    }

    // ── parse_instant ───────────────────────────────────────────────────

    #[test]
    fn test_parse_instant_layouts() {
        let expected = at(2024, 4, 13, 6, 0);
        assert_eq!(parse_instant("2024-04-13T06:00").unwrap(), expected);
        assert_eq!(parse_instant("2024-04-13T06:00:00").unwrap(), expected);
        assert_eq!(parse_instant("2024-04-13 06:00").unwrap(), expected);
        assert_eq!(parse_instant("  2024-04-13 06:00:00 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_instant_rfc3339_keeps_wall_time() {
        let parsed = parse_instant("2024-04-13T06:00:00+02:00").unwrap();
        assert_eq!(parsed, at(2024, 4, 13, 6, 0));
    }

    #[test]
    fn test_parse_instant_invalid() {
        let err = parse_instant("next saturday").unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"), "got: {err}");
    }
}
