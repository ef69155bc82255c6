//! Display strings and the inverse conversions back to editable input.
//!
//! None of these functions can fail. Negative durations, which a valid
//! [`ParsedRaceTime`](crate::ParsedRaceTime) never holds, clamp to zero.

use std::fmt;

use chrono::NaiveDateTime;

use crate::arithmetic::elapsed_minutes;

/// Render minutes as `"{hours}h {minutes:02}m"`, e.g. `"33h 30m"`.
///
/// # Examples
///
/// ```
/// use race_time::format::format_duration;
///
/// assert_eq!(format_duration(2010), "33h 30m");
/// assert_eq!(format_duration(-5), "0h 00m");
/// ```
pub fn format_duration(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

/// Render an instant as a short calendar string, e.g. `"Aug 30, 14:00"`.
pub fn format_instant(instant: NaiveDateTime) -> String {
    instant.format("%b %-d, %H:%M").to_string()
}

/// The shortest input that parses back to exactly `minutes`.
///
/// Whole hours give `"{hours}h"` (the `hours` grammar); anything else gives
/// `"{hours}:{minutes:02}"` (the `hours_minutes` grammar).
pub fn duration_to_input(minutes: i64) -> String {
    DurationInput::from_minutes(minutes).into_string()
}

/// Minutes from `race_start` to `instant`; negative if `instant` is earlier.
pub fn instant_to_duration(instant: NaiveDateTime, race_start: NaiveDateTime) -> i64 {
    elapsed_minutes(race_start, instant)
}

// ── DurationInput ───────────────────────────────────────────────────────────

/// Editable text for a duration, guaranteed to re-parse to the same minutes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DurationInput(String);

impl DurationInput {
    pub fn from_minutes(minutes: i64) -> Self {
        let minutes = minutes.max(0);
        let (hours, rest) = (minutes / 60, minutes % 60);
        if rest == 0 {
            Self(format!("{hours}h"))
        } else {
            Self(format!("{hours}:{rest:02}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DurationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DurationInput {
    fn as_ref(&self) -> &str {
        &self.0
    }
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

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h 00m");
        assert_eq!(format_duration(5), "0h 05m");
        assert_eq!(format_duration(1980), "33h 00m");
        assert_eq!(format_duration(9120), "152h 00m");
        assert_eq!(format_duration(6001), "100h 01m");
    }

    #[test]
    fn test_format_duration_clamps_negative() {
        assert_eq!(format_duration(-1), "0h 00m");
        assert_eq!(format_duration(i64::MIN), "0h 00m");
    }

    #[test]
    fn test_format_instant() {
        assert_eq!(format_instant(at(2024, 8, 30, 14, 0)), "Aug 30, 14:00");
        assert_eq!(format_instant(at(2024, 4, 3, 6, 5)), "Apr 3, 06:05");
    }

    #[test]
    fn test_duration_to_input() {
        assert_eq!(duration_to_input(0), "0h");
        assert_eq!(duration_to_input(1980), "33h");
        assert_eq!(duration_to_input(2010), "33:30");
        assert_eq!(duration_to_input(61), "1:01");
        assert_eq!(duration_to_input(59), "0:59");
        assert_eq!(duration_to_input(-30), "0h");
    }

    #[test]
    fn test_duration_input_display() {
        let input = DurationInput::from_minutes(125);
        assert_eq!(input.as_str(), "2:05");
        assert_eq!(input.to_string(), "2:05");
        assert_eq!(input.as_ref(), "2:05");
    }

    #[test]
    fn test_instant_to_duration() {
        let start = at(2024, 4, 13, 6, 0);
        assert_eq!(instant_to_duration(at(2024, 4, 14, 8, 0), start), 1560);
        assert_eq!(instant_to_duration(at(2024, 4, 13, 5, 30), start), -30);
    }
}
