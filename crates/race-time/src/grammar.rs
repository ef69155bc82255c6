//! The grammar registry: independent recognizers for race-time input.
//!
//! Each [`Grammar`] matches the *whole* trimmed input or nothing. A grammar
//! that matches commits to an answer even when that answer is a failure
//! (an out-of-range field, or an instant before the race start), so the
//! three outcomes are kept apart structurally in [`Recognition`].
//!
//! The dispatcher in [`crate::parser`] tries grammars in
//! [`Grammar::PRIORITY`] order and stops at the first commit.
//!
//! | Grammar        | Shape                  | Example        |
//! |----------------|------------------------|----------------|
//! | `date_time`    | `D/M HH:MM`            | `30/8 14:00`   |
//! | `hours_minutes`| `H:MM`, `Hh M[m]`      | `33:30`        |
//! | `day_time`     | `Day N HH:MM`          | `Day 2 08:00`  |
//! | `weekday_time` | `<weekday> HH:MM`      | `Fri 14:00`    |
//! | `hours`        | `H[.H][h]`             | `33h`, `2.5`   |
//! | `time_only`    | `HH:MM`                | `14:00`        |

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use regex::{Captures, Regex};
use serde::Serialize;

use crate::arithmetic::{add_days, next_clock_time, next_weekday_time, normalize_to_midnight};

static DATE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})\s+(\d{1,2}):(\d{2})$").unwrap());

static HOURS_COLON_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d{2})$").unwrap());

static HOURS_H_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+)h\s*(\d{1,2})m?$").unwrap());

static DAY_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:day|d)\s*(\d+)[,\s]+(\d{1,2}):(\d{2})$").unwrap()
});

static WEEKDAY_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+)[,\s]+(\d{1,2}):(\d{2})$").unwrap());

static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*h?$").unwrap());

static TIME_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").unwrap());

/// Weekday names understood by `weekday_time`, lowercase.
const WEEKDAY_NAMES: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("mon", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("tue", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("wed", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("thu", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("fri", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sat", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("sun", Weekday::Sun),
];

// ── Grammar ─────────────────────────────────────────────────────────────────

/// One input shape the parser understands.
///
/// `Unknown` is the tag carried by results no grammar recognized; it never
/// appears in [`Grammar::PRIORITY`] and its recognizer always declines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    DateTime,
    HoursMinutes,
    DayTime,
    WeekdayTime,
    Hours,
    TimeOnly,
    Unknown,
}

/// What a grammar made of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognition {
    /// The input is not this grammar's shape; the next grammar may try.
    Declined,
    /// Committed: an elapsed duration in minutes.
    Duration(i64),
    /// Committed: an absolute instant, to be measured from the race start.
    WallClock(NaiveDateTime),
    /// Committed, but a field is out of range or the instant cannot be
    /// placed after the race start.
    Rejected,
}

impl Grammar {
    /// The order the dispatcher tries grammars in.
    ///
    /// `hours_minutes` precedes `time_only`, so a bare `H:MM` is always an
    /// elapsed duration and never "the next 10:00".
    pub const PRIORITY: [Grammar; 6] = [
        Grammar::DateTime,
        Grammar::HoursMinutes,
        Grammar::DayTime,
        Grammar::WeekdayTime,
        Grammar::Hours,
        Grammar::TimeOnly,
    ];

    /// The stable tag for this grammar (e.g. `"hours_minutes"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Grammar::DateTime => "date_time",
            Grammar::HoursMinutes => "hours_minutes",
            Grammar::DayTime => "day_time",
            Grammar::WeekdayTime => "weekday_time",
            Grammar::Hours => "hours",
            Grammar::TimeOnly => "time_only",
            Grammar::Unknown => "unknown",
        }
    }

    /// An example input in this grammar's shape, for display next to a field.
    pub fn format_template(self) -> &'static str {
        match self {
            Grammar::DateTime => "30/8 14:00",
            Grammar::HoursMinutes => "33:30",
            Grammar::DayTime => "Day 2 08:00",
            Grammar::WeekdayTime => "Fri 14:00",
            Grammar::Hours => "33h",
            Grammar::TimeOnly => "14:00",
            Grammar::Unknown => "",
        }
    }

    /// Whether results from this grammar are wall-clock references.
    pub fn is_wall_clock(self) -> bool {
        matches!(
            self,
            Grammar::DateTime | Grammar::DayTime | Grammar::WeekdayTime | Grammar::TimeOnly
        )
    }

    /// Run this grammar against already-trimmed input.
    pub fn recognize(self, input: &str, race_start: NaiveDateTime) -> Recognition {
        match self {
            Grammar::DateTime => recognize_date_time(input, race_start),
            Grammar::HoursMinutes => recognize_hours_minutes(input),
            Grammar::DayTime => recognize_day_time(input, race_start),
            Grammar::WeekdayTime => recognize_weekday_time(input, race_start),
            Grammar::Hours => recognize_hours(input),
            Grammar::TimeOnly => recognize_time_only(input, race_start),
            Grammar::Unknown => Recognition::Declined,
        }
    }
}

impl std::fmt::Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up a weekday name (case-insensitive, full or abbreviated).
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let name = name.to_ascii_lowercase();
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, weekday)| *weekday)
}

// ── Recognizers ─────────────────────────────────────────────────────────────

/// `D/M HH:MM` in the race start's year, or the following year if that
/// would be before the start.
fn recognize_date_time(input: &str, race_start: NaiveDateTime) -> Recognition {
    let Some(caps) = DATE_TIME.captures(input) else {
        return Recognition::Declined;
    };
    let (Some(day), Some(month), Some(hour), Some(minute)) = (
        capture_u32(&caps, 1),
        capture_u32(&caps, 2),
        capture_u32(&caps, 3),
        capture_u32(&caps, 4),
    ) else {
        return Recognition::Rejected;
    };
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !valid_clock(hour, minute) {
        return Recognition::Rejected;
    }

    let year = race_start.year();
    let resolved = [year, year + 1]
        .into_iter()
        .filter_map(|y| lenient_date(y, month, day)?.and_hms_opt(hour, minute, 0))
        .find(|candidate| *candidate >= race_start);

    match resolved {
        Some(target) => Recognition::WallClock(target),
        None => Recognition::Rejected,
    }
}

/// `H:MM`, `HhMM`, `Hh MMm`: elapsed hours and minutes.
fn recognize_hours_minutes(input: &str) -> Recognition {
    let Some(caps) = HOURS_COLON_MINUTES
        .captures(input)
        .or_else(|| HOURS_H_MINUTES.captures(input))
    else {
        return Recognition::Declined;
    };
    let (Some(hours), Some(minutes)) = (capture_i64(&caps, 1), capture_i64(&caps, 2)) else {
        return Recognition::Rejected;
    };
    if !(0..60).contains(&minutes) {
        return Recognition::Rejected;
    }

    match hours.checked_mul(60).and_then(|m| m.checked_add(minutes)) {
        Some(total) => Recognition::Duration(total),
        None => Recognition::Rejected,
    }
}

/// `Day N HH:MM`, where day 1 is the race start's calendar day.
fn recognize_day_time(input: &str, race_start: NaiveDateTime) -> Recognition {
    let Some(caps) = DAY_TIME.captures(input) else {
        return Recognition::Declined;
    };
    let (Some(day), Some(hour), Some(minute)) = (
        capture_i64(&caps, 1),
        capture_u32(&caps, 2),
        capture_u32(&caps, 3),
    ) else {
        return Recognition::Rejected;
    };
    if day < 1 || !valid_clock(hour, minute) {
        return Recognition::Rejected;
    }

    let target = add_days(normalize_to_midnight(race_start), day - 1)
        .and_then(|midnight| midnight.date().and_hms_opt(hour, minute, 0));

    match target {
        Some(target) if target >= race_start => Recognition::WallClock(target),
        _ => Recognition::Rejected,
    }
}

/// `<weekday> HH:MM`: the next such weekday and time after the race start.
///
/// Declines when the leading word is not a weekday name, so other grammars
/// still get a chance at it.
fn recognize_weekday_time(input: &str, race_start: NaiveDateTime) -> Recognition {
    let Some(caps) = WEEKDAY_TIME.captures(input) else {
        return Recognition::Declined;
    };
    let Some(weekday) = parse_weekday(&caps[1]) else {
        return Recognition::Declined;
    };
    let (Some(hour), Some(minute)) = (capture_u32(&caps, 2), capture_u32(&caps, 3)) else {
        return Recognition::Rejected;
    };
    if !valid_clock(hour, minute) {
        return Recognition::Rejected;
    }

    match next_weekday_time(race_start, weekday, hour, minute) {
        Some(target) => Recognition::WallClock(target),
        None => Recognition::Rejected,
    }
}

/// `H`, `H.H`, `Hh`: elapsed hours, rounded to the nearest minute.
fn recognize_hours(input: &str) -> Recognition {
    let Some(caps) = HOURS.captures(input) else {
        return Recognition::Declined;
    };
    let Ok(hours) = caps[1].parse::<f64>() else {
        return Recognition::Rejected;
    };

    let minutes = (hours * 60.0).round();
    if !minutes.is_finite() || minutes >= i64::MAX as f64 {
        return Recognition::Rejected;
    }
    Recognition::Duration(minutes as i64)
}

/// `HH:MM`: the next occurrence of that clock time after the race start.
///
/// Every input this accepts is also `hours_minutes` shaped, so through the
/// dispatcher it is only a last resort.
fn recognize_time_only(input: &str, race_start: NaiveDateTime) -> Recognition {
    let Some(caps) = TIME_ONLY.captures(input) else {
        return Recognition::Declined;
    };
    let (Some(hour), Some(minute)) = (capture_u32(&caps, 1), capture_u32(&caps, 2)) else {
        return Recognition::Rejected;
    };
    if !valid_clock(hour, minute) {
        return Recognition::Rejected;
    }

    match next_clock_time(race_start, hour, minute) {
        Some(target) => Recognition::WallClock(target),
        None => Recognition::Rejected,
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn capture_u32(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn capture_i64(caps: &Captures<'_>, index: usize) -> Option<i64> {
    caps.get(index)?.as_str().parse().ok()
}

fn valid_clock(hour: u32, minute: u32) -> bool {
    hour <= 23 && minute <= 59
}

/// Build a date without a calendar validity check: days past the end of
/// the month spill into the next month (`30/2` → 1 or 2 March).
fn lenient_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day) - 1))
}

// ── Tests ───────────────────────────────────────────────────────────────────
