//! The dispatcher and the [`ParsedRaceTime`] result.
//!
//! [`parse_race_time`] is the only parsing entry point. It never fails and
//! never panics: anything it cannot place after the race start comes back
//! as a [`RaceTimeKind::Invalid`] result that still carries the original
//! input for error messages.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::arithmetic::{add_minutes, elapsed_minutes};
use crate::error::{RaceTimeError, Result};
use crate::format::{format_duration, format_instant};
use crate::grammar::{Grammar, Recognition};

/// A bare 1-3 digit number with an optional `h`.
static SHORT_DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d{1,3}h?$").unwrap());

// ── Result type ─────────────────────────────────────────────────────────────

/// How the input expressed its time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceTimeKind {
    /// Elapsed time since the race start (`33h`, `33:30`).
    Duration,
    /// A calendar reference converted to elapsed time (`Fri 14:00`).
    WallClock,
    /// No grammar matched, or the one that did rejected the input.
    Invalid,
}

/// The outcome of one [`parse_race_time`] call.
///
/// Every field past `kind` is derived at construction: a valid result always
/// has a non-negative `duration_minutes`, a `target_instant` equal to the race
/// start plus that duration, and both display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRaceTime {
    kind: RaceTimeKind,
    is_valid: bool,
    duration_minutes: Option<i64>,
    target_instant: Option<NaiveDateTime>,
    display_duration: Option<String>,
    display_instant: Option<String>,
    matched_grammar: Grammar,
    format_template: &'static str,
    original_input: String,
}

impl ParsedRaceTime {
    fn invalid(input: &str, grammar: Grammar) -> Self {
        Self {
            kind: RaceTimeKind::Invalid,
            is_valid: false,
            duration_minutes: None,
            target_instant: None,
            display_duration: None,
            display_instant: None,
            matched_grammar: grammar,
            format_template: grammar.format_template(),
            original_input: input.to_string(),
        }
    }

    fn resolved(
        input: &str,
        grammar: Grammar,
        kind: RaceTimeKind,
        minutes: i64,
        race_start: NaiveDateTime,
    ) -> Self {
        if minutes < 0 {
            return Self::invalid(input, grammar);
        }
        let Some(target) = add_minutes(race_start, minutes) else {
            return Self::invalid(input, grammar);
        };

        Self {
            kind,
            is_valid: true,
            duration_minutes: Some(minutes),
            target_instant: Some(target),
            display_duration: Some(format_duration(minutes)),
            display_instant: Some(format_instant(target)),
            matched_grammar: grammar,
            format_template: grammar.format_template(),
            original_input: input.to_string(),
        }
    }

    pub fn kind(&self) -> RaceTimeKind {
        self.kind
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Minutes from the race start; `None` when invalid.
    pub fn duration_minutes(&self) -> Option<i64> {
        self.duration_minutes
    }

    /// The race start plus [`duration_minutes`](Self::duration_minutes).
    pub fn target_instant(&self) -> Option<NaiveDateTime> {
        self.target_instant
    }

    pub fn display_duration(&self) -> Option<&str> {
        self.display_duration.as_deref()
    }

    pub fn display_instant(&self) -> Option<&str> {
        self.display_instant.as_deref()
    }

    pub fn matched_grammar(&self) -> Grammar {
        self.matched_grammar
    }

    pub fn format_template(&self) -> &'static str {
        self.format_template
    }

    /// The input exactly as the caller passed it, untrimmed.
    pub fn original_input(&self) -> &str {
        &self.original_input
    }

    /// Turn an invalid result into an error, for callers that want `?`.
    ///
    /// # Errors
    ///
    /// Returns [`RaceTimeError::InvalidInput`] naming the input and the grammar
    /// that rejected it (`"unknown"` when nothing matched).
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(RaceTimeError::InvalidInput {
                input: self.original_input,
                grammar: self.matched_grammar.as_str().to_string(),
            })
        }
    }
}

// ── Dispatcher ──────────────────────────────────────────────────────────────

/// Parse a race-relative time expression.
///
/// # Arguments
///
/// * `input` — What the user typed (e.g. `"33"`, `"Day 2 08:00"`, `"Fri 14:00"`)
/// * `race_start` — The instant every duration and wall-clock time is relative to
///
/// # Supported Expressions
///
/// Tried in this order, first match wins (see [`Grammar::PRIORITY`]):
///
/// 1. **Date**: `"30/8 14:00"` (day/month, this year or next)
/// 2. **Hours and minutes**: `"33:30"`, `"33h30m"`, `"33h 30"`
/// 3. **Race day**: `"Day 2 08:00"`, `"D2 08:00"` (day 1 is the start day)
/// 4. **Weekday**: `"Fri 14:00"`, `"friday, 14:00"` (next occurrence)
/// 5. **Hours**: `"33"`, `"33h"`, `"2.5"`
/// 6. **Clock time**: `"14:00"` (next occurrence; only reachable where
///    `hours_minutes` declines)
///
/// A bare `H:MM` is always a duration: `"10:00"` is ten hours in, not the
/// next 10 o'clock.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use race_time::{parse_race_time, Grammar, RaceTimeKind};
///
/// // Saturday 06:00
/// let start = NaiveDate::from_ymd_opt(2024, 4, 13)
///     .unwrap()
///     .and_hms_opt(6, 0, 0)
///     .unwrap();
///
/// let parsed = parse_race_time("Day 2 08:00", start);
/// assert_eq!(parsed.kind(), RaceTimeKind::WallClock);
/// assert_eq!(parsed.matched_grammar(), Grammar::DayTime);
/// assert_eq!(parsed.duration_minutes(), Some(1560));
/// assert_eq!(parsed.display_duration(), Some("26h 00m"));
///
/// assert!(!parse_race_time("10:65", start).is_valid());
/// ```
pub fn parse_race_time(input: &str, race_start: NaiveDateTime) -> ParsedRaceTime {
    let normalized = input.trim();
    if normalized.is_empty() {
        return ParsedRaceTime::invalid(input, Grammar::Unknown);
    }

    // Fast path for short bare numbers ("33", "33h"). The priority loop gives
    // the same answer for these shapes today; the branch pins them to `hours`
    // should an earlier grammar ever grow to accept them.
    if SHORT_DURATION.is_match(normalized) {
        if let Some(parsed) = commit(Grammar::Hours, input, normalized, race_start) {
            trace!(input = normalized, "short duration fast path");
            return parsed;
        }
    }

    for grammar in Grammar::PRIORITY {
        if let Some(parsed) = commit(grammar, input, normalized, race_start) {
            debug!(
                input = normalized,
                grammar = grammar.as_str(),
                valid = parsed.is_valid(),
                "grammar committed"
            );
            return parsed;
        }
    }

    debug!(input = normalized, "no grammar matched");
    ParsedRaceTime::invalid(input, Grammar::Unknown)
}

/// Run one grammar; `None` means it declined.
fn commit(
    grammar: Grammar,
    input: &str,
    normalized: &str,
    race_start: NaiveDateTime,
) -> Option<ParsedRaceTime> {
    let parsed = match grammar.recognize(normalized, race_start) {
        Recognition::Declined => return None,
        Recognition::Rejected => ParsedRaceTime::invalid(input, grammar),
        Recognition::Duration(minutes) => ParsedRaceTime::resolved(
            input,
            grammar,
            RaceTimeKind::Duration,
            minutes,
            race_start,
        ),
        Recognition::WallClock(target) => ParsedRaceTime::resolved(
            input,
            grammar,
            RaceTimeKind::WallClock,
            elapsed_minutes(race_start, target),
            race_start,
        ),
    };
    Some(parsed)
}

// ── Tests ───────────────────────────────────────────────────────────────────
