//! # race-time
//!
//! Deterministic parsing of race-relative time expressions.
//!
//! During a multi-day endurance race people describe moments in several
//! ways: elapsed time (`"33"`, `"33:30"`), a race day (`"Day 2 08:00"`), a
//! weekday (`"Fri 14:00"`) or a date (`"30/8 14:00"`). This crate turns any
//! of those into minutes since the race start plus the absolute instant,
//! and formats durations back into text that parses to the same value.
//!
//! All functions are pure: the race start is passed on every call and the
//! system clock is never read.
//!
//! ## Modules
//!
//! - [`parser`] — [`parse_race_time`] and the [`ParsedRaceTime`] result
//! - [`grammar`] — The ordered registry of input grammars
//! - [`arithmetic`] — Midnight normalization, checked additions, roll-forward
//! - [`format`] — Display strings and inverse conversions
//! - [`error`] — Error types

pub mod arithmetic;
pub mod error;
pub mod format;
pub mod grammar;
pub mod parser;

pub use arithmetic::parse_instant;
pub use error::RaceTimeError;
pub use format::{
    duration_to_input, format_duration, format_instant, instant_to_duration, DurationInput,
};
pub use grammar::{Grammar, Recognition};
pub use parser::{parse_race_time, ParsedRaceTime, RaceTimeKind};
