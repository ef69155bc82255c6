//! Error types for race-time operations.
//!
//! Parsing a time expression never fails with an error: unrecognized input
//! is reported through [`RaceTimeKind::Invalid`](crate::RaceTimeKind::Invalid).
//! These variants exist for the edges of the crate, where callers hand us
//! text instants or opt into `?`-style handling.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaceTimeError {
    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid race time '{input}' (grammar: {grammar})")]
    InvalidInput { input: String, grammar: String },
}

pub type Result<T> = std::result::Result<T, RaceTimeError>;
