//! Unified error types for the monitoring station.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! console's error reporting uniform.  All variants are `Copy` so they can
//! travel through the rendezvous channels without allocation.
//!
//! Nothing in the core is fatal: every operation either succeeds or reports
//! one of these errors and leaves the prior state intact.

use core::fmt;

use crate::console::ConsoleError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the station funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Operator input was out of range; nothing was applied.
    Validation(ValidationError),
    /// A console line could not be turned into a command.
    Console(ConsoleError),
    /// The configuration file is not valid JSON.
    Config { line: usize, column: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{e}"),
            Self::Console(e) => write!(f, "{e}"),
            Self::Config { line, column } => {
                write!(f, "config: malformed JSON at line {line}, column {column}")
            }
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Range and format violations detected before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Hours outside 0–23 or minutes/seconds outside 0–59.
    InvalidTime,
    /// Period or duration outside 0–59 seconds.
    InvalidPeriod,
    /// Temperature threshold outside the accepted range.
    InvalidTemperature,
    /// Luminosity bucket outside 0–3.
    InvalidLuminosity,
    /// Interval end is not strictly after its start.
    InvalidInterval,
    /// Record index outside the ring capacity.
    InvalidRecordIndex,
    /// Record count larger than the ring capacity.
    InvalidRecordCount,
    /// Alarm activation flag was neither `A` nor `a`.
    InvalidAlarmFlag,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTime => write!(f, "invalid time format"),
            Self::InvalidPeriod => write!(f, "invalid seconds"),
            Self::InvalidTemperature => write!(f, "invalid temperature"),
            Self::InvalidLuminosity => write!(f, "invalid luminosity"),
            Self::InvalidInterval => write!(f, "invalid time interval"),
            Self::InvalidRecordIndex => write!(f, "invalid index"),
            Self::InvalidRecordCount => write!(f, "invalid number of records"),
            Self::InvalidAlarmFlag => write!(f, "invalid character"),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ConsoleError> for Error {
    fn from(e: ConsoleError) -> Self {
        Self::Console(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Station-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
