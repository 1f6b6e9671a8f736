use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::Instant;

/// Errors from parva calculations.
///
/// Expected "no answer" outcomes of rule execution live in the rules crate;
/// everything here is either a caller mistake or a failure of the call.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParvaError {
    /// Malformed date, coordinate or parameter, rejected before computing.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Date outside the range the converter can model.
    #[error("Date {date} is out of supported range ({min} to {max})")]
    DateOutOfRange {
        date: NaiveDate,
        min: NaiveDate,
        max: NaiveDate,
    },

    /// BS day exceeds the month length.
    #[error("Invalid BS date {year}-{month:02}-{day:02}: month has {max_day} days")]
    InvalidBsDate {
        year: i32,
        month: u8,
        day: u8,
        max_day: u8,
    },

    /// Periodic search exceeded its scan window.
    #[error("No angular boundary found within {max_scan_days} days of {start}")]
    BoundaryNotFound { start: Instant, max_scan_days: u32 },

    /// A new-moon window without a full moon inside it.
    #[error("Lunar month {start} to {end} contains no Purnima")]
    UndefinedLunarMonth { start: Instant, end: Instant },

    /// The position provider could not answer.
    #[error("Position provider failed: {reason}")]
    ExternalProviderFailure { reason: String },
}

/// Coarse error taxonomy shared with the rules layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    BoundaryNotFound,
    RuleNotExecutable,
    NoOccurrenceInYear,
    ExternalProviderFailure,
}

impl ParvaError {
    /// Creates an `InvalidInput` error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Creates an `ExternalProviderFailure` error.
    pub fn provider(reason: impl Into<String>) -> Self {
        Self::ExternalProviderFailure { reason: reason.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::DateOutOfRange { .. } | Self::InvalidBsDate { .. } => {
                ErrorKind::InvalidInput
            }
            Self::BoundaryNotFound { .. } => ErrorKind::BoundaryNotFound,
            Self::UndefinedLunarMonth { .. } => ErrorKind::RuleNotExecutable,
            Self::ExternalProviderFailure { .. } => ErrorKind::ExternalProviderFailure,
        }
    }
}
