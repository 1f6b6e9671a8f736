use parva_types::{ErrorKind, ParvaError};
use thiserror::Error;

/// Outcome of a rule that did not produce a date.
///
/// `NotExecutable` and `NoOccurrenceInYear` are expected answers; a
/// `Calculation` error means the call itself failed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleExecutionError {
    #[error("Unknown festival '{0}'")]
    UnknownFestival(String),

    #[error("Festival '{festival_id}' is not executable: {reason}")]
    NotExecutable { festival_id: String, reason: String },

    #[error("Festival '{festival_id}' has no occurrence in {year}")]
    NoOccurrenceInYear { festival_id: String, year: i32 },

    #[error(transparent)]
    Calculation(#[from] ParvaError),
}

impl RuleExecutionError {
    pub fn not_executable(festival_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotExecutable { festival_id: festival_id.into(), reason: reason.into() }
    }

    pub fn no_occurrence(festival_id: impl Into<String>, year: i32) -> Self {
        Self::NoOccurrenceInYear { festival_id: festival_id.into(), year }
    }

    /// True for the expected, recoverable outcomes.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NotExecutable { .. } | Self::NoOccurrenceInYear { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFestival(_) => ErrorKind::InvalidInput,
            Self::NotExecutable { .. } => ErrorKind::RuleNotExecutable,
            Self::NoOccurrenceInYear { .. } => ErrorKind::NoOccurrenceInYear,
            Self::Calculation(e) => e.kind(),
        }
    }
}
