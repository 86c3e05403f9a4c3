//! Ledger error types.

use chrono::NaiveDate;
use thiserror::Error;

use runway_shared::AppError;

/// Ledger generation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Unrecognized cadence label.
    #[error("Unknown ledger cadence: {0}")]
    UnknownCadence(String),

    /// Date arithmetic left the supported calendar range.
    #[error("Date out of range while generating ledger from {0}")]
    DateOverflow(NaiveDate),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCadence(_) => "UNKNOWN_CADENCE",
            Self::DateOverflow(_) => "DATE_OVERFLOW",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UnknownCadence(_) => Self::Validation(err.to_string()),
            LedgerError::DateOverflow(_) => Self::Internal(err.to_string()),
        }
    }
}
