//! Financial record error types.

use rust_decimal::Decimal;
use thiserror::Error;

use runway_shared::AppError;

/// Financial record validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinancialError {
    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// COGS cannot be negative.
    #[error("Cost of goods sold cannot be negative, got {0}")]
    NegativeCogs(Decimal),

    /// Every record belongs to a vertical.
    #[error("Vertical is required")]
    MissingVertical,

    /// Unrecognized record type label.
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    /// Year filter is neither `all` nor a year.
    #[error("Invalid year filter: {0}")]
    InvalidYearFilter(String),
}

impl FinancialError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::NegativeCogs(_) => "NEGATIVE_COGS",
            Self::MissingVertical => "MISSING_VERTICAL",
            Self::UnknownRecordType(_) => "UNKNOWN_RECORD_TYPE",
            Self::InvalidYearFilter(_) => "INVALID_YEAR_FILTER",
        }
    }
}

impl From<FinancialError> for AppError {
    fn from(err: FinancialError) -> Self {
        Self::Validation(err.to_string())
    }
}
