//! ESOP error types.

use rust_decimal::Decimal;
use thiserror::Error;

use runway_shared::AppError;

/// ESOP rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EsopError {
    /// The startup has no shares set aside for the pool.
    #[error("No ESOP shares are reserved; set the reserve on the cap table before allocating")]
    NoReservedShares,

    /// The allocation would push the pool past its reserve.
    #[error(
        "ESOP allocation exceeds the reserve: allocated {allocated} + proposed {proposed} > reserved {reserved}"
    )]
    ExceedsReserve {
        /// Monetary value of the reserve.
        reserved: Decimal,
        /// Value already allocated.
        allocated: Decimal,
        /// Value of the rejected allocation.
        proposed: Decimal,
    },

    /// Allocation amounts cannot be negative.
    #[error("ESOP allocation cannot be negative")]
    NegativeAllocation,

    /// A positive allocation needs a positive share price.
    #[error("Price per share must be positive to allocate ESOP")]
    InvalidPricePerShare,

    /// Unrecognized allocation type label.
    #[error("Unknown allocation type: {0}")]
    UnknownAllocationType(String),
}

impl EsopError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoReservedShares => "NO_RESERVED_SHARES",
            Self::ExceedsReserve { .. } => "ESOP_EXCEEDS_RESERVE",
            Self::NegativeAllocation => "NEGATIVE_ALLOCATION",
            Self::InvalidPricePerShare => "INVALID_PRICE_PER_SHARE",
            Self::UnknownAllocationType(_) => "UNKNOWN_ALLOCATION_TYPE",
        }
    }
}

impl From<EsopError> for AppError {
    fn from(err: EsopError) -> Self {
        match err {
            EsopError::NoReservedShares | EsopError::ExceedsReserve { .. } => {
                Self::BusinessRule(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}
