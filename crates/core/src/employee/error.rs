//! Employee error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use runway_shared::AppError;

use crate::esop::EsopError;

/// Employee rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmployeeError {
    /// Name is required.
    #[error("Employee name is required")]
    MissingName,

    /// Salary cannot be negative.
    #[error("Salary cannot be negative: {0}")]
    NegativeSalary(Decimal),

    /// Nobody can join before the company existed.
    #[error("Joining date {joining} is before the company registration date {registered}")]
    JoiningBeforeRegistration {
        /// Requested joining date.
        joining: NaiveDate,
        /// Company registration date.
        registered: NaiveDate,
    },

    /// Increments start on or after the joining date.
    #[error("Increment date {effective} is before the joining date {joining}")]
    IncrementBeforeJoining {
        /// Requested effective date.
        effective: NaiveDate,
        /// Joining date.
        joining: NaiveDate,
    },

    /// Increments cannot be scheduled ahead.
    #[error("Increment date {effective} is in the future (today is {today})")]
    IncrementInFuture {
        /// Requested effective date.
        effective: NaiveDate,
        /// Current date.
        today: NaiveDate,
    },

    /// No increments after the employee left.
    #[error("Increment date {effective} is after the termination date {terminated}")]
    IncrementAfterTermination {
        /// Requested effective date.
        effective: NaiveDate,
        /// Termination date.
        terminated: NaiveDate,
    },

    /// Termination cannot precede joining.
    #[error("Termination date {termination} is before the joining date {joining}")]
    TerminationBeforeJoining {
        /// Requested termination date.
        termination: NaiveDate,
        /// Joining date.
        joining: NaiveDate,
    },

    /// Termination cannot precede the latest increment.
    #[error("Termination date {termination} is before the latest increment on {latest}")]
    TerminationBeforeLatestIncrement {
        /// Requested termination date.
        termination: NaiveDate,
        /// Latest increment date.
        latest: NaiveDate,
    },

    /// The employee already has a termination date.
    #[error("Employee is already terminated")]
    AlreadyTerminated,

    /// ESOP terms are invalid.
    #[error(transparent)]
    Esop(#[from] EsopError),
}

impl EmployeeError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingName => "MISSING_NAME",
            Self::NegativeSalary(_) => "NEGATIVE_SALARY",
            Self::JoiningBeforeRegistration { .. } => "JOINING_BEFORE_REGISTRATION",
            Self::IncrementBeforeJoining { .. } => "INCREMENT_BEFORE_JOINING",
            Self::IncrementInFuture { .. } => "INCREMENT_IN_FUTURE",
            Self::IncrementAfterTermination { .. } => "INCREMENT_AFTER_TERMINATION",
            Self::TerminationBeforeJoining { .. } => "TERMINATION_BEFORE_JOINING",
            Self::TerminationBeforeLatestIncrement { .. } => "TERMINATION_BEFORE_LATEST_INCREMENT",
            Self::AlreadyTerminated => "ALREADY_TERMINATED",
            Self::Esop(e) => e.error_code(),
        }
    }
}

impl From<EmployeeError> for AppError {
    fn from(err: EmployeeError) -> Self {
        match err {
            EmployeeError::Esop(e) => e.into(),
            EmployeeError::AlreadyTerminated => Self::Conflict(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
