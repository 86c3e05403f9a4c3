//! Ledger types.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use runway_shared::types::EmployeeId;

use super::error::LedgerError;
use crate::esop::EsopTerms;

/// Spacing of ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCadence {
    /// One entry per calendar day.
    Daily,
    /// One entry per month, on the joining day-of-month.
    #[default]
    Monthly,
}

impl FromStr for LedgerCadence {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            _ => Err(LedgerError::UnknownCadence(s.to_string())),
        }
    }
}

impl std::fmt::Display for LedgerCadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// One ledger row. Unique per `(employee_id, entry_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Start of the period this entry covers.
    pub entry_date: NaiveDate,
    /// Annual salary in force on `entry_date`.
    pub salary: Decimal,
    /// ESOP terms in force on `entry_date`.
    #[serde(flatten)]
    pub terms: EsopTerms,
    /// Shares granted within this entry's period.
    pub shares_granted: Decimal,
    /// Shares granted up to and including this period.
    pub cumulative_shares: Decimal,
}

/// What separates a stored ledger from a freshly generated one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDiff {
    /// Generated entries with no stored row on that date.
    pub missing: Vec<LedgerEntry>,
    /// Generated entries whose stored row holds different values.
    pub changed: Vec<LedgerEntry>,
    /// Stored dates the generator no longer produces.
    pub orphaned: Vec<NaiveDate>,
}

impl LedgerDiff {
    /// Stored ledger already matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.changed.is_empty() && self.orphaned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_parse() {
        assert_eq!("Monthly".parse::<LedgerCadence>(), Ok(LedgerCadence::Monthly));
        assert_eq!(" daily ".parse::<LedgerCadence>(), Ok(LedgerCadence::Daily));
        assert!(matches!(
            "weekly".parse::<LedgerCadence>(),
            Err(LedgerError::UnknownCadence(_))
        ));
        assert_eq!(LedgerCadence::default(), LedgerCadence::Monthly);
    }
}
