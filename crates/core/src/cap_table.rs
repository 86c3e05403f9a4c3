//! Cap table: share counts, valuation and the investments that fund the company.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use runway_shared::AppError;
use runway_shared::types::{InvestmentId, StartupId};

/// Cap table validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapTableError {
    /// Share counts cannot be negative.
    #[error("Share counts cannot be negative")]
    NegativeShares,

    /// The ESOP reserve is carved out of the total.
    #[error("ESOP reserved shares ({reserved}) exceed total shares ({total})")]
    ReserveExceedsTotal {
        /// Reserved shares.
        reserved: Decimal,
        /// Total shares.
        total: Decimal,
    },

    /// Valuation cannot be negative.
    #[error("Valuation cannot be negative")]
    NegativeValuation,

    /// Investment amount must be positive.
    #[error("Investment amount must be positive")]
    NonPositiveInvestment,

    /// Investor name is required.
    #[error("Investor name is required")]
    MissingInvestor,

    /// A figure is too large to store.
    #[error("{0} is too large")]
    OutOfRange(&'static str),
}

impl From<CapTableError> for AppError {
    fn from(err: CapTableError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Bound on stored share counts (`NUMERIC(20, 0)`).
const SHARE_LIMIT: i128 = 100_000_000_000_000_000_000;
/// Bound on stored money amounts (`NUMERIC(20, 2)`).
const AMOUNT_LIMIT: i128 = 1_000_000_000_000_000_000;

/// Share structure of a startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapTable {
    /// Fully diluted share count.
    pub total_shares: Decimal,
    /// Shares set aside for the employee option pool.
    pub esop_reserved_shares: Decimal,
    /// Company valuation in the startup's currency.
    pub valuation: Decimal,
}

impl CapTable {
    /// Valuation divided by total shares; zero when there are no shares.
    #[must_use]
    pub fn price_per_share(&self) -> Decimal {
        if self.total_shares <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            self.valuation / self.total_shares
        }
    }

    /// Checks share counts and valuation.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), CapTableError> {
        if self.total_shares < Decimal::ZERO || self.esop_reserved_shares < Decimal::ZERO {
            return Err(CapTableError::NegativeShares);
        }
        if self.esop_reserved_shares > self.total_shares {
            return Err(CapTableError::ReserveExceedsTotal {
                reserved: self.esop_reserved_shares,
                total: self.total_shares,
            });
        }
        if self.valuation < Decimal::ZERO {
            return Err(CapTableError::NegativeValuation);
        }
        if self.total_shares >= Decimal::from_i128_with_scale(SHARE_LIMIT, 0) {
            return Err(CapTableError::OutOfRange("Total shares"));
        }
        if self.valuation >= Decimal::from_i128_with_scale(AMOUNT_LIMIT, 0) {
            return Err(CapTableError::OutOfRange("Valuation"));
        }
        Ok(())
    }
}

/// A funding event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    /// Investment ID.
    pub id: InvestmentId,
    /// Startup that received the money.
    pub startup_id: StartupId,
    /// Investor name.
    pub investor_name: String,
    /// Round label (seed, series A, ...).
    pub round: Option<String>,
    /// Amount invested.
    pub amount: Decimal,
    /// Date the money arrived.
    pub invested_on: NaiveDate,
    /// Shares issued in exchange, when known.
    pub shares_issued: Option<Decimal>,
}

impl Investment {
    /// Checks the amount and investor.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), CapTableError> {
        if self.investor_name.trim().is_empty() {
            return Err(CapTableError::MissingInvestor);
        }
        if self.amount <= Decimal::ZERO {
            return Err(CapTableError::NonPositiveInvestment);
        }
        if self.shares_issued.is_some_and(|s| s < Decimal::ZERO) {
            return Err(CapTableError::NegativeShares);
        }
        Ok(())
    }
}

/// Sum of all investment amounts.
#[must_use]
pub fn total_invested(investments: &[Investment]) -> Decimal {
    investments.iter().map(|i| i.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cap(total: Decimal, reserved: Decimal, valuation: Decimal) -> CapTable {
        CapTable {
            total_shares: total,
            esop_reserved_shares: reserved,
            valuation,
        }
    }

    fn investment(amount: Decimal) -> Investment {
        Investment {
            id: InvestmentId::new(),
            startup_id: StartupId::new(),
            investor_name: "Angel".to_string(),
            round: Some("seed".to_string()),
            amount,
            invested_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            shares_issued: None,
        }
    }

    #[test]
    fn test_price_per_share() {
        assert_eq!(cap(dec!(100000), dec!(10000), dec!(1000000)).price_per_share(), dec!(10));
        assert_eq!(cap(dec!(0), dec!(0), dec!(1000000)).price_per_share(), Decimal::ZERO);
    }

    #[test]
    fn test_reserve_cannot_exceed_total() {
        let err = cap(dec!(100), dec!(101), dec!(0)).validate().unwrap_err();
        assert!(matches!(err, CapTableError::ReserveExceedsTotal { .. }));
        assert!(cap(dec!(100), dec!(100), dec!(0)).validate().is_ok());
    }

    #[test]
    fn test_negative_values_rejected() {
        assert_eq!(
            cap(dec!(-1), dec!(0), dec!(0)).validate(),
            Err(CapTableError::NegativeShares)
        );
        assert_eq!(
            cap(dec!(10), dec!(0), dec!(-5)).validate(),
            Err(CapTableError::NegativeValuation)
        );
    }

    #[test]
    fn test_oversized_figures_rejected() {
        assert_eq!(
            cap(Decimal::MAX, dec!(0), dec!(0)).validate(),
            Err(CapTableError::OutOfRange("Total shares"))
        );
        assert_eq!(
            cap(dec!(10), dec!(0), dec!(1000000000000000000)).validate(),
            Err(CapTableError::OutOfRange("Valuation"))
        );
        assert!(cap(dec!(99999999999999999999), dec!(0), dec!(999999999999999999.99))
            .validate()
            .is_ok());
    }

    #[test]
    fn test_investment_validation() {
        assert!(investment(dec!(500)).validate().is_ok());
        assert_eq!(
            investment(dec!(0)).validate(),
            Err(CapTableError::NonPositiveInvestment)
        );

        let mut anonymous = investment(dec!(10));
        anonymous.investor_name = "  ".to_string();
        assert_eq!(anonymous.validate(), Err(CapTableError::MissingInvestor));
    }

    #[test]
    fn test_total_invested() {
        let all = vec![investment(dec!(250000)), investment(dec!(750000.50))];
        assert_eq!(total_invested(&all), dec!(1000000.50));
        assert_eq!(total_invested(&[]), Decimal::ZERO);
    }
}
