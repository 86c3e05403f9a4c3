//! ESOP domain types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EsopError;
use super::service::EsopService;

/// How often an employee's yearly ESOP amount is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationType {
    /// Granted once, on the day the terms take effect.
    #[default]
    OneTime,
    /// Granted every twelve months.
    Annually,
    /// Granted every three months.
    Quarterly,
    /// Granted every month.
    Monthly,
}

impl AllocationType {
    /// Number of equal parts the allocation is split into.
    #[must_use]
    pub const fn periods(self) -> u32 {
        match self {
            Self::OneTime | Self::Annually => 1,
            Self::Quarterly => 4,
            Self::Monthly => 12,
        }
    }

    /// Months between two grants; `None` for one-time allocations.
    #[must_use]
    pub const fn months_between_grants(self) -> Option<u32> {
        match self {
            Self::OneTime => None,
            Self::Annually => Some(12),
            Self::Quarterly => Some(3),
            Self::Monthly => Some(1),
        }
    }

    /// Whether the allocation repeats and so shows up as monthly expense.
    #[must_use]
    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::OneTime)
    }

    /// Database string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Annually => "annually",
            Self::Quarterly => "quarterly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for AllocationType {
    type Err = EsopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "one_time" | "onetime" => Ok(Self::OneTime),
            "annually" | "annual" | "yearly" => Ok(Self::Annually),
            "quarterly" => Ok(Self::Quarterly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(EsopError::UnknownAllocationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for AllocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ESOP terms attached to an employee or an increment.
///
/// The per-allocation amount and the share count are derived; build terms
/// through [`EsopTerms::new`] so they never go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EsopTerms {
    /// Total ESOP value per allocation cycle (per year for recurring types).
    pub esop_allocation: Decimal,
    /// Grant cadence.
    pub allocation_type: AllocationType,
    /// Value granted per period.
    pub esop_per_allocation: Decimal,
    /// Price per share captured when the terms were set.
    pub price_per_share: Decimal,
    /// `floor(esop_allocation / price_per_share)`.
    pub number_of_shares: Decimal,
}

impl EsopTerms {
    /// Derives terms from the three user-editable inputs.
    #[must_use]
    pub fn new(
        esop_allocation: Decimal,
        allocation_type: AllocationType,
        price_per_share: Decimal,
    ) -> Self {
        Self {
            esop_allocation,
            allocation_type,
            esop_per_allocation: EsopService::per_period_amount(esop_allocation, allocation_type),
            price_per_share,
            number_of_shares: EsopService::shares_for(esop_allocation, price_per_share),
        }
    }

    /// Shares handed out on each grant date.
    #[must_use]
    pub fn shares_per_grant(&self) -> Decimal {
        EsopService::shares_for(self.esop_per_allocation, self.price_per_share)
    }

    /// Checks amounts before the terms are persisted.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAllocation` or `InvalidPricePerShare`.
    pub fn validate(&self) -> Result<(), EsopError> {
        if self.esop_allocation < Decimal::ZERO {
            return Err(EsopError::NegativeAllocation);
        }
        if self.esop_allocation > Decimal::ZERO && self.price_per_share <= Decimal::ZERO {
            return Err(EsopError::InvalidPricePerShare);
        }
        Ok(())
    }
}

/// Pool-level ESOP metrics shown next to the employee list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsopSummary {
    /// Current price per share from the cap table.
    pub price_per_share: Decimal,
    /// Shares reserved for the pool.
    pub reserved_shares: Decimal,
    /// Shares granted so far according to the ledgers.
    pub allocated_shares: Decimal,
    /// `reserved_shares x price_per_share`.
    pub reserved_value: Decimal,
    /// `allocated_shares x price_per_share`.
    pub allocated_value: Decimal,
    /// Reserve value still free, never below zero.
    pub remaining_value: Decimal,
    /// Allocated over reserved, in percent; `None` when nothing is reserved.
    pub utilization_percent: Option<Decimal>,
    /// Allocated value exceeds reserved value.
    pub is_over_allocated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periods() {
        assert_eq!(AllocationType::Monthly.periods(), 12);
        assert_eq!(AllocationType::Quarterly.periods(), 4);
        assert_eq!(AllocationType::Annually.periods(), 1);
        assert_eq!(AllocationType::OneTime.periods(), 1);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("one-time".parse::<AllocationType>(), Ok(AllocationType::OneTime));
        assert_eq!("One Time".parse::<AllocationType>(), Ok(AllocationType::OneTime));
        assert_eq!("Quarterly".parse::<AllocationType>(), Ok(AllocationType::Quarterly));
        assert_eq!("yearly".parse::<AllocationType>(), Ok(AllocationType::Annually));
        assert!("weekly".parse::<AllocationType>().is_err());
    }

    #[test]
    fn test_terms_derive_shares_and_period_amount() {
        let terms = EsopTerms::new(dec!(12000), AllocationType::Monthly, dec!(7));
        assert_eq!(terms.esop_per_allocation, dec!(1000));
        assert_eq!(terms.number_of_shares, dec!(1714));
        assert_eq!(terms.shares_per_grant(), dec!(142));
    }

    #[test]
    fn test_terms_recomputed_on_type_change() {
        let monthly = EsopTerms::new(dec!(12000), AllocationType::Monthly, dec!(10));
        let quarterly = EsopTerms::new(
            monthly.esop_allocation,
            AllocationType::Quarterly,
            monthly.price_per_share,
        );
        assert_eq!(quarterly.esop_per_allocation, dec!(3000));
        assert_eq!(quarterly.number_of_shares, dec!(1200));
    }

    #[test]
    fn test_terms_validation() {
        assert!(EsopTerms::new(dec!(0), AllocationType::OneTime, dec!(0)).validate().is_ok());
        assert_eq!(
            EsopTerms::new(dec!(100), AllocationType::OneTime, dec!(0)).validate(),
            Err(EsopError::InvalidPricePerShare)
        );
        assert_eq!(
            EsopTerms::new(dec!(-1), AllocationType::OneTime, dec!(1)).validate(),
            Err(EsopError::NegativeAllocation)
        );
    }
}
