//! ESOP service: valuation, share derivation and the allocation guard.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::EsopError;
use super::types::{AllocationType, EsopSummary, EsopTerms};
use crate::cap_table::CapTable;

/// ESOP service for pool valuation and allocation checks.
///
/// Pure business logic; callers pass in the cap table and ledger totals.
pub struct EsopService;

impl EsopService {
    /// Number of whole shares an amount buys: `floor(amount / price_per_share)`.
    ///
    /// Zero when either side is not positive.
    #[must_use]
    pub fn shares_for(amount: Decimal, price_per_share: Decimal) -> Decimal {
        if amount <= Decimal::ZERO || price_per_share <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        amount
            .checked_div(price_per_share)
            .map_or(Decimal::MAX, |shares| shares.floor())
    }

    /// Amount granted per period, rounded to cents with Banker's Rounding.
    #[must_use]
    pub fn per_period_amount(total: Decimal, allocation_type: AllocationType) -> Decimal {
        (total / Decimal::from(allocation_type.periods()))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Splits a total into its grant periods.
    ///
    /// Every period gets the rounded per-period amount except the last, which
    /// absorbs the rounding remainder so the parts always sum to the total.
    #[must_use]
    pub fn allocation_schedule(total: Decimal, allocation_type: AllocationType) -> Vec<Decimal> {
        let periods = allocation_type.periods() as usize;
        let part = Self::per_period_amount(total, allocation_type);
        let mut schedule = vec![part; periods];
        let head: Decimal = schedule[..periods - 1].iter().copied().sum();
        schedule[periods - 1] = total - head;
        schedule
    }

    /// Recurring monthly ESOP expense implied by a set of terms.
    ///
    /// One-time allocations are not a recurring cost and contribute zero.
    #[must_use]
    pub fn monthly_expense(terms: &EsopTerms) -> Decimal {
        match terms.allocation_type.months_between_grants() {
            None => Decimal::ZERO,
            Some(months) => (terms.esop_per_allocation / Decimal::from(months))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        }
    }

    /// Monetary value of the reserve.
    #[must_use]
    pub fn reserved_value(cap_table: &CapTable) -> Decimal {
        cap_table
            .esop_reserved_shares
            .saturating_mul(cap_table.price_per_share())
    }

    /// Monetary value of the shares granted so far.
    #[must_use]
    pub fn allocated_value(allocated_shares: Decimal, price_per_share: Decimal) -> Decimal {
        allocated_shares.saturating_mul(price_per_share)
    }

    /// True exactly when the allocated value exceeds the reserved value at a
    /// meaningful price.
    #[must_use]
    pub fn is_over_allocated(
        allocated_value: Decimal,
        reserved_value: Decimal,
        price_per_share: Decimal,
    ) -> bool {
        price_per_share > Decimal::ZERO && allocated_value > reserved_value
    }

    /// Builds the pool metrics for a startup.
    #[must_use]
    pub fn summarize(cap_table: &CapTable, allocated_shares: Decimal) -> EsopSummary {
        let price_per_share = cap_table.price_per_share();
        let reserved_value = Self::reserved_value(cap_table);
        let allocated_value = Self::allocated_value(allocated_shares, price_per_share);

        let utilization_percent = if reserved_value > Decimal::ZERO {
            allocated_value
                .checked_div(reserved_value)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|percent| percent.round_dp(2))
        } else {
            None
        };

        EsopSummary {
            price_per_share,
            reserved_shares: cap_table.esop_reserved_shares,
            allocated_shares,
            reserved_value,
            allocated_value,
            remaining_value: reserved_value
                .saturating_sub(allocated_value)
                .max(Decimal::ZERO),
            utilization_percent,
            is_over_allocated: Self::is_over_allocated(
                allocated_value,
                reserved_value,
                price_per_share,
            ),
        }
    }

    /// Allocation guard, run before any employee or increment is persisted.
    ///
    /// # Errors
    ///
    /// Returns `NoReservedShares` when a positive amount is proposed against an
    /// empty reserve, and `ExceedsReserve` when
    /// `allocated_value + proposed > reserved_value` or the sum does not fit
    /// in a decimal.
    pub fn check_allocation(summary: &EsopSummary, proposed: Decimal) -> Result<(), EsopError> {
        if proposed < Decimal::ZERO {
            return Err(EsopError::NegativeAllocation);
        }
        if proposed.is_zero() {
            return Ok(());
        }
        if summary.reserved_shares <= Decimal::ZERO {
            return Err(EsopError::NoReservedShares);
        }
        let exceeds = summary
            .allocated_value
            .checked_add(proposed)
            .is_none_or(|total| total > summary.reserved_value);
        if exceeds {
            return Err(EsopError::ExceedsReserve {
                reserved: summary.reserved_value,
                allocated: summary.allocated_value,
                proposed,
            });
        }
        Ok(())
    }

    /// Allocation guard for a write that replaces one employee's ledger.
    ///
    /// `summary` must leave that employee's stored grants out, and
    /// `ledger_shares` is the share total of the ledger the write produces.
    /// Whichever is larger of the entered amount and the value of those
    /// shares at today's price is checked against the rest of the pool, so a
    /// backdated hire is charged for every grant it books up to today.
    ///
    /// # Errors
    ///
    /// Same as [`Self::check_allocation`].
    pub fn check_replacement(
        summary: &EsopSummary,
        proposed: Decimal,
        ledger_shares: Decimal,
    ) -> Result<(), EsopError> {
        if proposed < Decimal::ZERO {
            return Err(EsopError::NegativeAllocation);
        }
        let ledger_value = Self::allocated_value(ledger_shares, summary.price_per_share);
        Self::check_allocation(summary, proposed.max(ledger_value))
    }
}
