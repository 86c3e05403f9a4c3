//! Property-based tests for EsopService.
//!
//! - Allocation schedules always sum back to the total
//! - Over-allocation is flagged exactly when allocated value exceeds reserve
//! - The allocation guard only admits amounts that fit the remaining reserve

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::EsopError;
use super::service::EsopService;
use super::types::AllocationType;
use crate::cap_table::CapTable;

/// Strategy to generate money amounts (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate whole share counts.
fn shares() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(Decimal::from)
}

/// Strategy to generate positive share prices (0.01 to 1,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn allocation_type() -> impl Strategy<Value = AllocationType> {
    prop_oneof![
        Just(AllocationType::OneTime),
        Just(AllocationType::Annually),
        Just(AllocationType::Quarterly),
        Just(AllocationType::Monthly),
    ]
}

/// Cap table whose price per share is exactly `price`.
fn cap_table(reserved: Decimal, price: Decimal) -> CapTable {
    let total_shares = Decimal::from(1_000_000);
    CapTable {
        total_shares,
        esop_reserved_shares: reserved,
        valuation: total_shares * price,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_schedule_sums_to_total(total in amount(), kind in allocation_type()) {
        let schedule = EsopService::allocation_schedule(total, kind);
        prop_assert_eq!(schedule.len(), kind.periods() as usize);
        prop_assert_eq!(schedule.iter().copied().sum::<Decimal>(), total);

        // Every part but the last is the rounded per-period amount.
        let part = EsopService::per_period_amount(total, kind);
        for p in &schedule[..schedule.len() - 1] {
            prop_assert_eq!(*p, part);
        }
    }

    #[test]
    fn prop_shares_never_exceed_amount(total in amount(), pps in price()) {
        let n = EsopService::shares_for(total, pps);
        prop_assert!(n >= Decimal::ZERO);
        prop_assert_eq!(n, n.floor());
        prop_assert!(n * pps <= total);
        prop_assert!((n + Decimal::ONE) * pps > total);
    }

    #[test]
    fn prop_over_allocated_iff_allocated_exceeds_reserve(
        reserved in shares(),
        allocated in shares(),
        pps in price(),
    ) {
        let summary = EsopService::summarize(&cap_table(reserved, pps), allocated);
        prop_assert_eq!(summary.is_over_allocated, allocated > reserved);
        prop_assert!(summary.remaining_value >= Decimal::ZERO);
    }

    #[test]
    fn prop_guard_admits_only_what_fits(
        reserved in shares(),
        allocated in shares(),
        pps in price(),
        proposed in amount(),
    ) {
        let summary = EsopService::summarize(&cap_table(reserved, pps), allocated);
        let result = EsopService::check_allocation(&summary, proposed);

        if proposed.is_zero() {
            prop_assert!(result.is_ok());
        } else if reserved.is_zero() {
            prop_assert_eq!(result, Err(EsopError::NoReservedShares));
        } else if summary.allocated_value + proposed > summary.reserved_value {
            let is_exceeds = matches!(result, Err(EsopError::ExceedsReserve { .. }));
            prop_assert!(is_exceeds);
        } else {
            prop_assert!(result.is_ok());
        }
    }
}
