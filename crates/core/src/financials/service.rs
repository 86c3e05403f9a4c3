//! Aggregations over financial records and the funding reconciliation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::types::{
    EntityTotal, FinancialOverview, FinancialRecord, FundingBasis, FundingSummary, MonthlyBucket,
    RecordType, VerticalTotal, YearFilter, YearTotal,
};
use crate::cap_table::{Investment, total_invested};
use crate::period::{MONTH_LABELS, month_index};

const UNSPECIFIED_ENTITY: &str = "Unspecified";

/// Financial aggregation service.
pub struct FinancialService;

impl FinancialService {
    /// Twelve buckets, `Jan`..`Dec`, for `year`, split by record type.
    #[must_use]
    pub fn monthly_buckets(records: &[FinancialRecord], year: i32) -> Vec<MonthlyBucket> {
        let mut buckets: Vec<MonthlyBucket> = MONTH_LABELS
            .iter()
            .map(|label| MonthlyBucket {
                month: (*label).to_string(),
                revenue: Decimal::ZERO,
                expense: Decimal::ZERO,
            })
            .collect();

        for record in records.iter().filter(|r| r.year() == year) {
            let bucket = &mut buckets[month_index(record.record_date)];
            match record.record_type() {
                RecordType::Revenue => bucket.revenue += record.amount,
                RecordType::Expense => bucket.expense += record.amount,
            }
        }
        buckets
    }

    /// Totals per vertical for one record type in `year`, largest first and
    /// ties broken by name.
    #[must_use]
    pub fn vertical_totals(
        records: &[FinancialRecord],
        record_type: RecordType,
        year: i32,
    ) -> Vec<VerticalTotal> {
        let mut sums: HashMap<&str, Decimal> = HashMap::new();
        for record in records
            .iter()
            .filter(|r| r.year() == year && r.record_type() == record_type)
        {
            *sums.entry(record.vertical.trim()).or_default() += record.amount;
        }

        let mut totals: Vec<VerticalTotal> = sums
            .into_iter()
            .map(|(vertical, amount)| VerticalTotal {
                vertical: vertical.to_string(),
                amount,
            })
            .collect();
        totals.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.vertical.cmp(&b.vertical)));
        totals
    }

    /// Revenue and expense per entity in `year`, sorted by entity name.
    #[must_use]
    pub fn entity_totals(records: &[FinancialRecord], year: i32) -> Vec<EntityTotal> {
        let mut sums: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
        for record in records.iter().filter(|r| r.year() == year) {
            let entity = record
                .entity
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .unwrap_or(UNSPECIFIED_ENTITY);
            let slot = sums.entry(entity).or_default();
            match record.record_type() {
                RecordType::Revenue => slot.0 += record.amount,
                RecordType::Expense => slot.1 += record.amount,
            }
        }

        sums.into_iter()
            .map(|(entity, (revenue, expense))| EntityTotal {
                entity: entity.to_string(),
                revenue,
                expense,
            })
            .collect()
    }

    /// Totals for every year that has records, oldest first.
    #[must_use]
    pub fn yearly_totals(records: &[FinancialRecord]) -> Vec<YearTotal> {
        let mut years: BTreeMap<i32, YearTotal> = BTreeMap::new();
        for record in records {
            let year = record.year();
            let total = years.entry(year).or_insert_with(|| YearTotal {
                year,
                revenue: Decimal::ZERO,
                expense: Decimal::ZERO,
                gross_profit: Decimal::ZERO,
                net: Decimal::ZERO,
            });
            match record.gross_profit() {
                Some(profit) => {
                    total.revenue += record.amount;
                    total.gross_profit += profit;
                }
                None => total.expense += record.amount,
            }
        }

        years
            .into_values()
            .map(|mut total| {
                total.net = total.revenue - total.expense;
                total
            })
            .collect()
    }

    /// Years present in the records plus the current year, newest first.
    #[must_use]
    pub fn available_years(records: &[FinancialRecord], today: NaiveDate) -> Vec<i32> {
        let mut years: BTreeSet<i32> = records.iter().map(FinancialRecord::year).collect();
        years.insert(today.year());
        years.into_iter().rev().collect()
    }

    /// Total funding minus expenses to date.
    ///
    /// Funding is the sum of investment records, falling back to the stored
    /// total when no investments exist. Future-dated expenses are excluded.
    #[must_use]
    pub fn funding_summary(
        investments: &[Investment],
        stored_total: Option<Decimal>,
        records: &[FinancialRecord],
        today: NaiveDate,
    ) -> FundingSummary {
        let (total_funding, basis) = if !investments.is_empty() {
            (total_invested(investments), FundingBasis::Investments)
        } else if let Some(stored) = stored_total {
            (stored, FundingBasis::StoredTotal)
        } else {
            (Decimal::ZERO, FundingBasis::Unrecorded)
        };

        let total_expenses_to_date: Decimal = records
            .iter()
            .filter(|r| r.record_type() == RecordType::Expense && r.record_date <= today)
            .map(|r| r.amount)
            .sum();

        FundingSummary {
            total_funding,
            basis,
            total_expenses_to_date,
            total_available_fund: total_funding - total_expenses_to_date,
        }
    }

    /// Builds the whole financials view for a year selection.
    #[must_use]
    pub fn overview(
        records: &[FinancialRecord],
        investments: &[Investment],
        stored_total: Option<Decimal>,
        filter: YearFilter,
        today: NaiveDate,
    ) -> FinancialOverview {
        let year = filter.resolve(today);
        FinancialOverview {
            year,
            available_years: Self::available_years(records, today),
            monthly: Self::monthly_buckets(records, year),
            expense_verticals: Self::vertical_totals(records, RecordType::Expense, year),
            revenue_verticals: Self::vertical_totals(records, RecordType::Revenue, year),
            entities: Self::entity_totals(records, year),
            yearly: Self::yearly_totals(records),
            funding: Self::funding_summary(investments, stored_total, records, today),
        }
    }
}
