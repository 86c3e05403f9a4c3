//! Tests for financial aggregation.

use chrono::NaiveDate;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::FinancialError;
use super::service::FinancialService;
use super::types::{FinancialRecord, FundingBasis, RecordDetails, RecordType, YearFilter};
use crate::cap_table::Investment;
use runway_shared::types::{FinancialRecordId, InvestmentId, StartupId};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn expense(date: NaiveDate, vertical: &str, amount: Decimal) -> FinancialRecord {
    FinancialRecord {
        id: FinancialRecordId::new(),
        startup_id: StartupId::new(),
        record_date: date,
        entity: Some("HoldCo".to_string()),
        vertical: vertical.to_string(),
        amount,
        description: None,
        details: RecordDetails::Expense {
            funding_source: Some("equity".to_string()),
            attachment_key: None,
        },
    }
}

fn revenue(date: NaiveDate, vertical: &str, amount: Decimal, cogs: Decimal) -> FinancialRecord {
    FinancialRecord {
        details: RecordDetails::Revenue { cogs },
        entity: Some("OpCo".to_string()),
        ..expense(date, vertical, amount)
    }
}

fn investment(amount: Decimal) -> Investment {
    Investment {
        id: InvestmentId::new(),
        startup_id: StartupId::new(),
        investor_name: "Fund I".to_string(),
        round: None,
        amount,
        invested_on: d(2023, 1, 1),
        shares_issued: None,
    }
}

#[test]
fn test_march_records_land_in_march_only() {
    let records = vec![
        expense(d(2024, 3, 1), "Ops", dec!(100)),
        expense(d(2024, 3, 31), "Ops", dec!(50)),
        revenue(d(2024, 3, 15), "SaaS", dec!(400), dec!(0)),
        expense(d(2023, 3, 10), "Ops", dec!(999)),
    ];

    let buckets = FinancialService::monthly_buckets(&records, 2024);
    assert_eq!(buckets.len(), 12);
    assert_eq!(buckets[2].month, "Mar");
    assert_eq!(buckets[2].expense, dec!(150));
    assert_eq!(buckets[2].revenue, dec!(400));

    for (i, bucket) in buckets.iter().enumerate() {
        if i != 2 {
            assert!(bucket.expense.is_zero() && bucket.revenue.is_zero(), "{}", bucket.month);
        }
    }
}

#[test]
fn test_vertical_totals_sorted_desc_with_name_ties() {
    let records = vec![
        expense(d(2024, 1, 5), "Marketing", dec!(300)),
        expense(d(2024, 2, 5), "Payroll", dec!(500)),
        expense(d(2024, 3, 5), "Legal", dec!(300)),
        expense(d(2024, 4, 5), "Marketing", dec!(200)),
        revenue(d(2024, 4, 5), "SaaS", dec!(900), dec!(100)),
    ];

    let totals = FinancialService::vertical_totals(&records, RecordType::Expense, 2024);
    let pairs: Vec<_> = totals.iter().map(|t| (t.vertical.as_str(), t.amount)).collect();
    assert_eq!(
        pairs,
        vec![("Marketing", dec!(500)), ("Payroll", dec!(500)), ("Legal", dec!(300))]
    );

    let revenue_totals = FinancialService::vertical_totals(&records, RecordType::Revenue, 2024);
    assert_eq!(revenue_totals.len(), 1);
    assert_eq!(revenue_totals[0].amount, dec!(900));
}

#[test]
fn test_entity_totals() {
    let mut unassigned = expense(d(2024, 6, 1), "Ops", dec!(10));
    unassigned.entity = None;
    let records = vec![
        expense(d(2024, 1, 1), "Ops", dec!(100)),
        revenue(d(2024, 1, 1), "SaaS", dec!(250), dec!(50)),
        unassigned,
    ];

    let totals = FinancialService::entity_totals(&records, 2024);
    let names: Vec<_> = totals.iter().map(|t| t.entity.as_str()).collect();
    assert_eq!(names, vec!["HoldCo", "OpCo", "Unspecified"]);
    assert_eq!(totals[0].expense, dec!(100));
    assert_eq!(totals[1].revenue, dec!(250));
}

#[test]
fn test_yearly_totals_and_gross_profit() {
    let records = vec![
        revenue(d(2023, 5, 1), "SaaS", dec!(1000), dec!(400)),
        expense(d(2023, 6, 1), "Ops", dec!(300)),
        revenue(d(2024, 1, 1), "SaaS", dec!(500), dec!(0)),
    ];

    let years = FinancialService::yearly_totals(&records);
    assert_eq!(years.len(), 2);
    assert_eq!(years[0].year, 2023);
    assert_eq!(years[0].gross_profit, dec!(600));
    assert_eq!(years[0].net, dec!(700));
    assert_eq!(years[1].expense, dec!(0));
    assert_eq!(records[0].gross_profit(), Some(dec!(600)));
    assert_eq!(records[1].gross_profit(), None);
}

#[test]
fn test_available_years_include_current() {
    let records = vec![
        expense(d(2021, 1, 1), "Ops", dec!(1)),
        expense(d(2023, 1, 1), "Ops", dec!(1)),
        expense(d(2023, 2, 1), "Ops", dec!(1)),
    ];
    assert_eq!(
        FinancialService::available_years(&records, d(2025, 7, 1)),
        vec![2025, 2023, 2021]
    );
    assert_eq!(FinancialService::available_years(&[], d(2025, 7, 1)), vec![2025]);
}

#[rstest]
#[case("all", YearFilter::All)]
#[case("", YearFilter::All)]
#[case("ALL", YearFilter::All)]
#[case("2023", YearFilter::Year(2023))]
fn test_year_filter_parse(#[case] input: &str, #[case] expected: YearFilter) {
    assert_eq!(input.parse::<YearFilter>(), Ok(expected));
}

#[test]
fn test_year_filter_all_resolves_to_current_year() {
    assert_eq!(YearFilter::All.resolve(d(2025, 3, 3)), 2025);
    assert_eq!(YearFilter::Year(2022).resolve(d(2025, 3, 3)), 2022);
    assert!("twenty".parse::<YearFilter>().is_err());
}

#[test]
fn test_funding_from_investments() {
    let records = vec![
        expense(d(2024, 1, 1), "Ops", dec!(200)),
        expense(d(2024, 12, 1), "Ops", dec!(5000)),
        revenue(d(2024, 1, 1), "SaaS", dec!(10000), dec!(0)),
    ];
    let investments = vec![investment(dec!(1000)), investment(dec!(500))];

    let summary =
        FinancialService::funding_summary(&investments, Some(dec!(99999)), &records, d(2024, 6, 1));
    assert_eq!(summary.basis, FundingBasis::Investments);
    assert_eq!(summary.total_funding, dec!(1500));
    // The December expense is still in the future.
    assert_eq!(summary.total_expenses_to_date, dec!(200));
    assert_eq!(summary.total_available_fund, dec!(1300));
}

#[test]
fn test_funding_falls_back_to_stored_total() {
    let records = vec![expense(d(2024, 1, 1), "Ops", dec!(200))];

    let stored = FinancialService::funding_summary(&[], Some(dec!(1000)), &records, d(2024, 6, 1));
    assert_eq!(stored.basis, FundingBasis::StoredTotal);
    assert_eq!(stored.total_available_fund, dec!(800));

    let none = FinancialService::funding_summary(&[], None, &records, d(2024, 6, 1));
    assert_eq!(none.basis, FundingBasis::Unrecorded);
    assert_eq!(none.total_available_fund, dec!(-200));
}

#[test]
fn test_overview_uses_resolved_year() {
    let records = vec![
        expense(d(2023, 3, 1), "Ops", dec!(100)),
        expense(d(2025, 3, 1), "Ops", dec!(40)),
    ];
    let overview =
        FinancialService::overview(&records, &[], None, YearFilter::All, d(2025, 6, 1));

    assert_eq!(overview.year, 2025);
    assert_eq!(overview.available_years, vec![2025, 2023]);
    assert_eq!(overview.monthly[2].expense, dec!(40));
    assert_eq!(overview.yearly.len(), 2);
    assert_eq!(overview.funding.total_expenses_to_date, dec!(140));
}

#[test]
fn test_record_validation() {
    assert!(expense(d(2024, 1, 1), "Ops", dec!(1)).validate().is_ok());
    assert_eq!(
        expense(d(2024, 1, 1), "Ops", dec!(0)).validate(),
        Err(FinancialError::NonPositiveAmount(dec!(0)))
    );
    assert_eq!(
        expense(d(2024, 1, 1), "  ", dec!(5)).validate(),
        Err(FinancialError::MissingVertical)
    );
    assert_eq!(
        revenue(d(2024, 1, 1), "SaaS", dec!(5), dec!(-1)).validate(),
        Err(FinancialError::NegativeCogs(dec!(-1)))
    );
}

#[test]
fn test_record_type_parse() {
    assert_eq!("Revenue".parse::<RecordType>(), Ok(RecordType::Revenue));
    assert!("income".parse::<RecordType>().is_err());
}
