//! Chart data for the employees view: monthly cost and department split.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::types::{EmployeeRecord, compensation_on};
use crate::esop::EsopService;
use crate::period::{MONTH_LABELS, month_bounds};

const UNASSIGNED: &str = "Unassigned";

/// Payroll cost of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCost {
    /// Month label, `Jan`..`Dec`.
    pub month: String,
    /// Sum of monthly salaries.
    pub salary: Decimal,
    /// Sum of recurring monthly ESOP expense.
    pub esop: Decimal,
    /// `salary + esop`.
    pub total: Decimal,
    /// Employees counted in the month.
    pub headcount: u32,
}

/// Headcount and current monthly cost of one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentBreakdown {
    /// Department name, `Unassigned` when blank.
    pub department: String,
    /// Active employees.
    pub headcount: u32,
    /// Monthly salary plus ESOP expense.
    pub monthly_cost: Decimal,
}

fn monthly_salary(annual: Decimal) -> Decimal {
    (annual / Decimal::from(12)).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Twelve monthly buckets for `year`.
///
/// An employee counts in a month when employed on any day of it; the values
/// used are those in force on the earlier of the month end and the
/// termination date.
#[must_use]
pub fn monthly_costs(records: &[EmployeeRecord], year: i32) -> Vec<MonthlyCost> {
    let timelines: Vec<_> = records.iter().map(|r| (r, r.timeline())).collect();

    (1..=12u32)
        .zip(MONTH_LABELS)
        .map(|(month, label)| {
            let mut bucket = MonthlyCost {
                month: label.to_string(),
                salary: Decimal::ZERO,
                esop: Decimal::ZERO,
                total: Decimal::ZERO,
                headcount: 0,
            };
            let Some((start, end)) = month_bounds(year, month) else {
                return bucket;
            };

            for (record, timeline) in &timelines {
                let reference = record.employee.last_day(end);
                if reference < start {
                    continue;
                }
                let Some(snapshot) = compensation_on(timeline, reference) else {
                    continue;
                };
                bucket.salary += monthly_salary(snapshot.salary);
                bucket.esop += EsopService::monthly_expense(&snapshot.terms);
                bucket.headcount += 1;
            }
            bucket.total = bucket.salary + bucket.esop;
            bucket
        })
        .collect()
}

/// Active headcount and current monthly cost per department, sorted by name.
#[must_use]
pub fn department_breakdown(
    records: &[EmployeeRecord],
    today: NaiveDate,
) -> Vec<DepartmentBreakdown> {
    let mut departments: BTreeMap<String, (u32, Decimal)> = BTreeMap::new();

    for record in records.iter().filter(|r| r.employee.is_active_on(today)) {
        let current = record.current();
        let name = record
            .employee
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(UNASSIGNED)
            .to_string();
        let slot = departments.entry(name).or_default();
        slot.0 += 1;
        slot.1 += monthly_salary(current.salary) + EsopService::monthly_expense(&current.terms);
    }

    departments
        .into_iter()
        .map(|(department, (headcount, monthly_cost))| DepartmentBreakdown {
            department,
            headcount,
            monthly_cost,
        })
        .collect()
}
