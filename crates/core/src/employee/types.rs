//! Employee domain types and compensation history.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use runway_shared::types::{EmployeeId, IncrementId, StartupId};

use crate::esop::EsopTerms;

/// Why and when an employee left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// Last day of employment, inclusive.
    pub date: NaiveDate,
    /// Free-form reason.
    pub reason: Option<String>,
}

/// An employee as recorded on hire.
///
/// Salary and ESOP terms here are the joining values; later changes live in
/// [`SalaryIncrement`] rows and never overwrite these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee ID.
    pub id: EmployeeId,
    /// Owning startup.
    pub startup_id: StartupId,
    /// Full name.
    pub full_name: String,
    /// Work email.
    pub email: Option<String>,
    /// Job title.
    pub designation: Option<String>,
    /// Department, used for the cost breakdown.
    pub department: Option<String>,
    /// Legal entity the employee is contracted with.
    pub entity: Option<String>,
    /// First day of employment.
    pub joining_date: NaiveDate,
    /// Annual base salary.
    pub salary: Decimal,
    /// ESOP terms at joining.
    pub terms: EsopTerms,
    /// Set once the employee leaves.
    pub termination: Option<Termination>,
    /// Storage key of the signed contract.
    pub contract_key: Option<String>,
}

impl Employee {
    /// Compensation as of the joining date.
    #[must_use]
    pub fn base_snapshot(&self) -> CompensationSnapshot {
        CompensationSnapshot {
            effective_from: self.joining_date,
            salary: self.salary,
            terms: self.terms,
        }
    }

    /// Termination date, if any.
    #[must_use]
    pub fn terminated_on(&self) -> Option<NaiveDate> {
        self.termination.as_ref().map(|t| t.date)
    }

    /// Employed on `date` (joining and termination days inclusive).
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.joining_date <= date && self.terminated_on().is_none_or(|t| date <= t)
    }

    /// Last day that counts for ledgers and charts: `min(end, termination)`.
    #[must_use]
    pub fn last_day(&self, end: NaiveDate) -> NaiveDate {
        self.terminated_on().map_or(end, |t| t.min(end))
    }
}

/// A salary/ESOP change effective from a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryIncrement {
    /// Increment ID.
    pub id: IncrementId,
    /// Employee the increment applies to.
    pub employee_id: EmployeeId,
    /// First day the new values apply.
    pub effective_date: NaiveDate,
    /// New annual salary.
    pub salary: Decimal,
    /// New ESOP terms.
    pub terms: EsopTerms,
}

/// Salary and ESOP terms in force from a date onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationSnapshot {
    /// First day these values apply.
    pub effective_from: NaiveDate,
    /// Annual salary.
    pub salary: Decimal,
    /// ESOP terms.
    pub terms: EsopTerms,
}

/// An employee together with its increment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// The employee row.
    pub employee: Employee,
    /// Increments in any order.
    pub increments: Vec<SalaryIncrement>,
}

impl EmployeeRecord {
    /// See [`compensation_timeline`].
    #[must_use]
    pub fn timeline(&self) -> Vec<CompensationSnapshot> {
        compensation_timeline(&self.employee, &self.increments)
    }

    /// See [`current_compensation`].
    #[must_use]
    pub fn current(&self) -> CompensationSnapshot {
        current_compensation(&self.employee, &self.increments)
    }
}

/// Replays the joining values and increments into a chronological timeline.
///
/// Increments are ordered by effective date with a stable sort, so among
/// entries sharing a date the one recorded last wins. An increment dated on
/// the joining day replaces the joining values.
#[must_use]
pub fn compensation_timeline(
    employee: &Employee,
    increments: &[SalaryIncrement],
) -> Vec<CompensationSnapshot> {
    let mut sorted: Vec<&SalaryIncrement> = increments.iter().collect();
    sorted.sort_by_key(|inc| inc.effective_date);

    let mut timeline = vec![employee.base_snapshot()];
    for inc in sorted {
        let snapshot = CompensationSnapshot {
            effective_from: inc.effective_date,
            salary: inc.salary,
            terms: inc.terms,
        };
        match timeline.last_mut() {
            Some(last) if last.effective_from == snapshot.effective_from => *last = snapshot,
            _ => timeline.push(snapshot),
        }
    }
    timeline
}

/// Snapshot in force on `date`, or `None` before the first entry.
#[must_use]
pub fn compensation_on(
    timeline: &[CompensationSnapshot],
    date: NaiveDate,
) -> Option<&CompensationSnapshot> {
    timeline.iter().rev().find(|s| s.effective_from <= date)
}

/// The latest compensation: joining values superseded by the latest increment.
#[must_use]
pub fn current_compensation(
    employee: &Employee,
    increments: &[SalaryIncrement],
) -> CompensationSnapshot {
    compensation_timeline(employee, increments)
        .last()
        .copied()
        .unwrap_or_else(|| employee.base_snapshot())
}
