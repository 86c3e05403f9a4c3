//! Replays an employee's compensation history into ledger entries.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{LedgerCadence, LedgerDiff, LedgerEntry};
use crate::employee::{CompensationSnapshot, EmployeeRecord, compensation_on};
use crate::period::add_months;

/// Ledger generator.
pub struct LedgerGenerator;

impl LedgerGenerator {
    /// Entry dates from `joining` to `last`, both inclusive.
    ///
    /// Monthly entries fall on the joining day-of-month, clamped in short
    /// months.
    ///
    /// # Errors
    ///
    /// Returns `DateOverflow` if the calendar runs out.
    pub fn entry_dates(
        joining: NaiveDate,
        last: NaiveDate,
        cadence: LedgerCadence,
    ) -> Result<Vec<NaiveDate>, LedgerError> {
        let mut dates = Vec::new();
        match cadence {
            LedgerCadence::Daily => {
                let mut day = joining;
                while day <= last {
                    dates.push(day);
                    day = day.succ_opt().ok_or(LedgerError::DateOverflow(joining))?;
                }
            }
            LedgerCadence::Monthly => {
                let mut n = 0;
                loop {
                    let day = add_months(joining, n).ok_or(LedgerError::DateOverflow(joining))?;
                    if day > last {
                        break;
                    }
                    dates.push(day);
                    n += 1;
                }
            }
        }
        Ok(dates)
    }

    /// Grant dates and share counts up to `last`.
    ///
    /// Each segment of the timeline grants from its start date, every 1, 3 or
    /// 12 months for recurring types, until the next segment takes over.
    /// One-time terms grant once at the segment start.
    ///
    /// # Errors
    ///
    /// Returns `DateOverflow` if the calendar runs out.
    pub fn grants(
        timeline: &[CompensationSnapshot],
        last: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, LedgerError> {
        let mut grants = Vec::new();
        for (i, segment) in timeline.iter().enumerate() {
            let shares = segment.terms.shares_per_grant();
            if shares.is_zero() {
                continue;
            }
            let start = segment.effective_from;
            let next = timeline.get(i + 1).map(|s| s.effective_from);
            let in_segment = |d: NaiveDate| d <= last && next.is_none_or(|n| d < n);

            match segment.terms.allocation_type.months_between_grants() {
                None => {
                    if in_segment(start) {
                        grants.push((start, shares));
                    }
                }
                Some(step) => {
                    let mut k = 0;
                    loop {
                        let date =
                            add_months(start, k * step).ok_or(LedgerError::DateOverflow(start))?;
                        if !in_segment(date) {
                            break;
                        }
                        grants.push((date, shares));
                        k += 1;
                    }
                }
            }
        }
        Ok(grants)
    }

    /// Full ledger for an employee up to `end` (usually today).
    ///
    /// Empty when `end` or the termination date precedes joining.
    ///
    /// # Errors
    ///
    /// Returns `DateOverflow` if the calendar runs out.
    pub fn generate(
        record: &EmployeeRecord,
        end: NaiveDate,
        cadence: LedgerCadence,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let employee = &record.employee;
        let last = employee.last_day(end);
        if last < employee.joining_date {
            return Ok(Vec::new());
        }

        let dates = Self::entry_dates(employee.joining_date, last, cadence)?;
        let timeline = record.timeline();

        let mut granted = vec![Decimal::ZERO; dates.len()];
        for (date, shares) in Self::grants(&timeline, last)? {
            // Grants never precede joining, so the first entry always qualifies.
            let idx = dates.partition_point(|d| *d <= date).saturating_sub(1);
            granted[idx] += shares;
        }

        let mut cumulative = Decimal::ZERO;
        let entries = dates
            .into_iter()
            .zip(granted)
            .filter_map(|(entry_date, shares_granted)| {
                let snapshot = compensation_on(&timeline, entry_date)?;
                cumulative += shares_granted;
                Some(LedgerEntry {
                    employee_id: employee.id,
                    entry_date,
                    salary: snapshot.salary,
                    terms: snapshot.terms,
                    shares_granted,
                    cumulative_shares: cumulative,
                })
            })
            .collect();
        Ok(entries)
    }

    /// Shares granted across a ledger.
    #[must_use]
    pub fn total_shares(entries: &[LedgerEntry]) -> Decimal {
        entries.iter().map(|e| e.shares_granted).sum()
    }

    /// Compares a stored ledger against a generated one.
    #[must_use]
    pub fn reconcile(existing: &[LedgerEntry], generated: &[LedgerEntry]) -> LedgerDiff {
        let stored: HashMap<NaiveDate, &LedgerEntry> =
            existing.iter().map(|e| (e.entry_date, e)).collect();

        let mut diff = LedgerDiff::default();
        for entry in generated {
            match stored.get(&entry.entry_date) {
                None => diff.missing.push(entry.clone()),
                Some(old) if *old != entry => diff.changed.push(entry.clone()),
                Some(_) => {}
            }
        }

        let produced: HashSet<NaiveDate> =
            generated.iter().map(|e| e.entry_date).collect();
        diff.orphaned = existing
            .iter()
            .map(|e| e.entry_date)
            .filter(|d| !produced.contains(d))
            .collect();
        diff
    }
}
