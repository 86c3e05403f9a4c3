//! Core business logic for Runway.
//!
//! Pure domain rules with no web or database dependencies: ESOP valuation and
//! the allocation guard, employee compensation history and ledgers, financial
//! aggregation, currency resolution and the auth flows' decision logic.
//!
//! # Modules
//!
//! - `esop` - Pool valuation, share derivation and the allocation guard
//! - `employee` - Employees, increments, termination and chart data
//! - `ledger` - Per-employee ESOP ledger generation and reconciliation
//! - `financials` - Expense/revenue aggregation and funding reconciliation
//! - `cap_table` - Share structure and investments
//! - `currency` - Display currency resolution
//! - `auth` - Passwords, profile gate and reset links
//! - `storage` - Contract and invoice attachments

pub mod auth;
pub mod cap_table;
pub mod currency;
pub mod employee;
pub mod esop;
pub mod financials;
pub mod ledger;
pub mod period;
pub mod storage;
