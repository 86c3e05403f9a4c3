//! Employee ESOP ledger.
//!
//! The ledger is a materialized view over an employee and its increments: one
//! entry per period from joining to `min(today, termination)`, each carrying
//! the compensation in force that day and the shares granted in the period.
//! It can be regenerated at any time and gap filling is idempotent.

pub mod error;
pub mod generator;
pub mod types;

#[cfg(test)]
mod generator_props;

pub use error::LedgerError;
pub use generator::LedgerGenerator;
pub use types::{LedgerCadence, LedgerDiff, LedgerEntry};
