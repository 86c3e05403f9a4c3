//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod cap_table;
pub mod employee;
pub mod financial;
pub mod ledger;
pub mod password_reset;
pub mod session;
pub mod startup;
pub mod user;

pub use cap_table::CapTableRepository;
pub use employee::EmployeeRepository;
pub use financial::{FinancialFilter, FinancialRepository};
pub use ledger::LedgerRepository;
pub use password_reset::{PasswordResetError, PasswordResetRepository};
pub use session::SessionRepository;
pub use startup::{StartupRepository, UpdateStartupInput};
pub use user::UserRepository;

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a token, the form tokens are stored in.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
