//! Entity aliases.

pub use super::cap_tables::Entity as CapTables;
pub use super::employee_ledger_entries::Entity as EmployeeLedgerEntries;
pub use super::employees::Entity as Employees;
pub use super::financial_records::Entity as FinancialRecords;
pub use super::investments::Entity as Investments;
pub use super::password_reset_tokens::Entity as PasswordResetTokens;
pub use super::salary_increments::Entity as SalaryIncrements;
pub use super::sessions::Entity as Sessions;
pub use super::startups::Entity as Startups;
pub use super::users::Entity as Users;
