//! `SeaORM` entities, one module per table.

pub mod prelude;

pub mod cap_tables;
pub mod employee_ledger_entries;
pub mod employees;
pub mod financial_records;
pub mod investments;
pub mod password_reset_tokens;
pub mod salary_increments;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod startups;
pub mod users;
