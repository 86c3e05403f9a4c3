//! Employee records, salary increments and termination.

pub mod chart;
pub mod error;
pub mod types;
pub mod validation;

pub use chart::{DepartmentBreakdown, MonthlyCost, department_breakdown, monthly_costs};
pub use error::EmployeeError;
pub use types::{
    CompensationSnapshot, Employee, EmployeeRecord, SalaryIncrement, Termination, compensation_on,
    compensation_timeline, current_compensation,
};
pub use validation::{
    validate_increment, validate_joining_date, validate_new_employee, validate_termination,
};
