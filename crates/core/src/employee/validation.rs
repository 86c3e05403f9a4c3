//! Date and amount rules checked before employee writes.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::EmployeeError;
use super::types::{Employee, SalaryIncrement};
use crate::esop::EsopTerms;

/// Joining date must not precede the company registration date.
///
/// # Errors
///
/// Returns `JoiningBeforeRegistration`.
pub fn validate_joining_date(
    joining: NaiveDate,
    registered: Option<NaiveDate>,
) -> Result<(), EmployeeError> {
    match registered {
        Some(registered) if joining < registered => {
            Err(EmployeeError::JoiningBeforeRegistration { joining, registered })
        }
        _ => Ok(()),
    }
}

fn validate_compensation(salary: Decimal, terms: &EsopTerms) -> Result<(), EmployeeError> {
    if salary < Decimal::ZERO {
        return Err(EmployeeError::NegativeSalary(salary));
    }
    terms.validate()?;
    Ok(())
}

/// Checks a new or edited employee record.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_new_employee(
    employee: &Employee,
    registered: Option<NaiveDate>,
) -> Result<(), EmployeeError> {
    if employee.full_name.trim().is_empty() {
        return Err(EmployeeError::MissingName);
    }
    validate_joining_date(employee.joining_date, registered)?;
    validate_compensation(employee.salary, &employee.terms)
}

/// Increment effective date must fall in `[joining date, today]` and not
/// after a termination.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_increment(
    employee: &Employee,
    increment: &SalaryIncrement,
    today: NaiveDate,
) -> Result<(), EmployeeError> {
    let effective = increment.effective_date;
    if effective < employee.joining_date {
        return Err(EmployeeError::IncrementBeforeJoining {
            effective,
            joining: employee.joining_date,
        });
    }
    if effective > today {
        return Err(EmployeeError::IncrementInFuture { effective, today });
    }
    if let Some(terminated) = employee.terminated_on()
        && effective > terminated
    {
        return Err(EmployeeError::IncrementAfterTermination {
            effective,
            terminated,
        });
    }
    validate_compensation(increment.salary, &increment.terms)
}

/// Termination must not precede joining or the latest increment.
///
/// # Errors
///
/// Returns `AlreadyTerminated`, `TerminationBeforeJoining` or
/// `TerminationBeforeLatestIncrement`.
pub fn validate_termination(
    employee: &Employee,
    increments: &[SalaryIncrement],
    termination: NaiveDate,
) -> Result<(), EmployeeError> {
    if employee.termination.is_some() {
        return Err(EmployeeError::AlreadyTerminated);
    }
    if termination < employee.joining_date {
        return Err(EmployeeError::TerminationBeforeJoining {
            termination,
            joining: employee.joining_date,
        });
    }
    if let Some(latest) = increments.iter().map(|i| i.effective_date).max()
        && termination < latest
    {
        return Err(EmployeeError::TerminationBeforeLatestIncrement {
            termination,
            latest,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::types::Termination;
    use super::super::types::fixtures::*;
    use super::*;
    use crate::esop::{AllocationType, EsopError};
    use rust_decimal_macros::dec;

    #[test]
    fn test_increment_before_joining_rejected() {
        let emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        let inc = increment(&emp, d(2023, 12, 31), dec!(70000), no_esop());

        assert_eq!(
            validate_increment(&emp, &inc, d(2024, 6, 1)),
            Err(EmployeeError::IncrementBeforeJoining {
                effective: d(2023, 12, 31),
                joining: d(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_increment_window_inclusive() {
        let emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        let today = d(2024, 6, 1);

        let on_joining = increment(&emp, d(2024, 1, 1), dec!(61000), no_esop());
        let on_today = increment(&emp, today, dec!(62000), no_esop());
        let tomorrow = increment(&emp, d(2024, 6, 2), dec!(63000), no_esop());

        assert!(validate_increment(&emp, &on_joining, today).is_ok());
        assert!(validate_increment(&emp, &on_today, today).is_ok());
        assert!(matches!(
            validate_increment(&emp, &tomorrow, today),
            Err(EmployeeError::IncrementInFuture { .. })
        ));
    }

    #[test]
    fn test_increment_after_termination_rejected() {
        let mut emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        emp.termination = Some(Termination {
            date: d(2024, 3, 31),
            reason: Some("resigned".to_string()),
        });
        let inc = increment(&emp, d(2024, 4, 1), dec!(70000), no_esop());

        assert!(matches!(
            validate_increment(&emp, &inc, d(2024, 6, 1)),
            Err(EmployeeError::IncrementAfterTermination { .. })
        ));
    }

    #[test]
    fn test_increment_esop_terms_checked() {
        let emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        let bad_terms = EsopTerms::new(dec!(1000), AllocationType::Monthly, dec!(0));
        let inc = increment(&emp, d(2024, 2, 1), dec!(60000), bad_terms);

        assert_eq!(
            validate_increment(&emp, &inc, d(2024, 6, 1)),
            Err(EmployeeError::Esop(EsopError::InvalidPricePerShare))
        );
    }

    #[test]
    fn test_joining_before_registration() {
        assert!(validate_joining_date(d(2024, 1, 1), Some(d(2024, 1, 1))).is_ok());
        assert!(validate_joining_date(d(2020, 1, 1), None).is_ok());
        assert!(matches!(
            validate_joining_date(d(2023, 12, 31), Some(d(2024, 1, 1))),
            Err(EmployeeError::JoiningBeforeRegistration { .. })
        ));
    }

    #[test]
    fn test_new_employee_rules() {
        let mut emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        assert!(validate_new_employee(&emp, Some(d(2023, 1, 1))).is_ok());

        emp.salary = dec!(-1);
        assert_eq!(
            validate_new_employee(&emp, None),
            Err(EmployeeError::NegativeSalary(dec!(-1)))
        );

        emp.salary = dec!(1);
        emp.full_name = " ".to_string();
        assert_eq!(validate_new_employee(&emp, None), Err(EmployeeError::MissingName));
    }

    #[test]
    fn test_termination_rules() {
        let emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        let raise = increment(&emp, d(2024, 5, 1), dec!(70000), no_esop());

        assert!(validate_termination(&emp, &[raise.clone()], d(2024, 5, 1)).is_ok());
        assert!(matches!(
            validate_termination(&emp, &[], d(2023, 12, 1)),
            Err(EmployeeError::TerminationBeforeJoining { .. })
        ));
        assert!(matches!(
            validate_termination(&emp, &[raise], d(2024, 4, 30)),
            Err(EmployeeError::TerminationBeforeLatestIncrement { .. })
        ));
    }

    #[test]
    fn test_cannot_terminate_twice() {
        let mut emp = employee(d(2024, 1, 1), dec!(60000), no_esop());
        emp.termination = Some(Termination {
            date: d(2024, 2, 1),
            reason: None,
        });
        assert_eq!(
            validate_termination(&emp, &[], d(2024, 3, 1)),
            Err(EmployeeError::AlreadyTerminated)
        );
    }
}
