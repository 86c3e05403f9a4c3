//! Employee and salary increment repository.
//!
//! Rows map onto the domain types in `runway_core::employee`. ESOP terms are
//! stored as the snapshot taken when they were entered, so reading them back
//! never recomputes share counts against today's price.
//!
//! Writes that change compensation history take the regenerated ledger and
//! store it in the same transaction as the row change.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use runway_core::employee::{Employee, EmployeeRecord, SalaryIncrement, Termination};
use runway_core::esop::EsopTerms;
use runway_core::ledger::LedgerEntry;
use runway_shared::types::{EmployeeId, IncrementId, StartupId};

use super::ledger::{insert_ignoring_conflicts, replace_entries};
use crate::entities::{employees, salary_increments};

impl From<employees::Model> for Employee {
    fn from(model: employees::Model) -> Self {
        let termination = model.termination_date.map(|date| Termination {
            date,
            reason: model.termination_reason,
        });
        Self {
            id: EmployeeId::from_uuid(model.id),
            startup_id: StartupId::from_uuid(model.startup_id),
            full_name: model.full_name,
            email: model.email,
            designation: model.designation,
            department: model.department,
            entity: model.entity,
            joining_date: model.joining_date,
            salary: model.salary,
            terms: EsopTerms {
                esop_allocation: model.esop_allocation,
                allocation_type: model.allocation_type.into(),
                esop_per_allocation: model.esop_per_allocation,
                price_per_share: model.price_per_share,
                number_of_shares: model.number_of_shares,
            },
            termination,
            contract_key: model.contract_key,
        }
    }
}

impl From<salary_increments::Model> for SalaryIncrement {
    fn from(model: salary_increments::Model) -> Self {
        Self {
            id: IncrementId::from_uuid(model.id),
            employee_id: EmployeeId::from_uuid(model.employee_id),
            effective_date: model.effective_date,
            salary: model.salary,
            terms: EsopTerms {
                esop_allocation: model.esop_allocation,
                allocation_type: model.allocation_type.into(),
                esop_per_allocation: model.esop_per_allocation,
                price_per_share: model.price_per_share,
                number_of_shares: model.number_of_shares,
            },
        }
    }
}

/// Employee repository.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    db: DatabaseConnection,
}

impl EmployeeRepository {
    /// Creates a new employee repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All employees of a startup with their increments, ordered by joining date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_records(&self, startup_id: StartupId) -> Result<Vec<EmployeeRecord>, DbErr> {
        let rows = employees::Entity::find()
            .filter(employees::Column::StartupId.eq(startup_id.into_inner()))
            .order_by_asc(employees::Column::JoiningDate)
            .order_by_asc(employees::Column::FullName)
            .all(&self.db)
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|e| e.id).collect();
        let mut increments: HashMap<Uuid, Vec<SalaryIncrement>> = HashMap::new();
        if !ids.is_empty() {
            let rows = salary_increments::Entity::find()
                .filter(salary_increments::Column::EmployeeId.is_in(ids))
                .order_by_asc(salary_increments::Column::EffectiveDate)
                .order_by_asc(salary_increments::Column::CreatedAt)
                .all(&self.db)
                .await?;
            for row in rows {
                increments.entry(row.employee_id).or_default().push(row.into());
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let increments = increments.remove(&row.id).unwrap_or_default();
                EmployeeRecord {
                    employee: row.into(),
                    increments,
                }
            })
            .collect())
    }

    /// One employee of a startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        startup_id: StartupId,
        id: EmployeeId,
    ) -> Result<Option<Employee>, DbErr> {
        let row = employees::Entity::find_by_id(id.into_inner())
            .filter(employees::Column::StartupId.eq(startup_id.into_inner()))
            .one(&self.db)
            .await?;
        Ok(row.map(Employee::from))
    }

    /// One employee with its increments in recording order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_record(
        &self,
        startup_id: StartupId,
        id: EmployeeId,
    ) -> Result<Option<EmployeeRecord>, DbErr> {
        let Some(employee) = self.find(startup_id, id).await? else {
            return Ok(None);
        };
        let increments = self.list_increments(id).await?;
        Ok(Some(EmployeeRecord {
            employee,
            increments,
        }))
    }

    /// Increments of an employee, by effective date then creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_increments(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<SalaryIncrement>, DbErr> {
        let rows = salary_increments::Entity::find()
            .filter(salary_increments::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_asc(salary_increments::Column::EffectiveDate)
            .order_by_asc(salary_increments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(SalaryIncrement::from).collect())
    }

    /// Inserts a validated employee together with its first ledger.
    ///
    /// Both land in one transaction. Returns the stored employee and the
    /// number of ledger rows written.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; nothing is stored then.
    pub async fn create(
        &self,
        employee: &Employee,
        ledger: &[LedgerEntry],
    ) -> Result<(Employee, u64), DbErr> {
        let now = chrono::Utc::now().into();
        let terms = &employee.terms;
        let termination = employee.termination.as_ref();

        let txn = self.db.begin().await?;
        let row = employees::ActiveModel {
            id: Set(employee.id.into_inner()),
            startup_id: Set(employee.startup_id.into_inner()),
            full_name: Set(employee.full_name.clone()),
            email: Set(employee.email.clone()),
            designation: Set(employee.designation.clone()),
            department: Set(employee.department.clone()),
            entity: Set(employee.entity.clone()),
            joining_date: Set(employee.joining_date),
            salary: Set(employee.salary),
            esop_allocation: Set(terms.esop_allocation),
            allocation_type: Set(terms.allocation_type.into()),
            esop_per_allocation: Set(terms.esop_per_allocation),
            price_per_share: Set(terms.price_per_share),
            number_of_shares: Set(terms.number_of_shares),
            termination_date: Set(termination.map(|t| t.date)),
            termination_reason: Set(termination.and_then(|t| t.reason.clone())),
            contract_key: Set(employee.contract_key.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        let written = insert_ignoring_conflicts(&txn, ledger).await?;
        txn.commit().await?;

        Ok((row.into(), written))
    }

    /// Overwrites the editable joining-time fields of an employee and
    /// replaces its ledger, in one transaction.
    ///
    /// Termination is left alone; it only changes through [`Self::terminate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails; nothing is changed then.
    pub async fn update(
        &self,
        employee: &Employee,
        ledger: &[LedgerEntry],
    ) -> Result<(Employee, u64), DbErr> {
        let terms = &employee.terms;

        let txn = self.db.begin().await?;
        let row = employees::ActiveModel {
            id: Set(employee.id.into_inner()),
            full_name: Set(employee.full_name.clone()),
            email: Set(employee.email.clone()),
            designation: Set(employee.designation.clone()),
            department: Set(employee.department.clone()),
            entity: Set(employee.entity.clone()),
            joining_date: Set(employee.joining_date),
            salary: Set(employee.salary),
            esop_allocation: Set(terms.esop_allocation),
            allocation_type: Set(terms.allocation_type.into()),
            esop_per_allocation: Set(terms.esop_per_allocation),
            price_per_share: Set(terms.price_per_share),
            number_of_shares: Set(terms.number_of_shares),
            contract_key: Set(employee.contract_key.clone()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        let written = replace_entries(&txn, employee.id, ledger).await?;
        txn.commit().await?;

        Ok((row.into(), written))
    }

    /// Records a termination and replaces the ledger, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails; nothing is changed then.
    pub async fn terminate(
        &self,
        id: EmployeeId,
        termination: &Termination,
        ledger: &[LedgerEntry],
    ) -> Result<(Employee, u64), DbErr> {
        let txn = self.db.begin().await?;
        let row = employees::ActiveModel {
            id: Set(id.into_inner()),
            termination_date: Set(Some(termination.date)),
            termination_reason: Set(termination.reason.clone()),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&txn)
        .await?;
        let written = replace_entries(&txn, id, ledger).await?;
        txn.commit().await?;

        Ok((row.into(), written))
    }

    /// Stores the storage key of an uploaded contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_contract_key(&self, id: EmployeeId, key: Option<String>) -> Result<(), DbErr> {
        employees::ActiveModel {
            id: Set(id.into_inner()),
            contract_key: Set(key),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(())
    }

    /// Deletes an employee; increments and ledger rows cascade.
    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, startup_id: StartupId, id: EmployeeId) -> Result<bool, DbErr> {
        let result = employees::Entity::delete_many()
            .filter(employees::Column::Id.eq(id.into_inner()))
            .filter(employees::Column::StartupId.eq(startup_id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Inserts a validated increment and replaces the employee's ledger,
    /// in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails; nothing is stored then.
    pub async fn add_increment(
        &self,
        increment: &SalaryIncrement,
        ledger: &[LedgerEntry],
    ) -> Result<(SalaryIncrement, u64), DbErr> {
        let terms = &increment.terms;

        let txn = self.db.begin().await?;
        let row = salary_increments::ActiveModel {
            id: Set(increment.id.into_inner()),
            employee_id: Set(increment.employee_id.into_inner()),
            effective_date: Set(increment.effective_date),
            salary: Set(increment.salary),
            esop_allocation: Set(terms.esop_allocation),
            allocation_type: Set(terms.allocation_type.into()),
            esop_per_allocation: Set(terms.esop_per_allocation),
            price_per_share: Set(terms.price_per_share),
            number_of_shares: Set(terms.number_of_shares),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(&txn)
        .await?;
        let written = replace_entries(&txn, increment.employee_id, ledger).await?;
        txn.commit().await?;

        Ok((row.into(), written))
    }

    /// Deletes one increment of an employee and replaces the ledger, in one
    /// transaction.
    ///
    /// Returns the ledger rows written, or `None` when no such increment
    /// exists; the ledger is left alone then.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails; nothing is changed then.
    pub async fn delete_increment(
        &self,
        employee_id: EmployeeId,
        id: IncrementId,
        ledger: &[LedgerEntry],
    ) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;
        let result = salary_increments::Entity::delete_many()
            .filter(salary_increments::Column::Id.eq(id.into_inner()))
            .filter(salary_increments::Column::EmployeeId.eq(employee_id.into_inner()))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }
        let written = replace_entries(&txn, employee_id, ledger).await?;
        txn.commit().await?;

        Ok(Some(written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::AllocationType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row() -> employees::Model {
        let now = chrono::Utc::now().into();
        employees::Model {
            id: Uuid::now_v7(),
            startup_id: Uuid::now_v7(),
            full_name: "Grace Hopper".to_string(),
            email: None,
            designation: Some("CTO".to_string()),
            department: None,
            entity: None,
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            salary: dec!(120000),
            esop_allocation: dec!(12000),
            allocation_type: AllocationType::Quarterly,
            esop_per_allocation: dec!(3000),
            price_per_share: dec!(10),
            number_of_shares: dec!(1200),
            termination_date: None,
            termination_reason: Some("ignored without a date".to_string()),
            contract_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_maps_stored_terms() {
        let employee = Employee::from(row());
        assert_eq!(employee.terms.number_of_shares, dec!(1200));
        assert_eq!(
            employee.terms.allocation_type,
            runway_core::esop::AllocationType::Quarterly
        );
        assert!(employee.termination.is_none());
    }

    #[test]
    fn test_row_maps_termination() {
        let mut model = row();
        model.termination_date = NaiveDate::from_ymd_opt(2024, 6, 30);
        model.termination_reason = Some("resigned".to_string());

        let termination = Employee::from(model).termination.unwrap();
        assert_eq!(termination.date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(termination.reason.as_deref(), Some("resigned"));
    }
}
