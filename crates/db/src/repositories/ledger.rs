//! Employee ESOP ledger persistence.
//!
//! Rows are unique per `(employee_id, entry_date)`. Gap filling inserts with
//! `ON CONFLICT DO NOTHING` so concurrent or repeated runs converge on the
//! same ledger.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::OnConflict,
};
use uuid::Uuid;

use runway_core::esop::EsopTerms;
use runway_core::ledger::LedgerEntry;
use runway_shared::types::{EmployeeId, StartupId};

use crate::entities::{employee_ledger_entries, employees};

/// Rows per INSERT, well under the Postgres bind-parameter limit.
const INSERT_CHUNK: usize = 1000;

impl From<employee_ledger_entries::Model> for LedgerEntry {
    fn from(model: employee_ledger_entries::Model) -> Self {
        Self {
            employee_id: EmployeeId::from_uuid(model.employee_id),
            entry_date: model.entry_date,
            salary: model.salary,
            terms: EsopTerms {
                esop_allocation: model.esop_allocation,
                allocation_type: model.allocation_type.into(),
                esop_per_allocation: model.esop_per_allocation,
                price_per_share: model.price_per_share,
                number_of_shares: model.number_of_shares,
            },
            shares_granted: model.shares_granted,
            cumulative_shares: model.cumulative_shares,
        }
    }
}

fn to_active(entry: &LedgerEntry) -> employee_ledger_entries::ActiveModel {
    employee_ledger_entries::ActiveModel {
        id: Set(Uuid::now_v7()),
        employee_id: Set(entry.employee_id.into_inner()),
        entry_date: Set(entry.entry_date),
        salary: Set(entry.salary),
        esop_allocation: Set(entry.terms.esop_allocation),
        allocation_type: Set(entry.terms.allocation_type.into()),
        esop_per_allocation: Set(entry.terms.esop_per_allocation),
        price_per_share: Set(entry.terms.price_per_share),
        number_of_shares: Set(entry.terms.number_of_shares),
        shares_granted: Set(entry.shares_granted),
        cumulative_shares: Set(entry.cumulative_shares),
        created_at: Set(chrono::Utc::now().into()),
    }
}

pub(crate) async fn insert_ignoring_conflicts<C>(
    conn: &C,
    entries: &[LedgerEntry],
) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let mut inserted = 0;
    for chunk in entries.chunks(INSERT_CHUNK) {
        inserted += employee_ledger_entries::Entity::insert_many(chunk.iter().map(to_active))
            .on_conflict(
                OnConflict::columns([
                    employee_ledger_entries::Column::EmployeeId,
                    employee_ledger_entries::Column::EntryDate,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }
    Ok(inserted)
}

/// Deletes an employee's stored ledger and writes `entries` in its place.
/// Callers run this inside a transaction.
pub(crate) async fn replace_entries<C>(
    conn: &C,
    employee_id: EmployeeId,
    entries: &[LedgerEntry],
) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    employee_ledger_entries::Entity::delete_many()
        .filter(employee_ledger_entries::Column::EmployeeId.eq(employee_id.into_inner()))
        .exec(conn)
        .await?;
    insert_ignoring_conflicts(conn, entries).await
}

/// Ledger repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stored ledger of an employee in date order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, employee_id: EmployeeId) -> Result<Vec<LedgerEntry>, DbErr> {
        let rows = employee_ledger_entries::Entity::find()
            .filter(employee_ledger_entries::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_asc(employee_ledger_entries::Column::EntryDate)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    /// Inserts entries whose date is not stored yet. Returns the number inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn insert_missing(&self, entries: &[LedgerEntry]) -> Result<u64, DbErr> {
        insert_ignoring_conflicts(&self.db, entries).await
    }

    /// Replaces an employee's whole ledger in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; nothing is changed then.
    pub async fn rebuild(
        &self,
        employee_id: EmployeeId,
        entries: &[LedgerEntry],
    ) -> Result<u64, DbErr> {
        let txn = self.db.begin().await?;
        let inserted = replace_entries(&txn, employee_id, entries).await?;
        txn.commit().await?;
        Ok(inserted)
    }

    /// Shares granted across every employee of a startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn allocated_shares(&self, startup_id: StartupId) -> Result<Decimal, DbErr> {
        let total: Option<Option<Decimal>> = employee_ledger_entries::Entity::find()
            .select_only()
            .column_as(employee_ledger_entries::Column::SharesGranted.sum(), "total")
            .inner_join(employees::Entity)
            .filter(employees::Column::StartupId.eq(startup_id.into_inner()))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::AllocationType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_maps_to_entry() {
        let model = employee_ledger_entries::Model {
            id: Uuid::now_v7(),
            employee_id: Uuid::now_v7(),
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            salary: dec!(60000),
            esop_allocation: dec!(1200),
            allocation_type: AllocationType::Monthly,
            esop_per_allocation: dec!(100),
            price_per_share: dec!(1),
            number_of_shares: dec!(1200),
            shares_granted: dec!(100),
            cumulative_shares: dec!(300),
            created_at: chrono::Utc::now().into(),
        };

        let entry = LedgerEntry::from(model.clone());
        assert_eq!(entry.employee_id.into_inner(), model.employee_id);
        assert_eq!(entry.cumulative_shares, dec!(300));
        assert_eq!(entry.terms.esop_per_allocation, dec!(100));
    }
}
