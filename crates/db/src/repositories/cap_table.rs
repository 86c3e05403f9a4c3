//! Cap table and investment repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, sea_query::OnConflict,
};

use runway_core::cap_table::{CapTable, Investment};
use runway_shared::types::{InvestmentId, StartupId};

use crate::entities::{cap_tables, investments};

impl From<cap_tables::Model> for CapTable {
    fn from(model: cap_tables::Model) -> Self {
        Self {
            total_shares: model.total_shares,
            esop_reserved_shares: model.esop_reserved_shares,
            valuation: model.valuation,
        }
    }
}

impl From<investments::Model> for Investment {
    fn from(model: investments::Model) -> Self {
        Self {
            id: InvestmentId::from_uuid(model.id),
            startup_id: StartupId::from_uuid(model.startup_id),
            investor_name: model.investor_name,
            round: model.round,
            amount: model.amount,
            invested_on: model.invested_on,
            shares_issued: model.shares_issued,
        }
    }
}

/// Cap table repository.
#[derive(Debug, Clone)]
pub struct CapTableRepository {
    db: DatabaseConnection,
}

impl CapTableRepository {
    /// Creates a new cap table repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Cap table of a startup; an all-zero table when none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, startup_id: StartupId) -> Result<CapTable, DbErr> {
        let row = cap_tables::Entity::find_by_id(startup_id.into_inner())
            .one(&self.db)
            .await?;
        Ok(row.map(CapTable::from).unwrap_or_default())
    }

    /// Creates or replaces the cap table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database upsert fails.
    pub async fn upsert(&self, startup_id: StartupId, table: &CapTable) -> Result<(), DbErr> {
        let row = cap_tables::ActiveModel {
            startup_id: Set(startup_id.into_inner()),
            total_shares: Set(table.total_shares),
            esop_reserved_shares: Set(table.esop_reserved_shares),
            valuation: Set(table.valuation),
            updated_at: Set(chrono::Utc::now().into()),
        };

        cap_tables::Entity::insert(row)
            .on_conflict(
                OnConflict::column(cap_tables::Column::StartupId)
                    .update_columns([
                        cap_tables::Column::TotalShares,
                        cap_tables::Column::EsopReservedShares,
                        cap_tables::Column::Valuation,
                        cap_tables::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    /// Investments of a startup, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_investments(&self, startup_id: StartupId) -> Result<Vec<Investment>, DbErr> {
        let rows = investments::Entity::find()
            .filter(investments::Column::StartupId.eq(startup_id.into_inner()))
            .order_by_asc(investments::Column::InvestedOn)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Investment::from).collect())
    }

    /// Sum of a startup's investments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_invested(&self, startup_id: StartupId) -> Result<Decimal, DbErr> {
        let investments = self.list_investments(startup_id).await?;
        Ok(runway_core::cap_table::total_invested(&investments))
    }

    /// Inserts a validated investment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_investment(&self, investment: &Investment) -> Result<Investment, DbErr> {
        let now = chrono::Utc::now().into();
        let row = investments::ActiveModel {
            id: Set(investment.id.into_inner()),
            startup_id: Set(investment.startup_id.into_inner()),
            investor_name: Set(investment.investor_name.clone()),
            round: Set(investment.round.clone()),
            amount: Set(investment.amount),
            invested_on: Set(investment.invested_on),
            shares_issued: Set(investment.shares_issued),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Overwrites a validated investment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_investment(&self, investment: &Investment) -> Result<Investment, DbErr> {
        let row = investments::ActiveModel {
            id: Set(investment.id.into_inner()),
            investor_name: Set(investment.investor_name.clone()),
            round: Set(investment.round.clone()),
            amount: Set(investment.amount),
            invested_on: Set(investment.invested_on),
            shares_issued: Set(investment.shares_issued),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Finds one investment of a startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_investment(
        &self,
        startup_id: StartupId,
        id: InvestmentId,
    ) -> Result<Option<Investment>, DbErr> {
        let row = investments::Entity::find_by_id(id.into_inner())
            .filter(investments::Column::StartupId.eq(startup_id.into_inner()))
            .one(&self.db)
            .await?;
        Ok(row.map(Investment::from))
    }

    /// Deletes one investment. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_investment(
        &self,
        startup_id: StartupId,
        id: InvestmentId,
    ) -> Result<bool, DbErr> {
        let result = investments::Entity::delete_many()
            .filter(investments::Column::Id.eq(id.into_inner()))
            .filter(investments::Column::StartupId.eq(startup_id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
