//! `SeaORM` Entity for employee_ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AllocationType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub entry_date: Date,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub salary: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub esop_allocation: Decimal,
    pub allocation_type: AllocationType,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub esop_per_allocation: Decimal,
    #[sea_orm(column_type = "Decimal(Some((28, 10)))")]
    pub price_per_share: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 0)))")]
    pub number_of_shares: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 0)))")]
    pub shares_granted: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 0)))")]
    pub cumulative_shares: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id",
        on_delete = "Cascade"
    )]
    Employees,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
