//! `SeaORM` Entity for employees table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AllocationType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub startup_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub entity: Option<String>,
    pub joining_date: Date,
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
    pub termination_date: Option<Date>,
    pub termination_reason: Option<String>,
    pub contract_key: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::startups::Entity",
        from = "Column::StartupId",
        to = "super::startups::Column::Id",
        on_delete = "Cascade"
    )]
    Startups,
    #[sea_orm(has_many = "super::salary_increments::Entity")]
    SalaryIncrements,
    #[sea_orm(has_many = "super::employee_ledger_entries::Entity")]
    EmployeeLedgerEntries,
}

impl Related<super::startups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Startups.def()
    }
}

impl Related<super::salary_increments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalaryIncrements.def()
    }
}

impl Related<super::employee_ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeLedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
