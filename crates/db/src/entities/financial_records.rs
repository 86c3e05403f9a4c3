//! `SeaORM` Entity for financial_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RecordType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub startup_id: Uuid,
    pub record_type: RecordType,
    pub record_date: Date,
    pub entity: Option<String>,
    pub vertical: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub amount: Decimal,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))", nullable)]
    pub cogs: Option<Decimal>,
    pub funding_source: Option<String>,
    pub attachment_key: Option<String>,
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
}

impl Related<super::startups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Startups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
