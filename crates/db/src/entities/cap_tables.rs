//! `SeaORM` Entity for cap_tables table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cap_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub startup_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 0)))")]
    pub total_shares: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 0)))")]
    pub esop_reserved_shares: Decimal,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub valuation: Decimal,
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
