//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use runway_core::esop;
use runway_core::financials;

/// `allocation_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "allocation_type")]
pub enum AllocationType {
    /// Granted once.
    #[sea_orm(string_value = "one_time")]
    OneTime,
    /// Granted yearly.
    #[sea_orm(string_value = "annually")]
    Annually,
    /// Granted every quarter.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Granted every month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
}

impl From<AllocationType> for esop::AllocationType {
    fn from(value: AllocationType) -> Self {
        match value {
            AllocationType::OneTime => Self::OneTime,
            AllocationType::Annually => Self::Annually,
            AllocationType::Quarterly => Self::Quarterly,
            AllocationType::Monthly => Self::Monthly,
        }
    }
}

impl From<esop::AllocationType> for AllocationType {
    fn from(value: esop::AllocationType) -> Self {
        match value {
            esop::AllocationType::OneTime => Self::OneTime,
            esop::AllocationType::Annually => Self::Annually,
            esop::AllocationType::Quarterly => Self::Quarterly,
            esop::AllocationType::Monthly => Self::Monthly,
        }
    }
}

/// `record_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "record_type")]
pub enum RecordType {
    /// Money going out.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money coming in.
    #[sea_orm(string_value = "revenue")]
    Revenue,
}

impl From<RecordType> for financials::RecordType {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::Expense => Self::Expense,
            RecordType::Revenue => Self::Revenue,
        }
    }
}

impl From<financials::RecordType> for RecordType {
    fn from(value: financials::RecordType) -> Self {
        match value {
            financials::RecordType::Expense => Self::Expense,
            financials::RecordType::Revenue => Self::Revenue,
        }
    }
}
