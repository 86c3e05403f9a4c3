//! Expense and revenue record repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use runway_core::financials::{FinancialRecord, RecordDetails, RecordType};
use runway_shared::types::{FinancialRecordId, StartupId};

use crate::entities::{financial_records, sea_orm_active_enums};

impl From<financial_records::Model> for FinancialRecord {
    fn from(model: financial_records::Model) -> Self {
        let details = match model.record_type {
            sea_orm_active_enums::RecordType::Expense => RecordDetails::Expense {
                funding_source: model.funding_source,
                attachment_key: model.attachment_key,
            },
            sea_orm_active_enums::RecordType::Revenue => RecordDetails::Revenue {
                cogs: model.cogs.unwrap_or(Decimal::ZERO),
            },
        };
        Self {
            id: FinancialRecordId::from_uuid(model.id),
            startup_id: StartupId::from_uuid(model.startup_id),
            record_date: model.record_date,
            entity: model.entity,
            vertical: model.vertical,
            amount: model.amount,
            description: model.description,
            details,
        }
    }
}

/// Type-specific columns of a record: `(cogs, funding_source, attachment_key)`.
fn detail_columns(details: &RecordDetails) -> (Option<Decimal>, Option<String>, Option<String>) {
    match details {
        RecordDetails::Expense {
            funding_source,
            attachment_key,
        } => (None, funding_source.clone(), attachment_key.clone()),
        RecordDetails::Revenue { cogs } => (Some(*cogs), None, None),
    }
}

/// Listing filter. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialFilter {
    /// Calendar year of the record date.
    pub year: Option<i32>,
    /// Expense or revenue.
    pub record_type: Option<RecordType>,
}

/// Financial record repository.
#[derive(Debug, Clone)]
pub struct FinancialRepository {
    db: DatabaseConnection,
}

impl FinancialRepository {
    /// Creates a new financial record repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records of a startup matching a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        startup_id: StartupId,
        filter: FinancialFilter,
    ) -> Result<Vec<FinancialRecord>, DbErr> {
        let mut query = financial_records::Entity::find()
            .filter(financial_records::Column::StartupId.eq(startup_id.into_inner()));

        if let Some(year) = filter.year {
            let start = NaiveDate::from_ymd_opt(year, 1, 1);
            let end = NaiveDate::from_ymd_opt(year, 12, 31);
            let (Some(start), Some(end)) = (start, end) else {
                return Ok(Vec::new());
            };
            query = query.filter(financial_records::Column::RecordDate.between(start, end));
        }
        if let Some(record_type) = filter.record_type {
            query = query.filter(
                financial_records::Column::RecordType
                    .eq(sea_orm_active_enums::RecordType::from(record_type)),
            );
        }

        let rows = query
            .order_by_desc(financial_records::Column::RecordDate)
            .order_by_desc(financial_records::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(FinancialRecord::from).collect())
    }

    /// Every record of a startup, for aggregation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self, startup_id: StartupId) -> Result<Vec<FinancialRecord>, DbErr> {
        self.list(startup_id, FinancialFilter::default()).await
    }

    /// Finds one record of a startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        startup_id: StartupId,
        id: FinancialRecordId,
    ) -> Result<Option<FinancialRecord>, DbErr> {
        let row = financial_records::Entity::find_by_id(id.into_inner())
            .filter(financial_records::Column::StartupId.eq(startup_id.into_inner()))
            .one(&self.db)
            .await?;
        Ok(row.map(FinancialRecord::from))
    }

    /// Inserts a validated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, record: &FinancialRecord) -> Result<FinancialRecord, DbErr> {
        let now = chrono::Utc::now().into();
        let (cogs, funding_source, attachment_key) = detail_columns(&record.details);

        let row = financial_records::ActiveModel {
            id: Set(record.id.into_inner()),
            startup_id: Set(record.startup_id.into_inner()),
            record_type: Set(record.record_type().into()),
            record_date: Set(record.record_date),
            entity: Set(record.entity.clone()),
            vertical: Set(record.vertical.clone()),
            amount: Set(record.amount),
            description: Set(record.description.clone()),
            cogs: Set(cogs),
            funding_source: Set(funding_source),
            attachment_key: Set(attachment_key),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Overwrites a validated record, including its type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(&self, record: &FinancialRecord) -> Result<FinancialRecord, DbErr> {
        let (cogs, funding_source, attachment_key) = detail_columns(&record.details);

        let row = financial_records::ActiveModel {
            id: Set(record.id.into_inner()),
            record_type: Set(record.record_type().into()),
            record_date: Set(record.record_date),
            entity: Set(record.entity.clone()),
            vertical: Set(record.vertical.clone()),
            amount: Set(record.amount),
            description: Set(record.description.clone()),
            cogs: Set(cogs),
            funding_source: Set(funding_source),
            attachment_key: Set(attachment_key),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .update(&self.db)
        .await?;
        Ok(row.into())
    }

    /// Deletes one record. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, startup_id: StartupId, id: FinancialRecordId) -> Result<bool, DbErr> {
        let result = financial_records::Entity::delete_many()
            .filter(financial_records::Column::Id.eq(id.into_inner()))
            .filter(financial_records::Column::StartupId.eq(startup_id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
