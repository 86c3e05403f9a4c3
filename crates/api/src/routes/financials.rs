//! Expense and revenue routes plus the aggregated financials view.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    routes::{current_startup, today, validate_amount},
};
use runway_core::currency::resolve_currency;
use runway_core::financials::{
    FinancialOverview, FinancialRecord, FinancialService, RecordDetails, RecordType, YearFilter,
};
use runway_core::storage::{StorageError, StorageService};
use runway_db::repositories::FinancialFilter;
use runway_db::{CapTableRepository, FinancialRepository};
use runway_shared::types::{FinancialRecordId, StartupId};

/// Creates the financials routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/financials", get(list_records).post(create_record))
        .route("/financials/overview", get(get_overview))
        .route(
            "/financials/{record_id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Listing and overview filters, as sent by the year and type selectors.
#[derive(Debug, Default, Deserialize)]
pub struct FinancialQuery {
    /// `all` or a calendar year.
    pub year: Option<String>,
    /// `expense` or `revenue`.
    #[serde(rename = "type")]
    pub record_type: Option<String>,
}

impl FinancialQuery {
    fn year_filter(&self) -> ApiResult<YearFilter> {
        Ok(self
            .year
            .as_deref()
            .map(YearFilter::from_str)
            .transpose()?
            .unwrap_or_default())
    }

    fn record_type(&self) -> ApiResult<Option<RecordType>> {
        Ok(self
            .record_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
            .map(RecordType::from_str)
            .transpose()?)
    }
}

/// Expense or revenue line.
#[derive(Debug, Deserialize, Validate)]
pub struct FinancialRecordRequest {
    /// Expense or revenue.
    pub record_type: RecordType,
    /// Date booked.
    pub record_date: NaiveDate,
    /// Legal entity.
    #[validate(length(max = 200))]
    pub entity: Option<String>,
    /// Business vertical.
    #[validate(length(min = 1, max = 200))]
    pub vertical: String,
    /// Gross amount.
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// Note.
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Expense only.
    pub funding_source: Option<String>,
    /// Expense only: storage key of the invoice.
    pub attachment_key: Option<String>,
    /// Revenue only: cost of goods sold.
    #[validate(custom(function = "validate_amount"))]
    pub cogs: Option<Decimal>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FinancialRecordRequest {
    fn into_record(
        self,
        id: FinancialRecordId,
        startup_id: StartupId,
    ) -> Result<FinancialRecord, StorageError> {
        let details = match self.record_type {
            RecordType::Expense => {
                let attachment_key = blank_to_none(self.attachment_key);
                if let Some(key) = attachment_key.as_deref()
                    && !StorageService::key_belongs_to(key, startup_id)
                {
                    return Err(StorageError::InvalidKey(key.to_string()));
                }
                RecordDetails::Expense {
                    funding_source: blank_to_none(self.funding_source),
                    attachment_key,
                }
            }
            RecordType::Revenue => RecordDetails::Revenue {
                cogs: self.cogs.unwrap_or(Decimal::ZERO),
            },
        };

        Ok(FinancialRecord {
            id,
            startup_id,
            record_date: self.record_date,
            entity: blank_to_none(self.entity),
            vertical: self.vertical.trim().to_string(),
            amount: self.amount,
            description: blank_to_none(self.description),
            details,
        })
    }
}

/// A record with derived gross profit.
#[derive(Debug, Serialize)]
pub struct RecordView {
    /// Stored record.
    #[serde(flatten)]
    pub record: FinancialRecord,
    /// `amount - cogs` for revenue.
    pub gross_profit: Option<Decimal>,
}

impl From<FinancialRecord> for RecordView {
    fn from(record: FinancialRecord) -> Self {
        Self {
            gross_profit: record.gross_profit(),
            record,
        }
    }
}

/// Totals over a listing.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ListingTotals {
    /// Sum of revenue amounts.
    pub revenue: Decimal,
    /// Sum of expense amounts.
    pub expense: Decimal,
    /// Sum of COGS.
    pub cogs: Decimal,
    /// `revenue - cogs`.
    pub gross_profit: Decimal,
}

impl ListingTotals {
    fn of(records: &[FinancialRecord]) -> Self {
        let mut totals = Self::default();
        for record in records {
            match record.record_type() {
                RecordType::Revenue => totals.revenue += record.amount,
                RecordType::Expense => totals.expense += record.amount,
            }
            totals.cogs += record.cogs();
        }
        totals.gross_profit = totals.revenue - totals.cogs;
        totals
    }
}

/// Filtered record listing.
#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    /// Display currency.
    pub currency: &'static str,
    /// Totals of the listed records.
    pub totals: ListingTotals,
    /// Records, newest first.
    pub records: Vec<RecordView>,
}

/// Aggregated view.
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    /// Display currency.
    pub currency: &'static str,
    /// Charts and funding.
    #[serde(flatten)]
    pub overview: FinancialOverview,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /financials - Records filtered by `year` and `type`.
async fn list_records(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FinancialQuery>,
) -> ApiResult<Json<RecordListResponse>> {
    let filter = FinancialFilter {
        year: match query.year_filter()? {
            YearFilter::All => None,
            YearFilter::Year(year) => Some(year),
        },
        record_type: query.record_type()?,
    };
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let records = FinancialRepository::new((*state.db).clone())
        .list(startup_id, filter)
        .await?;

    Ok(Json(RecordListResponse {
        currency: resolve_currency(startup.currency.as_deref(), startup.country.as_deref())
            .code(),
        totals: ListingTotals::of(&records),
        records: records.into_iter().map(RecordView::from).collect(),
    }))
}

/// GET /financials/overview - Monthly, vertical, entity and yearly totals with funding.
async fn get_overview(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FinancialQuery>,
) -> ApiResult<Json<OverviewResponse>> {
    let year = query.year_filter()?;
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let records_repo = FinancialRepository::new((*state.db).clone());
    let cap_tables = CapTableRepository::new((*state.db).clone());

    let (records, investments) = tokio::try_join!(
        records_repo.list_all(startup_id),
        cap_tables.list_investments(startup_id),
    )?;

    Ok(Json(OverviewResponse {
        currency: resolve_currency(startup.currency.as_deref(), startup.country.as_deref())
            .code(),
        overview: FinancialService::overview(
            &records,
            &investments,
            startup.total_funding,
            year,
            today(),
        ),
    }))
}

/// POST /financials - Book an expense or revenue line.
async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<FinancialRecordRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let record = payload.into_record(FinancialRecordId::new(), startup_id)?;
    record.validate()?;

    let created = FinancialRepository::new((*state.db).clone())
        .create(&record)
        .await?;

    info!(
        record_id = %created.id,
        record_type = created.record_type().as_str(),
        amount = %created.amount,
        "Financial record created"
    );
    Ok((StatusCode::CREATED, Json(RecordView::from(created))))
}

/// GET /financials/{record_id} - One record.
async fn get_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(record_id): Path<FinancialRecordId>,
) -> ApiResult<Json<RecordView>> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    FinancialRepository::new((*state.db).clone())
        .find(startup_id, record_id)
        .await?
        .map(|r| Json(RecordView::from(r)))
        .ok_or_else(|| ApiError::not_found("Financial record"))
}

/// PUT /financials/{record_id} - Edit a record.
async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(record_id): Path<FinancialRecordId>,
    Json(payload): Json<FinancialRecordRequest>,
) -> ApiResult<Json<RecordView>> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let repo = FinancialRepository::new((*state.db).clone());
    repo.find(startup_id, record_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Financial record"))?;

    let record = payload.into_record(record_id, startup_id)?;
    record.validate()?;
    let updated = repo.update(&record).await?;

    info!(record_id = %record_id, "Financial record updated");
    Ok(Json(RecordView::from(updated)))
}

/// DELETE /financials/{record_id} - Remove a record and its invoice.
async fn delete_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(record_id): Path<FinancialRecordId>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let repo = FinancialRepository::new((*state.db).clone());
    let record = repo
        .find(startup_id, record_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Financial record"))?;

    repo.delete(startup_id, record_id).await?;

    if let RecordDetails::Expense {
        attachment_key: Some(key),
        ..
    } = &record.details
        && let Some(storage) = &state.storage
        && let Err(e) = storage.delete(startup_id, key).await
    {
        warn!(error = %e, record_id = %record_id, "Failed to delete invoice file");
    }

    info!(record_id = %record_id, "Financial record deleted");
    Ok(StatusCode::NO_CONTENT)
}
