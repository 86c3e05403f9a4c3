//! Cap table and investment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
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
    routes::{current_startup, validate_amount},
};
use runway_core::cap_table::{CapTable, Investment, total_invested};
use runway_core::currency::resolve_currency;
use runway_core::esop::{EsopService, EsopSummary};
use runway_db::{CapTableRepository, LedgerRepository};
use runway_shared::types::{InvestmentId, StartupId};

/// Creates the cap table routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cap-table", get(get_cap_table).put(update_cap_table))
        .route(
            "/cap-table/investments",
            get(list_investments).post(create_investment),
        )
        .route(
            "/cap-table/investments/{investment_id}",
            get(get_investment)
                .put(update_investment)
                .delete(delete_investment),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Investment fields.
#[derive(Debug, Deserialize, Validate)]
pub struct InvestmentRequest {
    /// Investor name.
    #[validate(length(min = 1, max = 200))]
    pub investor_name: String,
    /// Round label.
    #[validate(length(max = 100))]
    pub round: Option<String>,
    /// Amount invested.
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// Date the money arrived.
    pub invested_on: NaiveDate,
    /// Shares issued.
    #[validate(custom(function = "validate_amount"))]
    pub shares_issued: Option<Decimal>,
}

impl InvestmentRequest {
    fn into_investment(self, id: InvestmentId, startup_id: StartupId) -> Investment {
        Investment {
            id,
            startup_id,
            investor_name: self.investor_name.trim().to_string(),
            round: self
                .round
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            amount: self.amount,
            invested_on: self.invested_on,
            shares_issued: self.shares_issued,
        }
    }
}

/// Cap table with derived figures.
#[derive(Debug, Serialize)]
pub struct CapTableResponse {
    /// Display currency.
    pub currency: &'static str,
    /// Stored share structure.
    #[serde(flatten)]
    pub cap_table: CapTable,
    /// Valuation divided by total shares.
    pub price_per_share: Decimal,
    /// ESOP pool metrics.
    pub esop: EsopSummary,
    /// Sum of investments.
    pub total_invested: Decimal,
    /// Investments, newest first.
    pub investments: Vec<Investment>,
}

/// Investment list.
#[derive(Debug, Serialize)]
pub struct InvestmentListResponse {
    /// Investments, newest first.
    pub investments: Vec<Investment>,
    /// Sum of amounts.
    pub total_invested: Decimal,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /cap-table - Share structure, pool metrics and investments.
async fn get_cap_table(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<CapTableResponse>> {
    let (startup_id, startup) = current_startup(&state, &auth).await?;
    let repo = CapTableRepository::new((*state.db).clone());
    let ledger = LedgerRepository::new((*state.db).clone());

    let (cap_table, investments, allocated) = tokio::try_join!(
        repo.get(startup_id),
        repo.list_investments(startup_id),
        ledger.allocated_shares(startup_id),
    )?;

    Ok(Json(CapTableResponse {
        currency: resolve_currency(startup.currency.as_deref(), startup.country.as_deref())
            .code(),
        price_per_share: cap_table.price_per_share(),
        esop: EsopService::summarize(&cap_table, allocated),
        total_invested: total_invested(&investments),
        cap_table,
        investments,
    }))
}

/// PUT /cap-table - Replace the share structure.
///
/// Terms already granted keep the price they were set at.
async fn update_cap_table(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CapTable>,
) -> ApiResult<Json<CapTable>> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;

    CapTableRepository::new((*state.db).clone())
        .upsert(startup_id, &payload)
        .await?;

    let allocated = LedgerRepository::new((*state.db).clone())
        .allocated_shares(startup_id)
        .await?;
    let summary = EsopService::summarize(&payload, allocated);
    if summary.is_over_allocated {
        warn!(
            startup_id = %startup_id,
            reserved_shares = %summary.reserved_shares,
            allocated_shares = %summary.allocated_shares,
            "ESOP pool is over-allocated after cap table change"
        );
    }

    info!(
        startup_id = %startup_id,
        price_per_share = %payload.price_per_share(),
        "Cap table updated"
    );
    Ok(Json(payload))
}

/// GET /cap-table/investments - All investments.
async fn list_investments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<InvestmentListResponse>> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let investments = CapTableRepository::new((*state.db).clone())
        .list_investments(startup_id)
        .await?;

    Ok(Json(InvestmentListResponse {
        total_invested: total_invested(&investments),
        investments,
    }))
}

/// POST /cap-table/investments - Record an investment.
async fn create_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<InvestmentRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let investment = payload.into_investment(InvestmentId::new(), startup_id);
    investment.validate()?;

    let created = CapTableRepository::new((*state.db).clone())
        .create_investment(&investment)
        .await?;

    info!(investment_id = %created.id, amount = %created.amount, "Investment recorded");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /cap-table/investments/{investment_id} - One investment.
async fn get_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(investment_id): Path<InvestmentId>,
) -> ApiResult<Json<Investment>> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    CapTableRepository::new((*state.db).clone())
        .find_investment(startup_id, investment_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Investment"))
}

/// PUT /cap-table/investments/{investment_id} - Edit an investment.
async fn update_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(investment_id): Path<InvestmentId>,
    Json(payload): Json<InvestmentRequest>,
) -> ApiResult<Json<Investment>> {
    payload.validate()?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let repo = CapTableRepository::new((*state.db).clone());
    repo.find_investment(startup_id, investment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Investment"))?;

    let investment = payload.into_investment(investment_id, startup_id);
    investment.validate()?;
    let updated = repo.update_investment(&investment).await?;

    info!(investment_id = %investment_id, "Investment updated");
    Ok(Json(updated))
}

/// DELETE /cap-table/investments/{investment_id} - Remove an investment.
async fn delete_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(investment_id): Path<InvestmentId>,
) -> ApiResult<StatusCode> {
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let removed = CapTableRepository::new((*state.db).clone())
        .delete_investment(startup_id, investment_id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Investment"));
    }

    info!(investment_id = %investment_id, "Investment deleted");
    Ok(StatusCode::NO_CONTENT)
}
