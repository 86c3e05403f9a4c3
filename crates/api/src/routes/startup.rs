//! Startup profile routes and the registration-completion step.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    routes::{current_startup, validate_amount},
};
use runway_core::auth::{NextStep, ProfileStatus};
use runway_core::currency::resolve_currency;
use runway_db::entities::{startups, users};
use runway_db::repositories::UpdateStartupInput;
use runway_db::{StartupRepository, UserRepository};
use runway_shared::types::Currency;

/// Creates the startup routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/startup", get(get_startup).put(update_startup))
        .route("/startup/complete-registration", post(complete_registration))
}

/// Profile update. Absent fields stay as they are.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStartupRequest {
    /// Company name.
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    /// Country name or ISO code.
    #[validate(length(min = 2, max = 100))]
    pub country: Option<String>,
    /// ISO currency code.
    pub currency: Option<String>,
    /// Company registration date.
    pub registration_date: Option<NaiveDate>,
    /// Total funding raised, used while no investments are recorded.
    #[validate(custom(function = "validate_amount"))]
    pub total_funding: Option<Decimal>,
}

/// Fields the profile gate asks for after sign-in.
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRegistrationRequest {
    /// Identity document reference of the founder.
    #[validate(length(min = 1, max = 200, message = "Identity document is required"))]
    pub identity_document: String,
    /// Company name.
    #[validate(length(min = 1, max = 200, message = "Company name is required"))]
    pub company_name: String,
    /// Country name or ISO code.
    #[validate(length(min = 2, max = 100, message = "Country is required"))]
    pub country: String,
    /// Company registration date.
    pub registration_date: Option<NaiveDate>,
}

/// Startup profile.
#[derive(Debug, Serialize)]
pub struct StartupResponse {
    /// Startup ID.
    pub id: Uuid,
    /// Company name.
    pub company_name: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Currency figures are shown in.
    pub currency: &'static str,
    /// Symbol of that currency.
    pub currency_symbol: &'static str,
    /// Registration date.
    pub registration_date: Option<NaiveDate>,
    /// Stored total funding.
    pub total_funding: Option<Decimal>,
    /// Whether the founder's identity document is on file.
    pub has_identity_document: bool,
    /// Where the client goes next.
    pub next_step: NextStep,
}

impl StartupResponse {
    fn new(startup: startups::Model, user: &users::Model) -> Self {
        let currency = resolve_currency(startup.currency.as_deref(), startup.country.as_deref());
        let next_step = ProfileStatus {
            identity_document: user.identity_document.as_deref(),
            company_name: startup.company_name.as_deref(),
            country: startup.country.as_deref(),
        }
        .next_step();

        Self {
            id: startup.id,
            company_name: startup.company_name,
            country: startup.country,
            currency: currency.code(),
            currency_symbol: currency.symbol(),
            registration_date: startup.registration_date,
            total_funding: startup.total_funding,
            has_identity_document: user
                .identity_document
                .as_deref()
                .is_some_and(|d| !d.trim().is_empty()),
            next_step,
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

async fn load_user(state: &AppState, auth: &AuthUser) -> ApiResult<users::Model> {
    UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

/// GET /startup - The caller's startup profile.
async fn get_startup(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<StartupResponse>> {
    let (_, startup) = current_startup(&state, &auth).await?;
    let user = load_user(&state, &auth).await?;
    Ok(Json(StartupResponse::new(startup, &user)))
}

/// PUT /startup - Edit the startup profile.
async fn update_startup(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateStartupRequest>,
) -> ApiResult<Json<StartupResponse>> {
    payload.validate()?;
    if let Some(code) = payload.currency.as_deref() {
        Currency::from_str(code).map_err(|msg| ApiError::bad_request("UNKNOWN_CURRENCY", msg))?;
    }
    if payload.total_funding.is_some_and(|f| f < Decimal::ZERO) {
        return Err(ApiError::bad_request(
            "NEGATIVE_FUNDING",
            "Total funding cannot be negative",
        ));
    }

    let (_, startup) = current_startup(&state, &auth).await?;
    let updated = StartupRepository::new((*state.db).clone())
        .update_profile(
            startup.id,
            UpdateStartupInput {
                company_name: trimmed(payload.company_name),
                country: trimmed(payload.country),
                currency: trimmed(payload.currency),
                registration_date: payload.registration_date,
                total_funding: payload.total_funding,
            },
        )
        .await?;
    let user = load_user(&state, &auth).await?;

    info!(startup_id = %updated.id, "Startup profile updated");
    Ok(Json(StartupResponse::new(updated, &user)))
}

/// POST /startup/complete-registration - Fill in what the profile gate asked for.
async fn complete_registration(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CompleteRegistrationRequest>,
) -> ApiResult<Json<StartupResponse>> {
    payload.validate()?;
    let identity_document = payload.identity_document.trim().to_string();
    if identity_document.is_empty() {
        return Err(ApiError::bad_request(
            "VALIDATION_ERROR",
            "Identity document is required",
        ));
    }

    let (_, startup) = current_startup(&state, &auth).await?;
    let user = UserRepository::new((*state.db).clone())
        .set_identity_document(auth.user_id(), Some(identity_document))
        .await?;
    let updated = StartupRepository::new((*state.db).clone())
        .update_profile(
            startup.id,
            UpdateStartupInput {
                company_name: Some(payload.company_name.trim().to_string()),
                country: Some(payload.country.trim().to_string()),
                registration_date: payload.registration_date,
                ..UpdateStartupInput::default()
            },
        )
        .await?;

    let response = StartupResponse::new(updated, &user);
    info!(
        user_id = %user.id,
        complete = matches!(response.next_step, NextStep::Dashboard),
        "Registration details saved"
    );
    Ok(Json(response))
}
