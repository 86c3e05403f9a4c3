//! API route definitions.

use axum::{Router, middleware};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::{AppState, error::ApiResult, middleware::AuthUser, middleware::auth_middleware};
use runway_db::StartupRepository;
use runway_db::entities::startups;
use runway_shared::types::StartupId;

pub mod attachments;
pub mod auth;
pub mod cap_table;
pub mod employees;
pub mod financials;
pub mod health;
pub mod startup;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require an access token
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(startup::routes())
        .merge(employees::routes())
        .merge(cap_table::routes())
        .merge(financials::routes())
        .merge(attachments::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

/// The caller's startup, created empty on first use.
pub(crate) async fn current_startup(
    state: &AppState,
    auth: &AuthUser,
) -> ApiResult<(StartupId, startups::Model)> {
    let startup = StartupRepository::new((*state.db).clone())
        .find_or_create_for_owner(auth.user_id())
        .await?;
    Ok((StartupId::from_uuid(startup.id), startup))
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Magnitude bound of the `NUMERIC(20, 2)` money columns.
const AMOUNT_LIMIT: i64 = 1_000_000_000_000_000_000;

/// Rejects amounts the money columns cannot hold.
pub(crate) fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.abs() < Decimal::from(AMOUNT_LIMIT) {
        return Ok(());
    }
    let mut err = ValidationError::new("amount_out_of_range");
    err.message = Some("Amount is too large".into());
    Err(err)
}


#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, response::Response};
    use http_body_util::BodyExt;
    use sea_orm::DatabaseConnection;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{AppState, create_router};
    use runway_core::ledger::LedgerCadence;
    use runway_shared::config::AuthSettings;
    use runway_shared::{EmailConfig, EmailService, JwtConfig, JwtService};

    /// State whose database is never reached by the tests using it.
    pub fn state() -> AppState {
        AppState {
            db: Arc::new(DatabaseConnection::default()),
            jwt_service: Arc::new(JwtService::new(JwtConfig {
                secret: "test-secret-key-that-is-long-enough".to_string(),
                ..JwtConfig::default()
            })),
            email_service: Arc::new(EmailService::new(EmailConfig::default())),
            storage: None,
            auth: AuthSettings::default(),
            ledger_cadence: LedgerCadence::Monthly,
        }
    }

    pub fn app(state: &AppState) -> Router {
        create_router(state.clone())
    }

    pub fn access_token(state: &AppState) -> String {
        state
            .jwt_service
            .generate_access_token(Uuid::new_v4(), None)
            .unwrap()
    }

    pub async fn send(app: Router, request: Request<Body>) -> Response {
        app.oneshot(request).await.unwrap()
    }

    pub async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
