//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Bearer authentication middleware
//! - The JSON error envelope

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use runway_core::ledger::LedgerCadence;
use runway_core::storage::StorageService;
use runway_shared::config::AuthSettings;
use runway_shared::{EmailService, JwtService};

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Email service for reset mails.
    pub email_service: Arc<EmailService>,
    /// Storage service for contracts and invoices, when configured.
    pub storage: Option<Arc<StorageService>>,
    /// Login timeout and reset token lifetime.
    pub auth: AuthSettings,
    /// Spacing of generated ledger entries.
    pub ledger_cadence: LedgerCadence,
}

impl AppState {
    /// Upper bound for a sign-in round trip.
    #[must_use]
    pub const fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.auth.login_timeout_secs)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
