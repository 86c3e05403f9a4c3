//! Runway API Server
//!
//! Main entry point for the Runway backend service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runway_api::{AppState, create_router};
use runway_core::ledger::LedgerCadence;
use runway_core::storage::{StorageConfig, StorageService};
use runway_db::{PasswordResetRepository, SessionRepository, connect_with_pool};
use runway_shared::{AppConfig, EmailService, JwtConfig, JwtService};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Deletes expired sessions and reset tokens once an hour.
fn spawn_cleanup(db: DatabaseConnection) {
    tokio::spawn(async move {
        let sessions = SessionRepository::new(db.clone());
        let resets = PasswordResetRepository::new(db);
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

        loop {
            interval.tick().await;
            match tokio::try_join!(sessions.cleanup_expired(), resets.cleanup_expired()) {
                Ok((expired_sessions, expired_tokens)) if expired_sessions + expired_tokens > 0 => {
                    info!(expired_sessions, expired_tokens, "Expired credentials removed");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Credential cleanup failed"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    // Create JWT service
    let jwt_config = JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)?,
        refresh_token_expires_days: i64::try_from(config.jwt.refresh_token_expiry_secs / 86400)?,
        recovery_token_expires_minutes: config.auth.reset_token_ttl_minutes,
    };
    let jwt_service = JwtService::new(jwt_config);

    // Create email service
    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    // Storage is optional; attachment routes answer 503 without it
    let storage = match &config.storage {
        Some(settings) => {
            let service = StorageService::from_config(StorageConfig::from_settings(settings))?;
            info!(provider = service.provider_name(), "Storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("Storage not configured, attachments disabled");
            None
        }
    };

    let ledger_cadence: LedgerCadence = config.ledger.cadence.parse()?;
    info!(cadence = %ledger_cadence, "Ledger cadence");

    spawn_cleanup(db.clone());

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        email_service: Arc::new(email_service),
        storage,
        auth: config.auth.clone(),
        ledger_cadence,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
