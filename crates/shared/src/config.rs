//! Application configuration management.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// SMTP configuration for password reset mail.
    #[serde(default)]
    pub email: EmailConfig,
    /// Login and password reset behaviour.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Employee ledger generation.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Attachment storage. Attachments are disabled when absent.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Base URL of the web client, used to build reset links.
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "no-reply@runway.local".to_string(),
            from_name: "Runway".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Login and password reset settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Upper bound for a sign-in round trip before the client is told to reload.
    #[serde(default = "default_login_timeout")]
    pub login_timeout_secs: u64,
    /// Lifetime of a password reset token.
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_minutes: i64,
}

fn default_login_timeout() -> u64 {
    30
}

fn default_reset_token_ttl() -> i64 {
    60
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_timeout_secs: default_login_timeout(),
            reset_token_ttl_minutes: default_reset_token_ttl(),
        }
    }
}

/// Employee ledger settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// `daily` or `monthly`.
    #[serde(default = "default_cadence")]
    pub cadence: String,
}

fn default_cadence() -> String {
    "monthly".to_string()
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            cadence: default_cadence(),
        }
    }
}

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Supabase Storage, Cloudflare R2, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

/// Attachment storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend to talk to.
    pub provider: StorageProvider,
    /// Maximum upload size in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `RUNWAY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("RUNWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test")),
                ("RUNWAY__DATABASE__URL", Some("postgres://localhost/runway")),
                ("RUNWAY__JWT__SECRET", Some("env-secret")),
                ("RUNWAY__SERVER__PORT", Some("9100")),
                ("RUNWAY__AUTH__LOGIN_TIMEOUT_SECS", Some("12")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/runway");
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.server.port, 9100);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.auth.login_timeout_secs, 12);
                assert_eq!(config.auth.reset_token_ttl_minutes, 60);
                assert_eq!(config.ledger.cadence, "monthly");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert!(config.storage.is_none());
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test")),
                ("RUNWAY__DATABASE__URL", None::<&str>),
                ("RUNWAY__JWT__SECRET", Some("env-secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_storage_provider_tagged() {
        let provider: StorageProvider =
            serde_json::from_str(r#"{"type":"local_fs","root":"./storage"}"#).unwrap();
        assert!(matches!(provider, StorageProvider::LocalFs { .. }));
    }
}
