//! HTTP error responses.
//!
//! Every handler returns [`ApiResult`]. Errors render as
//! `{"error": CODE, "message": ...}` with the status taken from the
//! underlying [`AppError`]. Server faults are logged and answered with a
//! generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use runway_core::auth::{PasswordError, ResetTokenError};
use runway_core::cap_table::CapTableError;
use runway_core::employee::EmployeeError;
use runway_core::esop::EsopError;
use runway_core::financials::FinancialError;
use runway_core::ledger::LedgerError;
use runway_core::storage::StorageError;
use runway_db::repositories::PasswordResetError;
use runway_shared::{AppError, EmailError, JwtError};

/// Result type of every handler.
pub type ApiResult<T> = Result<T, ApiError>;

const GENERIC_MESSAGE: &str = "An internal error occurred";

/// An [`AppError`] plus the code reported to the client.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApiError {
    error: AppError,
    code: &'static str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl ApiError {
    /// Wraps an error with its default code.
    #[must_use]
    pub const fn new(error: AppError) -> Self {
        let code = error.error_code();
        Self { error, code }
    }

    /// Wraps an error with a specific code.
    #[must_use]
    pub const fn with_code(error: AppError, code: &'static str) -> Self {
        Self { error, code }
    }

    /// 404 for a missing resource.
    #[must_use]
    pub fn not_found(what: &str) -> Self {
        Self::new(AppError::NotFound(format!("{what} not found")))
    }

    /// 401 with a specific code.
    #[must_use]
    pub fn unauthorized(code: &'static str, message: &str) -> Self {
        Self::with_code(AppError::Unauthorized(message.to_string()), code)
    }

    /// 400 with a specific code.
    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::with_code(AppError::Validation(message.into()), code)
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Code reported in the body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.error.is_server_fault() {
            error!(code = self.code, error = %self.error, "Request failed");
            GENERIC_MESSAGE.to_string()
        } else {
            self.error.message().to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: self.code,
                message,
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::new(err)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::new(AppError::Database(err.to_string()))
    }
}

/// Domain errors that carry their own code.
macro_rules! coded_errors {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    let code = err.error_code();
                    Self::with_code(err.into(), code)
                }
            }
        )*
    };
}

coded_errors!(
    EsopError,
    EmployeeError,
    LedgerError,
    FinancialError,
    ResetTokenError,
    StorageError,
);

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        let code = match err {
            PasswordError::TooShort { .. } => "PASSWORD_TOO_SHORT",
            PasswordError::Mismatch => "PASSWORD_MISMATCH",
            _ => "INTERNAL_ERROR",
        };
        Self::with_code(err.into(), code)
    }
}

impl From<CapTableError> for ApiError {
    fn from(err: CapTableError) -> Self {
        Self::with_code(err.into(), "INVALID_CAP_TABLE")
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("TOKEN_EXPIRED", "Token has expired"),
            JwtError::DecodingError(_) | JwtError::WrongKind { .. } => {
                Self::unauthorized("INVALID_TOKEN", "Invalid or malformed token")
            }
            JwtError::EncodingError(_) => Self::new(AppError::Internal(err.to_string())),
        }
    }
}

impl From<PasswordResetError> for ApiError {
    fn from(err: PasswordResetError) -> Self {
        match err {
            PasswordResetError::Invalid => ResetTokenError::Invalid.into(),
            PasswordResetError::Expired => ResetTokenError::Expired.into(),
            PasswordResetError::Database(db) => db.into(),
        }
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        Self::new(AppError::ExternalService(err.to_string()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::new(AppError::Validation(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rust_decimal_macros::dec;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_domain_code_survives() {
        let err = ApiError::from(EsopError::ExceedsReserve {
            reserved: dec!(10000),
            allocated: dec!(6000),
            proposed: dec!(5000),
        });
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "ESOP_EXCEEDS_RESERVE");
        assert!(body["message"].as_str().unwrap().starts_with("ESOP allocation exceeds"));
    }

    #[tokio::test]
    async fn test_database_detail_is_hidden() {
        let err = ApiError::from(DbErr::Custom("relation \"users\" does not exist".into()));
        let (status, body) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], GENERIC_MESSAGE);
    }

    #[test]
    fn test_reset_token_codes() {
        assert_eq!(
            ApiError::from(PasswordResetError::Expired).code(),
            "RESET_TOKEN_INVALID"
        );
        assert_eq!(
            ApiError::from(ResetTokenError::NoCredential).code(),
            "RESET_TOKEN_MISSING"
        );
        assert_eq!(
            ApiError::from(ResetTokenError::NoCredential).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_jwt_errors_are_unauthorized() {
        let err = ApiError::from(JwtError::Expired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn test_password_policy_codes() {
        let err = ApiError::from(PasswordError::TooShort { min: 8 });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "PASSWORD_TOO_SHORT");
    }
}
