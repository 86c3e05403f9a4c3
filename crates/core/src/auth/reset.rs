//! Password-reset link parsing.
//!
//! A reset link can reach the client in several shapes: a session pair in the
//! URL fragment, a one-time `token_hash` with `type=recovery`, an
//! authorization `code`, or nothing at all when the user already holds a
//! session. The parameters are parsed once into [`ResetCredential`]
//! candidates which are then tried in a fixed order.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use runway_shared::AppError;
use runway_shared::types::UserId;

/// Link type accepted for one-time tokens.
pub const RECOVERY_TYPE: &str = "recovery";

/// Reset flow errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResetTokenError {
    /// The identity provider put an error in the link.
    #[error("Reset link was rejected: {0}")]
    LinkRejected(String),

    /// No recognizable credential in the link and no session.
    #[error("Reset link is missing its token; request a new one")]
    NoCredential,

    /// A single candidate failed verification.
    #[error("Reset credential is invalid")]
    Invalid,

    /// A single candidate has expired or was already used.
    #[error("Reset credential has expired")]
    Expired,

    /// Every candidate failed.
    #[error("Reset link is invalid or has expired; request a new one")]
    NoneSucceeded {
        /// Number of candidates tried.
        attempts: usize,
    },
}

impl ResetTokenError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LinkRejected(_) => "RESET_LINK_REJECTED",
            Self::NoCredential => "RESET_TOKEN_MISSING",
            Self::Invalid | Self::Expired | Self::NoneSucceeded { .. } => "RESET_TOKEN_INVALID",
        }
    }
}

impl From<ResetTokenError> for AppError {
    fn from(err: ResetTokenError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Raw parameters of a reset link, from the query string or the fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResetParams {
    /// Session access token.
    pub access_token: Option<String>,
    /// Session refresh token.
    pub refresh_token: Option<String>,
    /// One-time token.
    pub token_hash: Option<String>,
    /// Older spelling of `token_hash`.
    pub token: Option<String>,
    /// Link type, `recovery` for password resets.
    #[serde(rename = "type")]
    pub link_type: Option<String>,
    /// Authorization code.
    pub code: Option<String>,
    /// Provider error code.
    pub error: Option<String>,
    /// Provider error text.
    pub error_description: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ResetParams {
    /// Fields from `self` win; `fallback` fills the gaps.
    #[must_use]
    pub fn merge(self, fallback: Self) -> Self {
        Self {
            access_token: present(self.access_token).or(fallback.access_token),
            refresh_token: present(self.refresh_token).or(fallback.refresh_token),
            token_hash: present(self.token_hash).or(fallback.token_hash),
            token: present(self.token).or(fallback.token),
            link_type: present(self.link_type).or(fallback.link_type),
            code: present(self.code).or(fallback.code),
            error: present(self.error).or(fallback.error),
            error_description: present(self.error_description).or(fallback.error_description),
        }
    }
}

/// One way of proving the right to reset a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetCredential {
    /// Access and refresh token pair.
    SessionPair {
        /// Access token.
        access_token: String,
        /// Refresh token.
        refresh_token: String,
    },
    /// One-time token from the reset email.
    PkceToken {
        /// Raw token.
        token_hash: String,
    },
    /// Authorization code to exchange.
    AuthorizationCode {
        /// Code.
        code: String,
    },
    /// Session the client already holds.
    ExistingSession {
        /// Access token.
        access_token: String,
    },
}

impl ResetCredential {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SessionPair { .. } => "session_pair",
            Self::PkceToken { .. } => "pkce_token",
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::ExistingSession { .. } => "existing_session",
        }
    }
}

/// Turns link parameters and an optional bearer token into candidates in
/// precedence order: session pair, one-time token, code, existing session.
///
/// # Errors
///
/// Returns `LinkRejected` when the link carries an error and `NoCredential`
/// when nothing usable is present.
pub fn resolve_candidates(
    params: ResetParams,
    bearer: Option<&str>,
) -> Result<Vec<ResetCredential>, ResetTokenError> {
    let params = params.merge(ResetParams::default());
    if let Some(error) = params.error {
        return Err(ResetTokenError::LinkRejected(
            params.error_description.unwrap_or(error),
        ));
    }

    let mut candidates = Vec::new();
    let mut lone_access = None;

    match (params.access_token, params.refresh_token) {
        (Some(access_token), Some(refresh_token)) => {
            candidates.push(ResetCredential::SessionPair {
                access_token,
                refresh_token,
            });
        }
        (Some(access_token), None) => lone_access = Some(access_token),
        _ => {}
    }

    let is_recovery = params
        .link_type
        .as_deref()
        .is_none_or(|t| t.eq_ignore_ascii_case(RECOVERY_TYPE));
    if is_recovery && let Some(token_hash) = params.token_hash.or(params.token) {
        candidates.push(ResetCredential::PkceToken { token_hash });
    }

    if let Some(code) = params.code {
        candidates.push(ResetCredential::AuthorizationCode { code });
    }

    let session = bearer
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .or(lone_access);
    if let Some(access_token) = session {
        candidates.push(ResetCredential::ExistingSession { access_token });
    }

    if candidates.is_empty() {
        return Err(ResetTokenError::NoCredential);
    }
    Ok(candidates)
}

/// Checks one candidate against the token stores.
pub trait CredentialVerifier {
    /// Returns the user the credential belongs to.
    fn verify(
        &self,
        credential: &ResetCredential,
    ) -> impl Future<Output = Result<UserId, ResetTokenError>> + Send;
}

/// Tries candidates in order and returns the first user that verifies,
/// together with the credential that worked.
///
/// # Errors
///
/// Returns `NoCredential` for an empty list and `NoneSucceeded` when every
/// candidate fails.
pub async fn resolve_user<V>(
    candidates: Vec<ResetCredential>,
    verifier: &V,
) -> Result<(UserId, ResetCredential), ResetTokenError>
where
    V: CredentialVerifier + Sync,
{
    if candidates.is_empty() {
        return Err(ResetTokenError::NoCredential);
    }
    let attempts = candidates.len();
    for candidate in candidates {
        if let Ok(user_id) = verifier.verify(&candidate).await {
            return Ok((user_id, candidate));
        }
    }
    Err(ResetTokenError::NoneSucceeded { attempts })
}
