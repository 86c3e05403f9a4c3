//! Authentication routes: sign-in, session restore, logout and password reset.
//!
//! Password reset runs in two steps. `POST /auth/recovery` receives the
//! query string and fragment of the link the user opened, works out which
//! credential the link carries and answers with a short-lived recovery
//! token. `POST /auth/reset-password` takes that token as a bearer and sets
//! the new password. Each recovery token is backed by a single-use grant in
//! the reset token table, so it works once.

use std::future::Future;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, bearer_token},
};
use runway_core::auth::{
    CredentialVerifier, NextStep, ProfileStatus, ResetCredential, ResetParams, ResetTokenError,
    check_password_policy, hash_password, resolve_candidates, resolve_user, verify_password,
};
use runway_db::entities::{startups, users};
use runway_db::repositories::PasswordResetError;
use runway_db::{PasswordResetRepository, SessionRepository, StartupRepository, UserRepository};
use runway_shared::types::UserId;
use runway_shared::{AppError, JwtError, TokenKind, TokenPair};

const LOGIN_TIMEOUT_MESSAGE: &str =
    "Sign-in is taking longer than expected; reload the page and try again";

/// Routes reachable without a token.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/session", post(restore_session))
        .route("/auth/logout", post(logout))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/recovery", post(recover))
        .route("/auth/reset-password", post(reset_password))
}

/// Routes that need an access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/sessions", get(list_sessions))
        .route("/auth/logout-all", post(logout_all))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Sign-in credentials.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// New account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Account email.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    /// Password.
    pub password: String,
    /// Password again.
    pub confirm_password: String,
    /// Founder's name.
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
}

/// Body carrying a refresh token.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from the last sign-in.
    pub refresh_token: String,
}

/// Reset mail request.
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    /// Account email.
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// The reset link as the client saw it.
#[derive(Debug, Default, Deserialize)]
pub struct RecoveryRequest {
    /// Query string, with or without the leading `?`.
    #[serde(default)]
    pub query: String,
    /// Hash fragment, with or without the leading `#`.
    #[serde(default)]
    pub fragment: String,
}

/// New password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// Password.
    pub password: String,
    /// Password again.
    pub confirm_password: String,
}

/// Public user fields.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Full name.
    pub full_name: String,
}

impl From<&users::Model> for UserInfo {
    fn from(user: &users::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Answer to a successful sign-in or session restore.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The user.
    pub user: UserInfo,
    /// The user's startup.
    pub startup_id: Uuid,
    /// Fresh token pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// Where the client goes next.
    pub next_step: NextStep,
}

/// Answer to `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The user.
    pub user: UserInfo,
    /// The user's startup.
    pub startup_id: Uuid,
    /// Where the client goes next.
    pub next_step: NextStep,
}

/// One signed-in device.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// Session ID.
    pub id: Uuid,
    /// Client that opened it.
    pub user_agent: Option<String>,
    /// Sign-in time.
    pub created_at: DateTime<FixedOffset>,
    /// Expiry.
    pub expires_at: DateTime<FixedOffset>,
}

/// Verified reset link.
#[derive(Debug, Serialize)]
pub struct RecoveryResponse {
    /// Bearer for `POST /auth/reset-password`.
    pub recovery_token: String,
    /// Which credential in the link was accepted.
    pub verified_with: &'static str,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Text for the user.
    pub message: &'static str,
}

// ============================================================================
// Helpers
// ============================================================================

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password")
}

fn session_expired() -> ApiError {
    ApiError::unauthorized("SESSION_EXPIRED", "Your session has ended; sign in again")
}

fn account_disabled() -> ApiError {
    ApiError::with_code(
        AppError::Forbidden("This account has been disabled".to_string()),
        "ACCOUNT_DISABLED",
    )
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
}

fn next_step(user: &users::Model, startup: &startups::Model) -> NextStep {
    ProfileStatus {
        identity_document: user.identity_document.as_deref(),
        company_name: startup.company_name.as_deref(),
        country: startup.country.as_deref(),
    }
    .next_step()
}

/// Runs a sign-in future under the configured time limit.
async fn with_login_timeout<F, T>(limit: Duration, attempt: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    tokio::time::timeout(limit, attempt).await.map_err(|_| {
        warn!(timeout_secs = limit.as_secs(), "Sign-in timed out");
        ApiError::with_code(
            AppError::Timeout(LOGIN_TIMEOUT_MESSAGE.to_string()),
            "LOGIN_TIMEOUT",
        )
    })?
}

/// Issues a token pair, records the session and evaluates the profile gate.
async fn start_session(
    state: &AppState,
    user: &users::Model,
    user_agent: Option<&str>,
) -> ApiResult<AuthResponse> {
    let startup = StartupRepository::new((*state.db).clone())
        .find_or_create_for_owner(user.id)
        .await?;

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, Some(startup.id))?;
    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id, Some(startup.id))?;
    let expires_at =
        Utc::now() + chrono::Duration::days(state.jwt_service.refresh_token_expires_days());

    SessionRepository::new((*state.db).clone())
        .create(user.id, &refresh_token, expires_at, user_agent)
        .await?;

    Ok(AuthResponse {
        user: UserInfo::from(user),
        startup_id: startup.id,
        next_step: next_step(user, &startup),
        tokens: TokenPair::new(
            access_token,
            refresh_token,
            state.jwt_service.access_token_expires_in(),
        ),
    })
}

async fn authenticate(
    state: &AppState,
    payload: &LoginRequest,
    user_agent: Option<&str>,
) -> ApiResult<AuthResponse> {
    let user_repo = UserRepository::new((*state.db).clone());

    let Some(user) = user_repo.find_by_email(&payload.email).await? else {
        info!(email = %payload.email, "Login attempt for non-existent user");
        return Err(invalid_credentials());
    };
    if !user.is_active {
        return Err(account_disabled());
    }
    if !verify_password(&payload.password, &user.password_hash)? {
        info!(user_id = %user.id, "Failed login attempt - invalid password");
        return Err(invalid_credentials());
    }

    start_session(state, &user, user_agent).await
}

fn parse_link_params(raw: &str) -> ApiResult<ResetParams> {
    let trimmed = raw.trim().trim_start_matches(['?', '#']);
    serde_urlencoded::from_str(trimmed).map_err(|e| {
        ApiError::bad_request(
            "MALFORMED_RESET_LINK",
            format!("Reset link parameters are malformed: {e}"),
        )
    })
}

fn reset_error_from_jwt(err: &JwtError) -> ResetTokenError {
    match err {
        JwtError::Expired => ResetTokenError::Expired,
        _ => ResetTokenError::Invalid,
    }
}

/// Spends a single-use token from the reset token table.
async fn consume_reset_token(state: &AppState, raw: &str) -> Result<Uuid, ResetTokenError> {
    PasswordResetRepository::new((*state.db).clone())
        .consume_token(raw)
        .await
        .map_err(|e| match e {
            PasswordResetError::Expired => ResetTokenError::Expired,
            PasswordResetError::Invalid => ResetTokenError::Invalid,
            PasswordResetError::Database(err) => {
                error!(error = %err, "Reset token lookup failed");
                ResetTokenError::Invalid
            }
        })
}

/// Checks reset credentials against the JWT service and the token tables.
///
/// One-time tokens and authorization codes are both spent from the reset
/// token table; a recovery token is never accepted as a code.
struct TokenStores<'a> {
    state: &'a AppState,
}

impl CredentialVerifier for TokenStores<'_> {
    async fn verify(&self, credential: &ResetCredential) -> Result<UserId, ResetTokenError> {
        let jwt = &self.state.jwt_service;
        let user_id = match credential {
            ResetCredential::SessionPair {
                access_token,
                refresh_token,
            } => {
                let claims = jwt
                    .validate_kind(access_token, TokenKind::Access)
                    .map_err(|e| reset_error_from_jwt(&e))?;
                let session = SessionRepository::new((*self.state.db).clone())
                    .find_active_by_token(refresh_token)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Session lookup failed during recovery");
                        ResetTokenError::Invalid
                    })?
                    .ok_or(ResetTokenError::Expired)?;
                if session.user_id != claims.user_id() {
                    return Err(ResetTokenError::Invalid);
                }
                claims.user_id()
            }
            ResetCredential::PkceToken { token_hash } => {
                consume_reset_token(self.state, token_hash).await?
            }
            ResetCredential::AuthorizationCode { code } => {
                consume_reset_token(self.state, code).await?
            }
            ResetCredential::ExistingSession { access_token } => jwt
                .validate_kind(access_token, TokenKind::Access)
                .map_err(|e| reset_error_from_jwt(&e))?
                .user_id(),
        };
        Ok(UserId::from_uuid(user_id))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register - Create an account and sign it in.
async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;
    check_password_policy(&payload.password, &payload.confirm_password)?;

    let user_repo = UserRepository::new((*state.db).clone());
    if user_repo.email_exists(&payload.email).await? {
        return Err(ApiError::with_code(
            AppError::Conflict("An account with this email already exists".to_string()),
            "EMAIL_TAKEN",
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = user_repo
        .create(&payload.email, &password_hash, payload.full_name.trim())
        .await?;
    info!(user_id = %user.id, "User registered");

    let response = start_session(&state, &user, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login - Exchange credentials for tokens.
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    let response = with_login_timeout(
        state.login_timeout(),
        authenticate(&state, &payload, user_agent(&headers)),
    )
    .await?;

    info!(user_id = %response.user.id, "User logged in successfully");
    Ok(Json(response))
}

/// POST /auth/session - Restore a session from a refresh token.
///
/// The old refresh token is revoked and a new pair issued.
async fn restore_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = state
        .jwt_service
        .validate_kind(&payload.refresh_token, TokenKind::Refresh)?;

    let sessions = SessionRepository::new((*state.db).clone());
    let session = sessions
        .find_active_by_token(&payload.refresh_token)
        .await?
        .filter(|s| s.user_id == claims.user_id())
        .ok_or_else(session_expired)?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(session_expired)?;
    if !user.is_active {
        return Err(account_disabled());
    }

    sessions.revoke(session.id).await?;
    let response = start_session(&state, &user, user_agent(&headers)).await?;
    info!(user_id = %user.id, "Session restored");
    Ok(Json(response))
}

/// GET /auth/me - The signed-in user and the profile gate.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<MeResponse>> {
    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(session_expired)?;
    let startup = StartupRepository::new((*state.db).clone())
        .find_or_create_for_owner(user.id)
        .await?;

    Ok(Json(MeResponse {
        user: UserInfo::from(&user),
        startup_id: startup.id,
        next_step: next_step(&user, &startup),
    }))
}

/// GET /auth/sessions - Active sessions of the caller.
async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SessionInfo>>> {
    let sessions = SessionRepository::new((*state.db).clone())
        .get_user_sessions(auth.user_id())
        .await?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|s| SessionInfo {
                id: s.id,
                user_agent: s.user_agent,
                created_at: s.created_at,
                expires_at: s.expires_at,
            })
            .collect(),
    ))
}

/// POST /auth/logout - Revoke the session behind a refresh token.
async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<StatusCode> {
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke_by_token(&payload.refresh_token)
        .await?;
    if revoked {
        info!("Session revoked on logout");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/logout-all - Revoke every session of the caller.
async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke_all_user_sessions(auth.user_id())
        .await?;
    info!(user_id = %auth.user_id(), revoked, "All sessions revoked");
    Ok(Json(serde_json::json!({ "revoked": revoked })))
}

/// POST /auth/forgot-password - Mail a reset link.
///
/// Answers the same way whether or not the account exists.
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    payload.validate()?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_email(&payload.email)
        .await?;

    match user {
        Some(user) if user.is_active => {
            let ttl = state.auth.reset_token_ttl_minutes;
            let token = PasswordResetRepository::new((*state.db).clone())
                .create_token(user.id, ttl)
                .await?;
            if let Err(e) = state
                .email_service
                .send_password_reset_email(&user.email, &user.full_name, &token, ttl)
                .await
            {
                error!(error = %e, user_id = %user.id, "Failed to send password reset email");
            } else {
                info!(user_id = %user.id, "Password reset email sent");
            }
        }
        _ => info!("Password reset requested for unknown or disabled account"),
    }

    Ok(Json(MessageResponse {
        message: "If an account exists for that email, a reset link is on its way",
    }))
}

/// POST /auth/recovery - Verify a reset link and hand out a recovery token.
async fn recover(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RecoveryRequest>,
) -> ApiResult<Json<RecoveryResponse>> {
    let params = parse_link_params(&payload.query)?.merge(parse_link_params(&payload.fragment)?);
    let candidates = resolve_candidates(params, bearer_token(&headers))?;
    let tried: Vec<&'static str> = candidates.iter().map(ResetCredential::kind).collect();

    let (user_id, credential) = resolve_user(candidates, &TokenStores { state: &state })
        .await
        .inspect_err(|e| warn!(error = %e, tried = ?tried, "Reset link verification failed"))?;

    let grant = Uuid::new_v4();
    PasswordResetRepository::new((*state.db).clone())
        .issue_token(
            user_id.into_inner(),
            &grant.to_string(),
            state.auth.reset_token_ttl_minutes,
        )
        .await?;
    let recovery_token = state
        .jwt_service
        .generate_recovery_token(user_id.into_inner(), grant)?;
    info!(user_id = %user_id, via = credential.kind(), "Reset link verified");

    Ok(Json(RecoveryResponse {
        recovery_token,
        verified_with: credential.kind(),
    }))
}

/// POST /auth/reset-password - Set a new password with a recovery token.
///
/// The token's grant is spent first, so a second use fails. Every session of
/// the user is revoked and outstanding reset tokens are invalidated.
async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("MISSING_TOKEN", "A recovery token is required"))?;
    let claims = state.jwt_service.validate_kind(token, TokenKind::Recovery)?;
    check_password_policy(&payload.password, &payload.confirm_password)?;

    let user_id = claims.user_id();
    let grant_owner = PasswordResetRepository::new((*state.db).clone())
        .consume_token(&claims.jti.to_string())
        .await?;
    if grant_owner != user_id {
        return Err(ResetTokenError::Invalid.into());
    }

    let password_hash = hash_password(&payload.password)?;
    UserRepository::new((*state.db).clone())
        .update_password(user_id, &password_hash)
        .await?;
    let revoked = SessionRepository::new((*state.db).clone())
        .revoke_all_user_sessions(user_id)
        .await?;
    PasswordResetRepository::new((*state.db).clone())
        .invalidate_user_tokens(user_id)
        .await?;

    info!(user_id = %user_id, revoked_sessions = revoked, "Password reset completed");
    Ok(Json(MessageResponse {
        message: "Password updated; sign in with your new password",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header::AUTHORIZATION};
    use serde_json::json;

    use crate::routes::test_support::{access_token, app, json_body, send, state};

    fn post_json(uri: &str, body: &serde_json::Value, bearer: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_login_timeout_is_reported() {
        let result: ApiResult<()> =
            with_login_timeout(Duration::from_millis(10), std::future::pending()).await;
        let err = result.unwrap_err();

        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.code(), "LOGIN_TIMEOUT");
    }

    #[tokio::test]
    async fn test_login_within_limit_passes_result_through() {
        let result = with_login_timeout(Duration::from_secs(5), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email() {
        let state = state();
        let response = send(
            app(&state),
            post_json(
                "/api/v1/auth/login",
                &json!({ "email": "not-an-email", "password": "secret" }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_link_params_accept_prefixes() {
        let params = parse_link_params("#access_token=a&refresh_token=r&type=recovery").unwrap();
        assert_eq!(params.access_token.as_deref(), Some("a"));
        assert_eq!(params.link_type.as_deref(), Some("recovery"));

        let params = parse_link_params("?token_hash=abc&type=recovery").unwrap();
        assert_eq!(params.token_hash.as_deref(), Some("abc"));

        assert_eq!(parse_link_params("").unwrap(), ResetParams::default());
    }

    #[tokio::test]
    async fn test_recovery_without_credentials() {
        let state = state();
        let response = send(
            app(&state),
            post_json(
                "/api/v1/auth/recovery",
                &json!({ "query": "", "fragment": "" }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "RESET_TOKEN_MISSING");
    }

    #[tokio::test]
    async fn test_recovery_surfaces_provider_error() {
        let state = state();
        let response = send(
            app(&state),
            post_json(
                "/api/v1/auth/recovery",
                &json!({
                    "fragment": "#error=access_denied&error_description=Email+link+has+expired"
                }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "RESET_LINK_REJECTED");
        assert!(body["message"].as_str().unwrap().contains("Email link has expired"));
    }

    #[tokio::test]
    async fn test_recovery_token_is_not_a_code() {
        let state = state();
        let user_id = Uuid::new_v4();
        let recovery = state
            .jwt_service
            .generate_recovery_token(user_id, Uuid::new_v4())
            .unwrap();

        // A recovery token replayed as `code` must not buy a fresh one.
        let response = send(
            app(&state),
            post_json(
                "/api/v1/auth/recovery",
                &json!({ "query": format!("?code={recovery}") }),
                None,
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "RESET_TOKEN_INVALID");
    }

    #[tokio::test]
    async fn test_existing_session_verifies_without_lookup() {
        let state = state();
        let token = access_token(&state);
        let candidates = resolve_candidates(ResetParams::default(), Some(&token)).unwrap();

        let (_, credential) = resolve_user(candidates, &TokenStores { state: &state })
            .await
            .unwrap();
        assert_eq!(credential.kind(), "existing_session");
    }

    #[tokio::test]
    async fn test_code_is_checked_against_reset_tokens() {
        let state = state();
        let recovery = state
            .jwt_service
            .generate_recovery_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        let result = TokenStores { state: &state }
            .verify(&ResetCredential::AuthorizationCode { code: recovery })
            .await;
        assert_eq!(result, Err(ResetTokenError::Invalid));
    }

    #[tokio::test]
    async fn test_recovery_rejects_unknown_code() {
        let state = state();
        let response = send(
            app(&state),
            post_json("/api/v1/auth/recovery", &json!({ "query": "code=nope" }), None),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "RESET_TOKEN_INVALID");
    }

    #[tokio::test]
    async fn test_reset_password_requires_recovery_token() {
        let state = state();
        let body = json!({ "password": "longenough", "confirm_password": "longenough" });

        let response = send(
            app(&state),
            post_json("/api/v1/auth/reset-password", &body, None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "MISSING_TOKEN");

        // An access token is not a recovery token.
        let token = access_token(&state);
        let response = send(
            app(&state),
            post_json("/api/v1/auth/reset-password", &body, Some(&token)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_reset_password_checks_policy_first() {
        let state = state();
        let token = state
            .jwt_service
            .generate_recovery_token(Uuid::new_v4(), Uuid::new_v4())
            .unwrap();

        let response = send(
            app(&state),
            post_json(
                "/api/v1/auth/reset-password",
                &json!({ "password": "longenough", "confirm_password": "different1" }),
                Some(&token),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "PASSWORD_MISMATCH");
    }

    #[tokio::test]
    async fn test_me_requires_access_token() {
        let state = state();
        let refresh = state
            .jwt_service
            .generate_refresh_token(Uuid::new_v4(), None)
            .unwrap();

        let response = send(
            app(&state),
            Request::builder()
                .uri("/api/v1/auth/me")
                .header(AUTHORIZATION, format!("Bearer {refresh}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "INVALID_TOKEN");
    }
}
