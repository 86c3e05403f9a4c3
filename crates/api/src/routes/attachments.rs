//! Attachment routes.
//!
//! Files never pass through the API: clients upload and download through
//! presigned URLs, and the resulting key is stored on the employee
//! (contract) or expense record (invoice).

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    routes::current_startup,
};
use runway_core::storage::{AttachmentKind, PresignedUrl, StorageService, UploadRequest};
use runway_db::{EmployeeRepository, FinancialRepository};
use runway_shared::AppError;
use runway_shared::types::{AttachmentId, EmployeeId, FinancialRecordId, StartupId};

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attachments/upload-url", post(request_upload))
        .route("/attachments/download-url", post(request_download))
        .route("/attachments", axum::routing::delete(delete_attachment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an upload URL.
#[derive(Debug, Deserialize, Validate)]
pub struct UploadUrlRequest {
    /// Contract or invoice.
    pub kind: AttachmentKind,
    /// Employee (contract) or expense record (invoice), when it exists already.
    pub owner_id: Option<Uuid>,
    /// Original filename.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// MIME type of the file.
    #[validate(length(min = 1, max = 255))]
    pub content_type: String,
    /// File size in bytes.
    pub file_size: u64,
}

/// Response for an upload URL request.
#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    /// Generated attachment ID.
    pub attachment_id: AttachmentId,
    /// Where and how to upload.
    #[serde(flatten)]
    pub upload: PresignedUrl,
}

/// Identifies a stored file.
#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    /// Storage key.
    pub key: String,
}

// ============================================================================
// Helpers
// ============================================================================

fn storage(state: &AppState) -> ApiResult<&StorageService> {
    state.storage.as_deref().ok_or_else(|| {
        ApiError::with_code(
            AppError::ServiceUnavailable("File storage is not configured".to_string()),
            "STORAGE_NOT_CONFIGURED",
        )
    })
}

/// Confirms the owner belongs to the caller's startup.
async fn check_owner(
    state: &AppState,
    startup_id: StartupId,
    kind: AttachmentKind,
    owner_id: Uuid,
) -> ApiResult<()> {
    let found = match kind {
        AttachmentKind::Contract => EmployeeRepository::new((*state.db).clone())
            .find(startup_id, EmployeeId::from_uuid(owner_id))
            .await?
            .is_some(),
        AttachmentKind::Invoice => FinancialRepository::new((*state.db).clone())
            .find(startup_id, FinancialRecordId::from_uuid(owner_id))
            .await?
            .is_some(),
    };
    if found {
        Ok(())
    } else {
        Err(ApiError::not_found(match kind {
            AttachmentKind::Contract => "Employee",
            AttachmentKind::Invoice => "Financial record",
        }))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /attachments/upload-url - Presigned PUT for a contract or invoice.
async fn request_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UploadUrlRequest>,
) -> ApiResult<Json<UploadUrlResponse>> {
    payload.validate()?;
    let storage = storage(&state)?;
    storage.validate_upload(&payload.content_type, payload.file_size)?;

    let (startup_id, _) = current_startup(&state, &auth).await?;
    if let Some(owner_id) = payload.owner_id {
        check_owner(&state, startup_id, payload.kind, owner_id).await?;
    }

    let attachment_id = AttachmentId::new();
    let upload = storage
        .presign_upload(&UploadRequest {
            startup_id,
            kind: payload.kind,
            owner_id: payload.owner_id,
            attachment_id,
            filename: payload.filename,
            content_type: payload.content_type,
            file_size: payload.file_size,
        })
        .await?;

    info!(
        startup_id = %startup_id,
        attachment_id = %attachment_id,
        kind = payload.kind.folder(),
        provider = storage.provider_name(),
        "Upload URL issued"
    );
    Ok(Json(UploadUrlResponse {
        attachment_id,
        upload,
    }))
}

/// POST /attachments/download-url - Presigned GET for a stored file.
async fn request_download(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<KeyRequest>,
) -> ApiResult<Json<PresignedUrl>> {
    let storage = storage(&state)?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    let download = storage.presign_download(startup_id, &payload.key).await?;
    Ok(Json(download))
}

/// DELETE /attachments?key= - Remove a stored file.
async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<KeyRequest>,
) -> ApiResult<StatusCode> {
    let storage = storage(&state)?;
    let (startup_id, _) = current_startup(&state, &auth).await?;
    storage.delete(startup_id, &query.key).await?;

    info!(startup_id = %startup_id, "Attachment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};

    use crate::routes::test_support::{access_token, app, json_body, send, state};

    #[tokio::test]
    async fn test_upload_without_storage_is_unavailable() {
        let state = state();
        let token = access_token(&state);
        let body = serde_json::json!({
            "kind": "contract",
            "filename": "offer.pdf",
            "content_type": "application/pdf",
            "file_size": 1024
        });

        let response = send(
            app(&state),
            Request::builder()
                .method("POST")
                .uri("/api/v1/attachments/upload-url")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"], "STORAGE_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected() {
        let state = state();
        let token = access_token(&state);
        let body = serde_json::json!({
            "kind": "selfie",
            "filename": "me.png",
            "content_type": "image/png",
            "file_size": 10
        });

        let response = send(
            app(&state),
            Request::builder()
                .method("POST")
                .uri("/api/v1/attachments/upload-url")
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
