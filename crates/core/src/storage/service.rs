//! Storage service on top of an OpenDAL operator.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use opendal::{Operator, services};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use runway_shared::config::StorageProvider;
use runway_shared::types::{AttachmentId, StartupId};

use super::config::StorageConfig;
use super::error::StorageError;

/// What an attachment documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// Employment contract, owned by an employee.
    Contract,
    /// Invoice, owned by an expense record.
    Invoice,
}

impl AttachmentKind {
    /// Key segment for this kind.
    #[must_use]
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Contract => "contracts",
            Self::Invoice => "invoices",
        }
    }
}

impl FromStr for AttachmentKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contract" | "contracts" => Ok(Self::Contract),
            "invoice" | "invoices" => Ok(Self::Invoice),
            other => Err(StorageError::InvalidKey(format!("unknown attachment kind {other}"))),
        }
    }
}

/// Presigned URL for upload or download.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    /// Storage key the URL points at.
    pub key: String,
    /// The presigned URL.
    pub url: String,
    /// HTTP method (PUT for upload, GET for download).
    pub method: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
    /// Headers the client must send.
    pub headers: HashMap<String, String>,
}

/// Request for an upload URL.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Startup the file belongs to.
    pub startup_id: StartupId,
    /// Contract or invoice.
    pub kind: AttachmentKind,
    /// Employee or financial record the file is for, when already known.
    pub owner_id: Option<Uuid>,
    /// Attachment ID.
    pub attachment_id: AttachmentId,
    /// Original filename.
    pub filename: String,
    /// MIME type.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: u64,
}

/// Storage service for contracts and invoices.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

fn build<B: opendal::Builder>(builder: B) -> Result<Operator, StorageError> {
    Ok(Operator::new(builder)
        .map_err(|e| StorageError::Configuration(e.to_string()))?
        .finish())
}

fn expires_in(ttl_secs: u64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX))
}

impl StorageService {
    /// Creates the service and its operator.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the backend cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = match &config.provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => build(
                services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region),
            )?,
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => build(
                services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container),
            )?,
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::Configuration("invalid path".to_string()))?;
                build(services::Fs::default().root(root))?
            }
        };
        Ok(Self { operator, config })
    }

    /// Checks size and MIME type against the configured limits.
    ///
    /// # Errors
    ///
    /// Returns `FileTooLarge` or `InvalidMimeType`.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::FileTooLarge {
                size,
                max: self.config.max_file_size,
            });
        }
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::InvalidMimeType {
                mime_type: content_type.to_string(),
            });
        }
        Ok(())
    }

    /// Key for a new attachment:
    /// `{startup_id}/{contracts|invoices}/{owner_id|unlinked}/{attachment_id}/{filename}`.
    #[must_use]
    pub fn storage_key(req: &UploadRequest) -> String {
        let owner = req
            .owner_id
            .map_or_else(|| "unlinked".to_string(), |id| id.to_string());
        format!(
            "{}/{}/{}/{}/{}",
            req.startup_id,
            req.kind.folder(),
            owner,
            req.attachment_id,
            sanitize_filename(&req.filename)
        )
    }

    /// Whether `key` lives under the startup's prefix.
    #[must_use]
    pub fn key_belongs_to(key: &str, startup_id: StartupId) -> bool {
        let prefix = format!("{startup_id}/");
        key.starts_with(&prefix) && !key.split('/').any(|segment| segment == "..")
    }

    /// Presigned PUT URL for a new attachment.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a backend failure.
    pub async fn presign_upload(&self, req: &UploadRequest) -> Result<PresignedUrl, StorageError> {
        self.validate_upload(&req.content_type, req.file_size)?;

        let key = Self::storage_key(req);
        let ttl = self.config.presign_upload_ttl_secs;
        let presigned = self
            .operator
            .presign_write(&key, Duration::from_secs(ttl))
            .await?;

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), req.content_type.clone());

        Ok(PresignedUrl {
            key,
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: expires_in(ttl),
            headers,
        })
    }

    /// Presigned GET URL for an attachment of `startup_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for keys outside the startup's prefix, or a
    /// backend failure.
    pub async fn presign_download(
        &self,
        startup_id: StartupId,
        key: &str,
    ) -> Result<PresignedUrl, StorageError> {
        if !Self::key_belongs_to(key, startup_id) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        let ttl = self.config.presign_download_ttl_secs;
        let presigned = self
            .operator
            .presign_read(key, Duration::from_secs(ttl))
            .await?;

        Ok(PresignedUrl {
            key: key.to_string(),
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: expires_in(ttl),
            headers: HashMap::new(),
        })
    }

    /// Deletes an attachment of `startup_id`. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` or a backend failure.
    pub async fn delete(&self, startup_id: StartupId, key: &str) -> Result<(), StorageError> {
        if !Self::key_belongs_to(key, startup_id) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.operator.delete(key).await?)
    }

    /// Provider label for logs.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        super::config::provider_name(&self.config.provider)
    }
}

/// Keeps ASCII alphanumerics, dots, hyphens and underscores, and never
/// starts with a dot.
fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_start_matches('.') {
        "" => "file".to_string(),
        rest => rest.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn local_service(max: u64) -> StorageService {
        let config = StorageConfig::new(StorageProvider::LocalFs {
            root: std::env::temp_dir(),
        })
        .with_max_file_size(max);
        StorageService::from_config(config).unwrap()
    }

    fn request(kind: AttachmentKind, owner: Option<Uuid>, filename: &str) -> UploadRequest {
        UploadRequest {
            startup_id: StartupId::new(),
            kind,
            owner_id: owner,
            attachment_id: AttachmentId::new(),
            filename: filename.to_string(),
            content_type: "application/pdf".to_string(),
            file_size: 1024,
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("offer-letter.pdf"), "offer-letter.pdf");
        assert_eq!(sanitize_filename("Q1 invoice (final).pdf"), "Q1_invoice__final_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn test_contract_key_layout() {
        let employee = Uuid::new_v4();
        let req = request(AttachmentKind::Contract, Some(employee), "contract.pdf");
        let key = StorageService::storage_key(&req);

        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], req.startup_id.to_string());
        assert_eq!(parts[1], "contracts");
        assert_eq!(parts[2], employee.to_string());
        assert_eq!(parts[3], req.attachment_id.to_string());
        assert_eq!(parts[4], "contract.pdf");
    }

    #[test]
    fn test_unlinked_invoice_key() {
        let req = request(AttachmentKind::Invoice, None, "inv.png");
        let key = StorageService::storage_key(&req);
        assert!(key.contains("/invoices/unlinked/"));
        assert!(StorageService::key_belongs_to(&key, req.startup_id));
        assert!(!StorageService::key_belongs_to(&key, StartupId::new()));
    }

    #[test]
    fn test_key_scope_rejects_traversal() {
        let startup = StartupId::new();
        assert!(!StorageService::key_belongs_to(
            &format!("{startup}/../other/file.pdf"),
            startup
        ));
    }

    #[test]
    fn test_attachment_kind_parse() {
        assert_eq!("Invoice".parse::<AttachmentKind>().unwrap(), AttachmentKind::Invoice);
        assert_eq!("contracts".parse::<AttachmentKind>().unwrap(), AttachmentKind::Contract);
        assert!("receipt".parse::<AttachmentKind>().is_err());
    }

    #[test]
    fn test_validate_upload() {
        let service = local_service(1024);
        assert!(service.validate_upload("application/pdf", 512).is_ok());
        assert!(matches!(
            service.validate_upload("application/pdf", 2048),
            Err(StorageError::FileTooLarge { size: 2048, max: 1024 })
        ));
        assert!(matches!(
            service.validate_upload("application/x-msdownload", 10),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[tokio::test]
    async fn test_download_outside_prefix_rejected() {
        let service = local_service(1024);
        let result = service
            .presign_download(StartupId::new(), "someone-else/contracts/x.pdf")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    proptest! {
        #[test]
        fn prop_sanitized_filename_is_safe(filename in ".*") {
            let sanitized = sanitize_filename(&filename);
            prop_assert!(!sanitized.is_empty() && !sanitized.starts_with('.'));
            prop_assert!(sanitized
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')));
        }

        #[test]
        fn prop_generated_keys_belong_to_their_startup(filename in "[a-zA-Z0-9 ._-]{1,40}") {
            let req = request(AttachmentKind::Invoice, Some(Uuid::new_v4()), &filename);
            let key = StorageService::storage_key(&req);
            prop_assert!(StorageService::key_belongs_to(&key, req.startup_id));
            prop_assert_eq!(key.split('/').count(), 5);
        }
    }
}
