//! Storage limits and TTLs.

use runway_shared::config::{StorageProvider, StorageSettings};

/// Short provider label for logs.
#[must_use]
pub fn provider_name(provider: &StorageProvider) -> &'static str {
    match provider {
        StorageProvider::S3 { .. } => "s3",
        StorageProvider::AzureBlob { .. } => "azure_blob",
        StorageProvider::LocalFs { .. } => "local",
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend.
    pub provider: StorageProvider,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Presigned upload URL TTL in seconds.
    pub presign_upload_ttl_secs: u64,
    /// Presigned download URL TTL in seconds.
    pub presign_download_ttl_secs: u64,
    /// Accepted MIME types.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// 10 MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
    /// 15 minutes.
    pub const DEFAULT_UPLOAD_TTL: u64 = 900;
    /// 1 hour.
    pub const DEFAULT_DOWNLOAD_TTL: u64 = 3600;

    /// Config with default limits.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            presign_upload_ttl_secs: Self::DEFAULT_UPLOAD_TTL,
            presign_download_ttl_secs: Self::DEFAULT_DOWNLOAD_TTL,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Config from the `storage` settings section.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let config = Self::new(settings.provider.clone());
        match settings.max_file_size {
            Some(max) => config.with_max_file_size(max),
            None => config,
        }
    }

    /// Sets the maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Contracts and invoices: PDFs, office documents and scans.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        [
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "image/png",
            "image/jpeg",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Whether a MIME type may be uploaded.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> StorageProvider {
        StorageProvider::LocalFs {
            root: "./storage".into(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = StorageConfig::new(local());
        assert_eq!(config.max_file_size, StorageConfig::DEFAULT_MAX_FILE_SIZE);
        assert!(config.is_mime_type_allowed("application/pdf"));
        assert!(config.is_mime_type_allowed("IMAGE/PNG"));
        assert!(!config.is_mime_type_allowed("text/html"));
        assert_eq!(provider_name(&config.provider), "local");
    }

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings {
            provider: local(),
            max_file_size: Some(2048),
        };
        assert_eq!(StorageConfig::from_settings(&settings).max_file_size, 2048);

        let defaults = StorageSettings {
            provider: local(),
            max_file_size: None,
        };
        assert_eq!(
            StorageConfig::from_settings(&defaults).max_file_size,
            StorageConfig::DEFAULT_MAX_FILE_SIZE
        );
    }
}
