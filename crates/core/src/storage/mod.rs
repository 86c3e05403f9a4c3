//! Contract and invoice attachments on object storage, through Apache OpenDAL.
//!
//! Files never pass through the API: clients receive presigned URLs and talk
//! to the bucket directly. Keys are scoped by startup so a presigned download
//! can be checked against the caller's startup before it is issued.
//!
//! Backends: S3-compatible (Supabase Storage, R2, AWS), Azure Blob and the
//! local filesystem for development.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, provider_name};
pub use error::StorageError;
pub use service::{AttachmentKind, PresignedUrl, StorageService, UploadRequest};
