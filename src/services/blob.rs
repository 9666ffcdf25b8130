use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::utils::attachment::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    OdometerPhotos,
    FuelReceipts,
    ServiceOrders,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::OdometerPhotos => "odometer-photos",
            Bucket::FuelReceipts => "fuel-receipts",
            Bucket::ServiceOrders => "service-orders",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stores a file and hands back a publicly retrievable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bucket: Bucket, extension: &str, bytes: Vec<u8>) -> AppResult<String>;
}

/// Files on local disk, served back under `public_url`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bucket: Bucket, extension: &str, bytes: Vec<u8>) -> AppResult<String> {
        let dir = self.root.join(bucket.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Upload(format!("Cannot create bucket {}: {}", bucket, e)))?;

        let name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            extension
        );

        tokio::fs::write(dir.join(&name), &bytes)
            .await
            .map_err(|e| AppError::Upload(format!("Cannot write {}: {}", name, e)))?;

        tracing::debug!(bucket = %bucket, file = %name, size = bytes.len(), "Blob stored");

        Ok(format!(
            "{}/{}/{}",
            self.public_url.trim_end_matches('/'),
            bucket,
            name
        ))
    }
}

/// First half of upload-then-link: stores the attachment, if any, and returns its URL.
/// Callers must not touch the record when this fails.
pub async fn store_attachment(
    store: &dyn BlobStore,
    bucket: Bucket,
    attachment: Option<&Attachment>,
) -> AppResult<Option<String>> {
    let Some(attachment) = attachment else {
        return Ok(None);
    };

    let extension = attachment.extension()?;
    let bytes = attachment.decode()?;

    match store.put(bucket, &extension, bytes).await {
        Ok(url) => Ok(Some(url)),
        Err(e) => {
            tracing::warn!(bucket = %bucket, file = %attachment.file_name, error = %e, "Upload failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> Attachment {
        Attachment {
            file_name: "nota.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            data: "aGVsbG8=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_local_store_writes_under_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads/");

        let url = store_attachment(&store, Bucket::FuelReceipts, Some(&receipt()))
            .await
            .unwrap()
            .unwrap();

        assert!(url.starts_with("/uploads/fuel-receipts/"));
        assert!(url.ends_with(".jpg"));

        let name = url.rsplit('/').next().unwrap();
        let stored = std::fs::read(dir.path().join("fuel-receipts").join(name)).unwrap();
        assert_eq!(stored, b"hello");
    }

    #[tokio::test]
    async fn test_no_attachment_is_not_an_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads");

        let url = store_attachment(&store, Bucket::OdometerPhotos, None).await.unwrap();
        assert!(url.is_none());
    }

    #[tokio::test]
    async fn test_bad_payload_is_an_upload_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads");
        let mut attachment = receipt();
        attachment.data = "not base64!".to_string();

        let err = store_attachment(&store, Bucket::FuelReceipts, Some(&attachment))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
    }
}
