use crate::error::BookingError;
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceiptStorage: Send + Sync + 'static {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BookingError>;
    fn public_url(&self, key: &str) -> String;
}

/// Storage key `receipts/<uuid>.<ext>`, keeping the extension of the uploaded file name.
pub fn receipt_key(file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|extension| extension.to_str())
        .filter(|extension| {
            !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_lowercase);

    match extension {
        Some(extension) => format!("receipts/{}.{extension}", Uuid::new_v4()),
        None => format!("receipts/{}", Uuid::new_v4()),
    }
}

/// Receipts written below a local directory and served by the application under `/files`.
#[derive(Debug, Clone)]
pub struct LocalReceiptStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalReceiptStorage {
    pub const ROUTE: &'static str = "/files";

    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BookingError> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(BookingError::Validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ReceiptStorage for LocalReceiptStorage {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BookingError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                error!(%err, path = %parent.display(), "Failed to create receipts directory");
                BookingError::Store(format!("Failed to store receipt: {err}"))
            })?;
        }
        tokio::fs::write(&path, bytes).await.map_err(|err| {
            error!(%err, path = %path.display(), "Failed to write receipt");
            BookingError::Store(format!("Failed to store receipt: {err}"))
        })?;
        info!(key, content_type, "Receipt stored locally");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}/{key}", self.public_base_url, Self::ROUTE)
    }
}

pub struct S3ReceiptStorage {
    client: S3Client,
    bucket: String,
    region: String,
}

impl S3ReceiptStorage {
    pub async fn new(bucket: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let region = aws_config
            .region()
            .map(|region| region.to_string())
            .unwrap_or_else(|| "us-east-1".to_string());
        Self {
            client: S3Client::new(&aws_config),
            bucket,
            region,
        }
    }
}

#[async_trait]
impl ReceiptStorage for S3ReceiptStorage {
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BookingError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(bytes.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| {
                error!(%err, key, bucket = %self.bucket, "S3 upload failed");
                BookingError::Store("Receipt upload failed".into())
            })?;
        info!(key, bucket = %self.bucket, "Receipt uploaded to S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{key}",
            self.bucket, self.region
        )
    }
}
