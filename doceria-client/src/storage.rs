//! Product image storage
//!
//! Uploads go to a Firebase-Storage-style REST bucket:
//! `POST {api}/v0/b/{bucket}/o?name={path}` with the raw bytes as body.
//! The public URL carries the download token returned by the upload.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::StorageConfig;

/// Maximum upload size (20MB)
const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

/// Accepted image extensions
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {0} bytes")]
    TooLarge(usize),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Upload of {path} failed with status {status}")]
    UploadFailed { path: String, status: u16 },

    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed storage response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Stored object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "name")]
    pub path: String,
    pub bucket: String,
    /// Comma-separated when the object has several tokens; the first is used
    #[serde(rename = "downloadTokens", default)]
    pub token: Option<String>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<ObjectRef, StorageError>;

    fn public_url(&self, object: &ObjectRef) -> Result<String, StorageError>;
}

/// `products/{millis}_{file_name}`
pub fn product_image_path(file_name: &str, millis: i64) -> String {
    format!("products/{millis}_{file_name}")
}

/// Validate, upload under `products/` and return the public URL to store
/// in the product's `imageUrl`
pub async fn upload_product_image<S: ObjectStorage + ?Sized>(
    storage: &S,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, StorageError> {
    validate_image(file_name, &bytes)?;
    let path = product_image_path(file_name, shared::util::now_millis());
    let object = storage.upload(&path, bytes).await?;
    let url = storage.public_url(&object)?;
    tracing::info!(path = %object.path, "Product image uploaded");
    Ok(url)
}

fn validate_image(file_name: &str, bytes: &[u8]) -> Result<(), StorageError> {
    if bytes.is_empty() {
        return Err(StorageError::EmptyFile);
    }
    if bytes.len() > MAX_FILE_SIZE {
        return Err(StorageError::TooLarge(bytes.len()));
    }
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(StorageError::UnsupportedFormat(ext));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HttpObjectStorage {
    client: Client,
    api_url: String,
    bucket: String,
}

impl HttpObjectStorage {
    pub fn new(client: Client, config: &StorageConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .extend(["v0", "b", bucket, "o", path]);
        Ok(url)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<ObjectRef, StorageError> {
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();
        let url = format!("{}/v0/b/{}/o", self.api_url, self.bucket);

        let response = self
            .client
            .post(url)
            .query(&[("name", path)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(path = %path, status = status.as_u16(), "Image upload failed");
            return Err(StorageError::UploadFailed {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| StorageError::MalformedResponse(e.to_string()))
    }

    fn public_url(&self, object: &ObjectRef) -> Result<String, StorageError> {
        let mut url = self.object_url(&object.bucket, &object.path)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(token) = object
                .token
                .as_deref()
                .and_then(|tokens| tokens.split(',').next())
                .filter(|token| !token.is_empty())
            {
                query.append_pair("token", token);
            }
        }
        Ok(url.into())
    }
}
