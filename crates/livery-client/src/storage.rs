//! Media storage for uploaded images.

use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::error::ClientError;

/// Bucket used when none is configured.
pub const DEFAULT_BUCKET: &str = "template-building";

static UNSAFE_OBJECT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]+").expect("Invalid object name regex"));

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// Wrap file contents, rejecting anything that is not an image.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ClientError> {
        let name = name.into();
        let content_type = image_content_type(&name)
            .ok_or_else(|| ClientError::Upload(format!("{} is not an image", name)))?;
        if bytes.is_empty() {
            return Err(ClientError::Upload(format!("{} is empty", name)));
        }
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }
}

/// Content type for an image file name, by extension.
pub fn image_content_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Object name for an upload: `<unix millis>_<file name>`.
pub fn object_name(file_name: &str, now: SystemTime) -> String {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);
    format!("{}_{}", millis, UNSAFE_OBJECT_NAME.replace_all(base, "_"))
}

/// Somewhere uploaded media can be stored and served from.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a file and return its public URL.
    async fn upload(&self, file: &MediaFile) -> Result<String, ClientError>;
}

/// Supabase object storage.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    url: String,
    bucket: String,
    key: String,
}

impl SupabaseStorage {
    /// Create a store for a project URL such as "https://xyz.supabase.co".
    pub fn new(
        url: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("livery/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            key: key.into(),
        })
    }

    /// Public URL of a stored object.
    pub fn public_url(&self, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.url, self.bucket, object
        )
    }
}

#[async_trait]
impl MediaStore for SupabaseStorage {
    async fn upload(&self, file: &MediaFile) -> Result<String, ClientError> {
        let object = object_name(&file.name, SystemTime::now());
        let endpoint = format!("{}/storage/v1/object/{}/{}", self.url, self.bucket, object);

        tracing::debug!("Uploading {} ({} bytes)", object, file.bytes.len());
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .header(reqwest::header::CONTENT_TYPE, file.content_type)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(file.bytes.clone())
            .send()
            .await
            .map_err(|e| ClientError::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            tracing::warn!("Storage rejected {}: {} {}", object, status.as_u16(), message);
            return Err(ClientError::Upload(message));
        }

        Ok(self.public_url(&object))
    }
}
