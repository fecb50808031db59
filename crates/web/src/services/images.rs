//! Image hosting client.
//!
//! Product photos are pushed to an external image host over HTTP and only
//! the returned URL is stored. Files are validated (extension, size) before
//! any bytes leave the process.

use reqwest::multipart;
use thiserror::Error;

use crate::config::ImageHostConfig;

/// File extensions the catalog accepts.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Upload size cap, in bytes.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur while uploading an image.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The file failed local validation; nothing was uploaded.
    #[error("invalid image: {0}")]
    InvalidFile(String),

    /// The HTTP request to the image host failed.
    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The image host answered with a non-success status.
    #[error("image host returned status {0}")]
    HostStatus(reqwest::StatusCode),

    /// The image host response was missing the hosted URL.
    #[error("image host response missing url")]
    MalformedResponse,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Client for the external image host.
#[derive(Debug, Clone)]
pub struct ImageHost {
    client: reqwest::Client,
    config: ImageHostConfig,
}

impl ImageHost {
    /// Create a new image host client.
    #[must_use]
    pub fn new(config: ImageHostConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Validate a file name and payload without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidFile` if the extension is not an image
    /// type we accept, or the payload is empty or oversized.
    pub fn validate(file_name: &str, bytes: &[u8]) -> Result<(), UploadError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension {
            Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(UploadError::InvalidFile(format!(
                    "unsupported file type (allowed: {})",
                    ALLOWED_EXTENSIONS.join(", ")
                )));
            }
        }

        if bytes.is_empty() {
            return Err(UploadError::InvalidFile("file is empty".to_owned()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::InvalidFile(format!(
                "file exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        Ok(())
    }

    /// Upload one image and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidFile` if validation fails (before any
    /// network traffic), `UploadError::Request`/`HostStatus` if the host is
    /// unreachable or rejects the upload.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        Self::validate(file_name, &bytes)?;

        let part = multipart::Part::bytes(bytes).file_name(file_name.to_owned());
        let form = multipart::Form::new()
            .text("api_key", self.config.api_key_value())
            .part("file", part);

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::HostStatus(status));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|_| UploadError::MalformedResponse)?;

        Ok(body.secure_url)
    }
}
