//! Client configuration.
//!
//! The backend is reached through a single base URL. Everything else has a
//! default matching the service's routes, so most callers only ever do:
//!
//! ```rust,no_run
//! use pdfocr_client::ClientConfig;
//!
//! let config = ClientConfig::from_env().unwrap(); // reads OCR_BACKEND_URL
//! ```

use crate::error::ClientError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "OCR_BACKEND_URL";

/// Configuration for talking to the OCR backend.
///
/// Built via [`ClientConfig::builder()`] or [`ClientConfig::from_env()`].
///
/// # Example
/// ```rust
/// use pdfocr_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://localhost:5000")
///     .request_timeout_secs(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint(&config.upload_path), "http://localhost:5000/upload");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend service, without trailing slash.
    pub base_url: String,

    /// Route of the multipart upload endpoint. Default: `upload`.
    pub upload_path: String,

    /// Route of the tag listing endpoint. Default: `tags`.
    pub tags_path: String,

    /// Per-request timeout in seconds. Default: `None` (wait indefinitely).
    ///
    /// OCR of a long document can take minutes on the backend and the upload
    /// call only returns once processing is done, so no timeout is applied
    /// unless asked for.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            upload_path: "upload".to_string(),
            tags_path: "tags".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from `OCR_BACKEND_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var(BACKEND_URL_ENV).map_err(|_| {
            ClientError::InvalidConfig(format!(
                "{BACKEND_URL_ENV} is not set; point it at the OCR backend, e.g. http://localhost:5000"
            ))
        })?;
        Self::builder().base_url(base_url).build()
    }

    /// Join a route or locator onto the base URL with exactly one `/`.
    pub fn endpoint(&self, route: &str) -> String {
        crate::render::download_url(&self.base_url, route)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.config.upload_path = path.into();
        self
    }

    pub fn tags_path(mut self, path: impl Into<String>) -> Self {
        self.config.tags_path = path.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs.max(1));
        self
    }

    /// Build the configuration, validating the base URL.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(ClientError::InvalidConfig(
                "backend base URL is empty".into(),
            ));
        }
        let parsed = Url::parse(&c.base_url).map_err(|e| {
            ClientError::InvalidConfig(format!("backend URL '{}' is invalid: {}", c.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "backend URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        Ok(self.config)
    }
}
