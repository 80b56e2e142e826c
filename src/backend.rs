//! The OCR backend as seen by the client.
//!
//! [`OcrBackend`] is the seam the session talks through; [`HttpBackend`] is
//! the real implementation over `reqwest`. Tests drive the session with
//! in-memory fakes or point `HttpBackend` at a mock server.
//!
//! ## Endpoints
//!
//! ```text
//! POST {base}/upload           multipart field "file"  → {"download_url": "..."}
//! GET  {base}/tags                                     → {"tags": [{"Tag","Count"}]}
//! GET  {base}/{download_url}                           → processed file bytes
//! ```
//!
//! No retries happen here. Every transport error, non-2xx status or
//! undecodable body becomes [`ClientError::RequestFailed`].

use crate::config::ClientConfig;
use crate::error::{ClientError, RequestStep};
use crate::model::{ErrorResponse, SelectedFile, Tag, TagsResponse, UploadResponse, UploadResult};
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Filename used when the server names nothing better.
pub const DEFAULT_DOWNLOAD_NAME: &str = "extracted_data.xlsx";

/// The two calls a submission makes.
pub trait OcrBackend {
    /// Send `file` for processing and return where the result can be fetched.
    fn upload(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<UploadResult, ClientError>> + Send;

    /// Fetch the tags extracted from the most recently processed document.
    fn fetch_tags(&self) -> impl Future<Output = Result<Vec<Tag>, ClientError>> + Send;
}

/// [`OcrBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a download locator.
    pub fn download_url(&self, locator: &str) -> String {
        self.config.endpoint(locator)
    }

    /// Fetch the processed file behind `locator` and write it to `dest`.
    ///
    /// If `dest` is an existing directory the file name comes from the
    /// response's `Content-Disposition`, then the last URL segment, then
    /// [`DEFAULT_DOWNLOAD_NAME`]. Returns the path written.
    ///
    /// The body is streamed into a temporary file in the same directory and
    /// renamed onto the target only once complete, so on error nothing is
    /// left at the target path.
    pub async fn download(&self, locator: &str, dest: &Path) -> Result<PathBuf, ClientError> {
        let url = self.download_url(locator);
        info!("Downloading processed file from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(RequestStep::Download, &url, e))?;
        let response = check_status(RequestStep::Download, &url, response).await?;

        let dest_is_dir = tokio::fs::metadata(dest)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let path = if dest_is_dir {
            dest.join(response_filename(&response))
        } else {
            dest.to_path_buf()
        };
        let write_failed = |source: std::io::Error| ClientError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        // Stage next to the target; a failed transfer leaves nothing at `path`.
        let staging_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (staged, staged_path) = tempfile::NamedTempFile::new_in(&staging_dir)
            .map_err(write_failed)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(staged);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| transport_error(RequestStep::Download, &url, e))?;
            file.write_all(&chunk).await.map_err(write_failed)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_failed)?;
        drop(file);

        staged_path
            .persist(&path)
            .map_err(|e| write_failed(e.error))?;

        info!("Wrote {} bytes to {}", written, path.display());
        Ok(path)
    }

    async fn read_json<T: DeserializeOwned>(
        step: RequestStep,
        url: &str,
        response: Response,
    ) -> Result<T, ClientError> {
        let response = check_status(step, url, response).await?;
        response.json::<T>().await.map_err(|e| ClientError::RequestFailed {
            step,
            url: url.to_string(),
            detail: format!("invalid response body: {e}"),
        })
    }
}

impl OcrBackend for HttpBackend {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResult, ClientError> {
        let url = self.config.endpoint(&self.config.upload_path);
        info!("Uploading {} ({} bytes) to {}", file.name, file.size(), url);

        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)
            .map_err(|e| ClientError::RequestFailed {
                step: RequestStep::Upload,
                url: url.clone(),
                detail: format!("invalid media type '{}': {e}", file.media_type),
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(RequestStep::Upload, &url, e))?;

        let body: UploadResponse = Self::read_json(RequestStep::Upload, &url, response).await?;
        if let Some(ref message) = body.message {
            debug!("Backend says: {}", message);
        }

        Ok(UploadResult {
            download_url: body.download_url,
        })
    }

    async fn fetch_tags(&self) -> Result<Vec<Tag>, ClientError> {
        let url = self.config.endpoint(&self.config.tags_path);
        debug!("Fetching tags from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(RequestStep::Tags, &url, e))?;

        let body: TagsResponse = Self::read_json(RequestStep::Tags, &url, response).await?;
        debug!("Received {} tags", body.tags.len());
        Ok(body.tags)
    }
}

fn transport_error(step: RequestStep, url: &str, e: reqwest::Error) -> ClientError {
    let detail = if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        e.to_string()
    };
    ClientError::RequestFailed {
        step,
        url: url.to_string(),
        detail,
    }
}

/// Turn a non-2xx response into `RequestFailed`, folding in the backend's
/// `{"error": ...}` message when there is one.
async fn check_status(
    step: RequestStep,
    url: &str,
    response: Response,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => format!("HTTP {status}: {}", err.error),
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", truncate(body.trim(), 200)),
    };

    Err(ClientError::RequestFailed {
        step,
        url: url.to_string(),
        detail,
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}

/// Pick a filename for a downloaded result.
fn response_filename(response: &Response) -> String {
    let from_header = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename);
    if let Some(name) = from_header {
        return name;
    }

    if let Some(mut segments) = response.url().path_segments() {
        if let Some(last) = segments.next_back() {
            if !last.is_empty() && last.contains('.') {
                return last.to_string();
            }
        }
    }

    DEFAULT_DOWNLOAD_NAME.to_string()
}

/// Extract `filename` from a `Content-Disposition` header value.
///
/// Only the plain `filename=` form is understood; any directory components
/// are stripped so a hostile header cannot write outside `dest`.
fn disposition_filename(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("filename="))
        .map(|raw| raw.trim().trim_matches('"'))
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
