//! Error types for the pdfocr-client library.
//!
//! A single enum, [`ClientError`], covers every failure the client can hit.
//! Only two of its variants are user-facing outcomes of a submission:
//!
//! * [`ClientError::NoFileSelected`]: submit was triggered before a file was
//!   picked. No network call is made.
//! * [`ClientError::RequestFailed`]: anything that went wrong while talking
//!   to the backend (connection refused, non-2xx status, undecodable body),
//!   collapsed into one category. The `step` and `detail` fields exist for
//!   the log record; the user only ever sees the generic failure notice.
//!
//! The remaining variants come from the file picker, the configuration
//! builder and the download action, which run outside a submission.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdfocr-client library.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Submission errors ────────────────────────────────────────────────
    /// `submit()` was called with no file selected.
    #[error("No file selected.\nPick a PDF before submitting.")]
    NoFileSelected,

    /// A backend request failed: transport error, non-2xx status or a body
    /// that could not be decoded.
    #[error("{step} request to '{url}' failed: {detail}")]
    RequestFailed {
        step: RequestStep,
        url: String,
        detail: String,
    },

    // ── Picker errors ────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not a PDF (wrong extension or magic bytes).
    #[error("File is not a PDF: '{path}'\n{reason}")]
    NotAPdf { path: PathBuf, reason: String },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ───────────────────────────────────────────────────────
    /// Could not create or write the downloaded result file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// True for failures that happened while talking to the backend.
    pub fn is_request_failure(&self) -> bool {
        matches!(self, ClientError::RequestFailed { .. })
    }
}

/// Which backend call a [`ClientError::RequestFailed`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStep {
    /// `POST {backend}/upload`
    Upload,
    /// `GET {backend}/tags`
    Tags,
    /// `GET {backend}/{download_url}`
    Download,
}

impl fmt::Display for RequestStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStep::Upload => "Upload",
            RequestStep::Tags => "Tags",
            RequestStep::Download => "Download",
        };
        f.write_str(s)
    }
}
