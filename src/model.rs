//! Data types shared between the session, the backend and the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Media type the picker accepts and the upload part is labelled with.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The user's chosen input file.
///
/// Content is held in memory: the whole file goes into one multipart part,
/// and the session may resubmit the same selection.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name sent as the multipart part's `filename`.
    pub name: String,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Media type of the content. Always [`PDF_MEDIA_TYPE`] when produced by
    /// [`crate::input::open_pdf`].
    pub media_type: String,
}

impl SelectedFile {
    /// Wrap already-loaded PDF bytes.
    pub fn pdf(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            media_type: PDF_MEDIA_TYPE.to_string(),
        }
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

// Content can be megabytes; keep it out of logs.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.content.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// Outcome of a successful upload: where to fetch the processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Opaque locator relative to the backend base URL (e.g. `/download`).
    pub download_url: String,
}

/// One extracted label with its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Label text. The backend reports rows without a recognisable label as
    /// `null`; those are kept and carry an empty label.
    #[serde(rename = "Tag", default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(rename = "Count")]
    pub count: u64,
}

impl Tag {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Wire DTOs ────────────────────────────────────────────────────────────

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub download_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

/// Body the backend sends with a 4xx, e.g. `{"error": "No file provided"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
