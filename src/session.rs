//! The upload client: one user's selection, submission and results.
//!
//! ## Submission flow
//!
//! ```text
//! submit()
//!  │
//!  ├─ no file?  ──────────────▶ alert NoFileSelected, no request
//!  │
//!  ├─ uploading = true
//!  ├─ 1. POST /upload ──✗────▶ log, uploading = false, alert Failure
//!  │     store download_url
//!  ├─ 2. GET  /tags   ──✗────▶ log, uploading = false, alert Failure
//!  │     store tags             (download_url from step 1 is kept)
//!  ├─ uploading = false
//!  └─ alert Success
//! ```
//!
//! Nothing is rolled back on failure: whatever was stored before the failing
//! step stays. `submit` takes `&mut self`, so one session can never have two
//! submissions in flight; the borrow checker rejects the second call.

use crate::backend::OcrBackend;
use crate::error::ClientError;
use crate::model::{SelectedFile, Tag, UploadResult};
use crate::notify::{Notice, Notifier};
use crate::render;
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use tracing::{error, info};

/// Transient state of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UiState {
    /// Current selection, if any.
    #[serde(skip)]
    pub selected: Option<SelectedFile>,
    /// True only while a submission is running.
    pub uploading: bool,
    /// Locator from the last successful upload.
    pub download_url: Option<String>,
    /// Tags from the last successful tag fetch, in response order.
    pub tags: Vec<Tag>,
}

impl UiState {
    /// Name of the selected file, or the placeholder shown when none is.
    pub fn selected_name(&self) -> &str {
        self.selected
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("No file selected")
    }
}

/// Upload client bound to one backend and one notifier.
pub struct UploadSession<B, N> {
    backend: B,
    notifier: N,
    state: UiState,
}

impl<B: OcrBackend, N: Notifier> UploadSession<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            state: UiState::default(),
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store `file` as the current selection. Results of earlier
    /// submissions are left alone.
    pub fn select_file(&mut self, file: SelectedFile) {
        info!("Selected file: {} ({} bytes)", file.name, file.size());
        self.state.selected = Some(file);
        self.notifier.on_state_change(&self.state);
    }

    /// Absolute URL of the last processed result, if any.
    pub fn download_link(&self, base_url: &str) -> Option<String> {
        self.state
            .download_url
            .as_deref()
            .map(|locator| render::download_url(base_url, locator))
    }

    /// Upload the selected file, then fetch its tags.
    ///
    /// Exactly one [`Notice`] is sent to the notifier per call. On error the
    /// returned [`ClientError`] carries the detail that was logged.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        let Some(file) = self.state.selected.clone() else {
            error!("Submit with no file selected");
            self.notifier.alert(&Notice::NoFileSelected);
            return Err(ClientError::NoFileSelected);
        };

        let result = self.run(&file).await;

        match &result {
            Ok(()) => {
                info!(
                    "Processed {}: {} tags",
                    file.name,
                    self.state.tags.len()
                );
                self.notifier.alert(&Notice::Success);
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                self.notifier.alert(&Notice::Failure);
            }
        }
        result
    }

    /// The two network steps, with `uploading` held high for exactly their
    /// duration.
    async fn run(&mut self, file: &SelectedFile) -> Result<(), ClientError> {
        let Self {
            backend,
            notifier,
            state,
        } = self;
        let mut state = InFlight::begin(state, &*notifier);

        let UploadResult { download_url } = backend.upload(file).await?;
        state.download_url = Some(download_url);
        state.changed();

        let tags = backend.fetch_tags().await?;
        state.tags = tags;
        state.changed();

        Ok(())
    }
}

/// Holds `uploading = true` for its lifetime.
///
/// Dropping it (normal return, `?`, or the submit future being dropped
/// mid-request) clears the flag and publishes the final state.
struct InFlight<'a, N: Notifier> {
    state: &'a mut UiState,
    notifier: &'a N,
}

impl<'a, N: Notifier> InFlight<'a, N> {
    fn begin(state: &'a mut UiState, notifier: &'a N) -> Self {
        state.uploading = true;
        notifier.on_state_change(&*state);
        Self { state, notifier }
    }

    fn changed(&self) {
        self.notifier.on_state_change(&*self.state);
    }
}

impl<N: Notifier> Deref for InFlight<'_, N> {
    type Target = UiState;

    fn deref(&self) -> &UiState {
        &*self.state
    }
}

impl<N: Notifier> DerefMut for InFlight<'_, N> {
    fn deref_mut(&mut self) -> &mut UiState {
        &mut *self.state
    }
}

impl<N: Notifier> Drop for InFlight<'_, N> {
    fn drop(&mut self) {
        self.state.uploading = false;
        self.notifier.on_state_change(&*self.state);
    }
}
