//! User notification hooks for an [`crate::UploadSession`].
//!
//! A session reports two kinds of things:
//!
//! * **Alerts**: exactly one [`Notice`] per terminal outcome of `submit()`
//!   (no file, success, failure). A terminal UI shows them as a message, a
//!   GUI would pop a modal.
//! * **State changes**: a snapshot of [`crate::UiState`] every time the
//!   session mutates it, so front-ends can redraw (spinner on while
//!   `uploading`, tag table once tags arrive).
//!
//! All methods have default no-op implementations so callers only override
//! what they care about.
//!
//! # Example
//!
//! ```rust
//! use pdfocr_client::{Notice, Notifier};
//!
//! struct Stderr;
//!
//! impl Notifier for Stderr {
//!     fn alert(&self, notice: &Notice) {
//!         eprintln!("{}", notice.message());
//!     }
//! }
//! ```

use crate::session::UiState;
use std::sync::Arc;

/// Terminal outcome of one `submit()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Submit was triggered with nothing selected.
    NoFileSelected,
    /// Upload and tag fetch both succeeded.
    Success,
    /// Either request failed. Deliberately carries no detail; the detail is
    /// in the log.
    Failure,
}

impl Notice {
    /// Text shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Notice::NoFileSelected => "Please select a PDF file.",
            Notice::Success => "File uploaded and processed successfully!",
            Notice::Failure => "Failed to upload file.",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Success)
    }
}

/// Receives alerts and state snapshots from a session.
pub trait Notifier {
    /// Called once per terminal outcome of `submit()`, after the
    /// in-progress flag has been cleared.
    fn alert(&self, notice: &Notice) {
        let _ = notice;
    }

    /// Called after every state mutation.
    fn on_state_change(&self, state: &UiState) {
        let _ = state;
    }
}

/// A notifier that ignores everything.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn alert(&self, notice: &Notice) {
        (**self).alert(notice)
    }

    fn on_state_change(&self, state: &UiState) {
        (**self).on_state_change(state)
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn alert(&self, notice: &Notice) {
        (**self).alert(notice)
    }

    fn on_state_change(&self, state: &UiState) {
        (**self).on_state_change(state)
    }
}
