//! # pdfocr-client
//!
//! Client for a remote PDF OCR service: upload a PDF, read back the tags the
//! service extracted, and fetch the processed result file.
//!
//! The service does all the work (rasterising, OCR, tag extraction, building
//! the spreadsheet). This crate is the glue a front-end needs around it.
//!
//! ## Flow
//!
//! ```text
//! path ──▶ input::open_pdf ──▶ UploadSession::select_file
//!                                    │
//!                              submit()
//!                                    ├─ POST {backend}/upload  → download_url
//!                                    └─ GET  {backend}/tags    → [Tag]
//!                                    │
//!                      render::tag_table / HttpBackend::download
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfocr_client::{input, render, ClientConfig, HttpBackend, NoopNotifier, UploadSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base URL from OCR_BACKEND_URL
//!     let config = ClientConfig::from_env()?;
//!     let backend = HttpBackend::new(config.clone())?;
//!     let mut session = UploadSession::new(backend, NoopNotifier);
//!
//!     session.select_file(input::open_pdf("drawing.pdf").await?);
//!     session.submit().await?;
//!
//!     print!("{}", render::tag_table(&session.state().tags));
//!     if let Some(link) = session.download_link(&config.base_url) {
//!         eprintln!("result: {link}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdfocr-client = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod notify;
pub mod render;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{HttpBackend, OcrBackend};
pub use config::{ClientConfig, ClientConfigBuilder, BACKEND_URL_ENV};
pub use error::{ClientError, RequestStep};
pub use model::{SelectedFile, Tag, UploadResult};
pub use notify::{NoopNotifier, Notice, Notifier};
pub use session::{UiState, UploadSession};
