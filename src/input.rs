//! File picking: turn a user-supplied path into a [`SelectedFile`].
//!
//! This is the only place PDF-ness is checked. The session itself stores
//! whatever it is handed, the same way a page trusts its file input's
//! `accept` filter. We check the `.pdf` extension (the backend refuses
//! anything else with a 400) and the `%PDF` magic bytes so a renamed image
//! fails here with a useful message instead of deep inside OCR.

use crate::error::ClientError;
use crate::model::SelectedFile;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Read a local PDF into memory.
pub async fn open_pdf(path: impl AsRef<Path>) -> Result<SelectedFile, ClientError> {
    let path = path.as_ref().to_path_buf();

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::FileNotFound { path: path.clone() })?;

    if !has_pdf_extension(&path) {
        return Err(ClientError::NotAPdf {
            path,
            reason: "expected a .pdf extension".into(),
        });
    }

    let content = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ClientError::PermissionDenied { path });
        }
        Err(_) => return Err(ClientError::FileNotFound { path }),
    };

    check_magic(&path, &content)?;

    debug!("Selected {} ({} bytes)", path.display(), content.len());
    Ok(SelectedFile::pdf(name, content))
}

/// Case-insensitive `.pdf` extension check.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn check_magic(path: &Path, content: &[u8]) -> Result<(), ClientError> {
    if content.len() < PDF_MAGIC.len() {
        return Err(ClientError::NotAPdf {
            path: path.to_path_buf(),
            reason: format!("file is only {} bytes long", content.len()),
        });
    }
    if &content[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&content[..4]);
        return Err(ClientError::NotAPdf {
            path: path.to_path_buf(),
            reason: format!("First bytes: {magic:?}"),
        });
    }
    Ok(())
}
