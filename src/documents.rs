//! Reading CV documents from disk.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Errors while reading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Path does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The PDF could not be parsed or its text extracted.
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),

    /// I/O failure.
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a CV as text.
///
/// `.pdf` files go through the PDF text extractor, pages concatenated in
/// order. Everything else is decoded as UTF-8, invalid sequences replaced.
///
/// # Errors
/// Returns an error if the file is missing, cannot be read, or is a PDF
/// whose text cannot be extracted.
pub async fn read_cv_file(path: impl AsRef<Path>) -> Result<String, DocumentError> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }
        Err(err) => return Err(err.into()),
    };

    let text = if is_pdf {
        extract_pdf_text(bytes).await?
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };
    info!(path = %path.display(), pdf = is_pdf, chars = text.chars().count(), "document read");
    Ok(text)
}

/// Extract the text of a PDF held in memory.
///
/// Parsing is CPU bound and runs on the blocking pool. A panic inside the
/// parser surfaces as [`DocumentError::Pdf`].
///
/// # Errors
/// Returns [`DocumentError::Pdf`] if the bytes are not a readable PDF.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, DocumentError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| DocumentError::Pdf(e.to_string()))?
        .map_err(|e| DocumentError::Pdf(e.to_string()))
}

/// Drop carriage returns, trim every line, remove empty lines.
#[must_use]
pub fn clean_cv_text(text: &str) -> String {
    text.replace('\r', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
