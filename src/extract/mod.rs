//! Text extraction from uploaded files.
//!
//! The pipeline works on plain text; this module is the adapter in front of
//! it. File type is decided by extension alone. PDF extraction runs on a
//! blocking thread since the decoder is CPU-bound.

use std::path::Path;

use crate::types::{AppError, Result};

/// Supported upload file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Plain text, including markdown.
    Text,
    /// PDF document.
    Pdf,
    /// Word document. Recognized but not yet extractable.
    Docx,
    /// Rich text. Recognized but not yet extractable.
    Rtf,
}

impl FileType {
    /// Detect the file type from the path extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| {
                AppError::Extraction(format!("File '{}' has no extension", path.display()))
            })?;

        match extension.as_str() {
            "txt" | "md" => Ok(FileType::Text),
            "pdf" => Ok(FileType::Pdf),
            "docx" => Ok(FileType::Docx),
            "rtf" => Ok(FileType::Rtf),
            other => Err(AppError::Extraction(format!(
                "Unsupported file type '.{}'",
                other
            ))),
        }
    }
}

/// Extract the text of an uploaded file.
pub async fn extract_text(path: &Path) -> Result<String> {
    match FileType::from_path(path)? {
        FileType::Text => tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Extraction(format!("Failed to read '{}': {}", path.display(), e))
        }),
        FileType::Pdf => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text(&path).map_err(|e| {
                    AppError::Extraction(format!(
                        "Failed to extract PDF '{}': {}",
                        path.display(),
                        e
                    ))
                })
            })
            .await
            .map_err(|e| AppError::Internal(format!("PDF extraction task failed: {}", e)))?
        }
        FileType::Docx | FileType::Rtf => Err(AppError::Extraction(format!(
            "Extraction for '{}' files is not implemented",
            path.extension().and_then(|e| e.to_str()).unwrap_or("?")
        ))),
    }
}
