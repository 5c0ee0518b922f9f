use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod docx;

/// File extensions (lowercase) that the collector will pick up.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("folder not found: {0}")]
    FolderNotFound(PathBuf),
    #[error("unsupported file type: .{0}")]
    UnsupportedType(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction error: {0}")]
    Pdf(String),
    #[error("DOCX extraction error: {0}")]
    Docx(String),
    #[error("document contains no extractable text")]
    EmptyDocument,
}

/// Whether a path has one of the supported CV extensions (case-insensitive).
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|s| *s == e)
        })
        .unwrap_or(false)
}

/// List the CV files directly inside `folder` (no recursion).
///
/// Only regular files with a supported extension are returned. Results are
/// sorted by path so repeated runs over the same folder process files in the
/// same order on every platform. Files with other extensions are skipped and
/// never produce an output row.
pub fn collect_cv_files(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !folder.is_dir() {
        return Err(IngestError::FolderNotFound(folder.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_supported_path(&path) {
            files.push(path);
        } else {
            tracing::debug!(file = %path.display(), "skipping unsupported file type");
        }
    }

    files.sort();
    Ok(files)
}

/// Extract the plain text of a single document.
///
/// Dispatches on the lowercased extension:
/// - `.pdf` → pdf-extract
/// - `.docx` / `.doc` → OOXML parser (legacy binary `.doc` files fail the
///   ZIP open and surface as a per-file extraction error)
/// - `.txt` → lossy UTF-8 read
///
/// A document whose extracted text is empty or whitespace-only is an error.
pub fn extract_text(path: &Path) -> Result<String, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let text = match ext.as_str() {
        "pdf" => extract_pdf(path)?,
        "docx" | "doc" => docx::extract_docx(path)?,
        "txt" => read_text_lossy(path)?,
        other => return Err(IngestError::UnsupportedType(other.to_string())),
    };

    if text.trim().is_empty() {
        return Err(IngestError::EmptyDocument);
    }
    Ok(text)
}

/// Truncate `text` to its first `max_chars` characters, respecting UTF-8
/// boundaries. Anything past the ceiling is discarded.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn extract_pdf(path: &Path) -> Result<String, IngestError> {
    pdf_extract::extract_text(path).map_err(|e| IngestError::Pdf(e.to_string()))
}

fn read_text_lossy(path: &Path) -> Result<String, IngestError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
