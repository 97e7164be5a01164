//! Input validation: file names, upload locations and PDF magic bytes.
//!
//! pdfium gives poor diagnostics for files that are not PDFs at all, so
//! local inputs are checked for the `%PDF` header before extraction. Uploaded
//! file names are reduced to a safe ASCII subset before they touch the disk.

use crate::error::TranslatorError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File extensions accepted for upload (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf"];

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").unwrap());

/// Whether `filename` carries an allowed extension (case-insensitive).
pub fn has_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied file name to a safe one.
///
/// Directory components are dropped, whitespace becomes `_`, anything
/// outside `[A-Za-z0-9_.-]` is removed, and leading dots or underscores are
/// stripped. Returns `None` when nothing usable is left.
pub fn secure_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&base, "");
    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Resolve a client-supplied `filepath` against `upload_dir`.
///
/// A path that already starts with `upload_dir` (the form returned by the
/// upload endpoint, e.g. `uploads/doc.pdf`) is used as is. Other relative
/// paths are joined onto `upload_dir`. Absolute paths outside it and paths
/// containing `..` are rejected.
pub fn resolve_upload_path(upload_dir: &Path, filepath: &str) -> Result<PathBuf, TranslatorError> {
    let requested = Path::new(filepath);
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(TranslatorError::InvalidRequest(format!(
            "filepath '{filepath}' is outside the upload directory"
        )));
    }

    let candidate = if requested.starts_with(upload_dir) {
        requested.to_path_buf()
    } else if requested.is_absolute() {
        return Err(TranslatorError::InvalidRequest(format!(
            "filepath '{filepath}' is outside the upload directory"
        )));
    } else {
        upload_dir.join(requested)
    };

    debug!("Resolved upload path: {}", candidate.display());
    Ok(candidate)
}

/// Check that `path` exists, is readable, and starts with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, TranslatorError> {
    let path = path.to_path_buf();
    if !path.exists() {
        return Err(TranslatorError::FileNotFound { path });
    }

    let mut file = std::fs::File::open(&path).map_err(|source| TranslatorError::Io {
        path: path.clone(),
        source,
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(TranslatorError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
