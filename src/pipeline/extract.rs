//! PDF text extraction via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while parsing. [`extract_document`] moves the work onto
//! tokio's blocking pool so async workers keep serving other requests.
//!
//! ## Library binding
//!
//! The shared library is looked up in this order:
//! 1. the configured path (`PDFIUM_LIB_PATH`), either the library file itself
//!    or a directory holding it
//! 2. the current working directory
//! 3. the system library search path

use crate::error::TranslatorError;
use crate::output::{ExtractedDocument, Page};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a PDF on disk into per-page text.
///
/// Implementations are blocking; call them through [`extract_document`].
pub trait PageExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, TranslatorError>;
}

/// [`PageExtractor`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumExtractor {
    library_path: Option<PathBuf>,
}

impl PdfiumExtractor {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn bind(&self) -> Result<Pdfium, String> {
        if let Some(path) = &self.library_path {
            let lib = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.clone()
            };
            return Pdfium::bind_to_library(&lib)
                .map(Pdfium::new)
                .map_err(|e| format!("cannot load pdfium from '{}': {e}", lib.display()));
        }

        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map(Pdfium::new)
            .map_err(|e| format!("cannot load pdfium (set PDFIUM_LIB_PATH): {e}"))
    }
}

impl PageExtractor for PdfiumExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument, TranslatorError> {
        let failed = |detail: String| TranslatorError::ExtractionFailed {
            path: path.to_path_buf(),
            detail,
        };

        let pdfium = self.bind().map_err(failed)?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| failed(format!("{e:?}")))?;

        let pdf_pages = document.pages();
        info!("PDF loaded: {} pages", pdf_pages.len());

        let mut pages = Vec::with_capacity(pdf_pages.len() as usize);
        for (idx, pdf_page) in pdf_pages.iter().enumerate() {
            let number = idx as u32 + 1;
            let text = pdf_page
                .text()
                .map_err(|e| failed(format!("page {number}: {e:?}")))?
                .all();
            let bbox = [0.0, 0.0, pdf_page.width().value, pdf_page.height().value];
            debug!("Page {}: {} chars", number, text.chars().count());
            pages.push(Page::new(number, text.trim(), bbox));
        }

        Ok(ExtractedDocument::from_pages(pages))
    }
}

/// Run `extractor` on `path` without blocking the async runtime.
pub async fn extract_document(
    extractor: Arc<dyn PageExtractor>,
    path: &Path,
) -> Result<ExtractedDocument, TranslatorError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || extractor.extract(&path))
        .await
        .map_err(|e| TranslatorError::Internal(format!("Extraction task panicked: {e}")))?
}
