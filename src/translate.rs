//! Page translation entry points.
//!
//! [`translate_pages`] is the core loop: pages are translated one after
//! another, in input order, with oversized pages routed through the chunker.
//! [`translate_document`] adds the steps around it (validate the file,
//! extract text, apply the page selection) and is what both the HTTP layer
//! and the CLI call.
//!
//! A run either yields one [`TranslatedPage`] per input page or fails as a
//! whole with the first error; there are no partial results.

use crate::config::PageSelection;
use crate::error::TranslatorError;
use crate::output::{Page, TranslatedPage};
use crate::pipeline::chunk::split_into_chunks;
use crate::pipeline::extract::{extract_document, PageExtractor};
use crate::pipeline::input;
use crate::pipeline::llm::Translator;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Translate `pages` in order.
///
/// Pages longer than `threshold` chars are split into paragraph-aligned
/// chunks; the rest are sent whole.
pub async fn translate_pages(
    translator: &Translator,
    pages: &[Page],
    threshold: usize,
) -> Result<Vec<TranslatedPage>, TranslatorError> {
    let noop: ProgressCallback = Arc::new(NoopProgressCallback);
    translate_pages_with_progress(translator, pages, threshold, &noop).await
}

/// [`translate_pages`] with per-page progress events.
pub async fn translate_pages_with_progress(
    translator: &Translator,
    pages: &[Page],
    threshold: usize,
    progress: &ProgressCallback,
) -> Result<Vec<TranslatedPage>, TranslatorError> {
    let total = pages.len();
    let start = Instant::now();
    info!("Translating {} pages (chunk threshold {})", total, threshold);
    progress.on_translation_start(total);

    let mut translated = Vec::with_capacity(total);
    for page in pages {
        let len = page.text.chars().count();
        let chunks = (len > threshold).then(|| split_into_chunks(&page.text, threshold));
        let chunk_count = chunks.as_ref().map_or(1, Vec::len);
        progress.on_page_start(page.page, total, chunk_count);
        debug!("Page {}: {} chars, {} chunk(s)", page.page, len, chunk_count);

        let result = match &chunks {
            Some(chunks) => translator.translate_chunks(chunks).await,
            None => translator.translate(&page.text, None, None).await,
        };

        match result {
            Ok(text) => {
                progress.on_page_complete(page.page, total, text.chars().count());
                translated.push(TranslatedPage {
                    page: page.page,
                    original: page.text.clone(),
                    translated: text,
                });
            }
            Err(e) => {
                progress.on_page_error(page.page, total, &e.to_string());
                return Err(e);
            }
        }
    }

    progress.on_translation_complete(total);
    info!(
        "Translated {} pages in {}ms",
        total,
        start.elapsed().as_millis()
    );
    Ok(translated)
}

/// Validate, extract and translate the selected pages of the PDF at `path`.
pub async fn translate_document(
    extractor: Arc<dyn PageExtractor>,
    translator: &Translator,
    path: &Path,
    selection: &PageSelection,
    threshold: usize,
) -> Result<Vec<TranslatedPage>, TranslatorError> {
    let noop: ProgressCallback = Arc::new(NoopProgressCallback);
    translate_document_with_progress(extractor, translator, path, selection, threshold, &noop)
        .await
}

/// [`translate_document`] with per-page progress events.
pub async fn translate_document_with_progress(
    extractor: Arc<dyn PageExtractor>,
    translator: &Translator,
    path: &Path,
    selection: &PageSelection,
    threshold: usize,
    progress: &ProgressCallback,
) -> Result<Vec<TranslatedPage>, TranslatorError> {
    let path = input::resolve_local(path)?;
    let document = extract_document(extractor, &path).await?;

    let selected: Vec<Page> = document
        .pages
        .into_iter()
        .filter(|p| selection.contains(p.page))
        .collect();
    debug!(
        "Selected {} of {} pages",
        selected.len(),
        document.total_pages
    );

    translate_pages_with_progress(translator, &selected, threshold, progress).await
}
