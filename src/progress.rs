//! Progress-callback trait for per-page translation events.
//!
//! Pass an [`Arc<dyn TranslationProgressCallback>`] to
//! [`crate::translate::translate_pages_with_progress`] to be told as each
//! page starts, finishes, or fails. The CLI feeds an `indicatif` bar from it;
//! the HTTP layer does not use it.
//!
//! # Example
//!
//! ```rust
//! use pdf_translator::TranslationProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl TranslationProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page: u32, total_pages: usize, translated_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page}/{total_pages}: {translated_len} chars");
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the page orchestrator as it works through the pages.
///
/// Pages are translated one after another, so calls never overlap. The trait
/// is still `Send + Sync` because the callback lives in an `Arc` that may be
/// moved across tokio worker threads between awaits.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once before the first page.
    fn on_translation_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is sent.
    ///
    /// `chunks` is 1 for pages sent whole, or the number of paragraph-aligned
    /// chunks an oversized page was split into.
    fn on_page_start(&self, page: u32, total_pages: usize, chunks: usize) {
        let _ = (page, total_pages, chunks);
    }

    /// Called when a page has been translated.
    fn on_page_complete(&self, page: u32, total_pages: usize, translated_len: usize) {
        let _ = (page, total_pages, translated_len);
    }

    /// Called when a page fails. The run stops right after this call.
    fn on_page_error(&self, page: u32, total_pages: usize, error: &str) {
        let _ = (page, total_pages, error);
    }

    /// Called once after every page has been translated.
    fn on_translation_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias for the shared callback handle.
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_translation_start(2);
        cb.on_page_start(1, 2, 1);
        cb.on_page_complete(1, 2, 42);
        cb.on_page_error(2, 2, "timeout");
        cb.on_translation_complete(2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_translation_start(10);
        cb.on_page_start(1, 10, 3);
    }
}
