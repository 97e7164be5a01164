//! # pdf-translator
//!
//! Extract the text of every page of a PDF and translate it with an
//! OpenAI-compatible chat-completion API (DeepSeek by default).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate path / upload name, check %PDF magic
//!  ├─ 2. Extract    per-page text via pdfium (spawn_blocking)
//!  ├─ 3. Select     keep the requested page numbers
//!  ├─ 4. Chunk      split pages over the threshold at paragraph breaks
//!  ├─ 5. Translate  one chat completion per page or chunk, retried on
//!  │                connection failures with linear backoff
//!  └─ 6. Output     one TranslatedPage per selected page, in order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_translator::{translate_document, PageSelection, PdfiumExtractor, TranslationConfig, Translator};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API_KEY, API_PROVIDER, MODEL, PROXY, TIMEOUT, ... from the environment
//!     let config = TranslationConfig::from_env()?;
//!     let translator = Translator::new(&config).await?;
//!     let pages = translate_document(
//!         Arc::new(PdfiumExtractor::default()),
//!         &translator,
//!         Path::new("paper.pdf"),
//!         &PageSelection::Set(vec![1, 2]),
//!         2000,
//!     )
//!     .await?;
//!     for p in pages {
//!         println!("--- page {} ---\n{}", p.page, p.translated);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | The axum HTTP service ([`server`]) |
//! | `cli`    | on      | Enables the `pdftrans` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable both when using only the library:
//! ```toml
//! pdf-translator = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
#[cfg(feature = "server")]
pub mod server;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    PageSelection, ServerConfig, TranslationConfig, TranslationConfigBuilder, DEFAULT_CHUNK_SIZE,
};
pub use error::{TranslatorError, TransportError};
pub use output::{ExtractedDocument, Page, TranslatedPage};
pub use pipeline::chunk::split_into_chunks;
pub use pipeline::extract::{PageExtractor, PdfiumExtractor};
pub use pipeline::llm::Translator;
pub use pipeline::retry::RetryPolicy;
pub use pipeline::transport::{ChatMessage, ChatRequest, ChatTransport};
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use translate::{
    translate_document, translate_document_with_progress, translate_pages,
    translate_pages_with_progress,
};
