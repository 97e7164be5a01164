//! Shared application state for the HTTP handlers.

use crate::config::{ServerConfig, TranslationConfig};
use crate::error::TranslatorError;
use crate::pipeline::extract::{PageExtractor, PdfiumExtractor};
use crate::pipeline::llm::Translator;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cloned into every handler; all fields are cheap `Arc` clones.
#[derive(Clone)]
pub struct AppState {
    pub server: Arc<ServerConfig>,
    pub translation: Arc<TranslationConfig>,
    pub extractor: Arc<dyn PageExtractor>,
    translator: Arc<OnceCell<Translator>>,
}

impl AppState {
    /// State with the pdfium extractor and a translator built on first use.
    pub fn new(server: ServerConfig, translation: TranslationConfig) -> Self {
        let extractor = Arc::new(PdfiumExtractor::new(server.pdfium_library_path.clone()));
        Self {
            server: Arc::new(server),
            translation: Arc::new(translation),
            extractor,
            translator: Arc::new(OnceCell::new()),
        }
    }

    /// Replace the PDF extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Use `translator` instead of building one from the configuration.
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = Arc::new(OnceCell::from(translator));
        self
    }

    /// The shared translator, built on the first call.
    ///
    /// A failed build (missing API key) is not cached, so fixing the
    /// environment and retrying the request works without a restart.
    pub async fn translator(&self) -> Result<&Translator, TranslatorError> {
        self.translator
            .get_or_try_init(|| Translator::new(&self.translation))
            .await
    }
}
