//! Library-level tests for the translate pipeline.
//!
//! Extraction and the chat API are stubbed; the real pieces in between
//! (input validation, page selection, chunking, retry, error mapping) run
//! as in production.

use async_trait::async_trait;
use pdf_translator::{
    split_into_chunks, translate_document, translate_pages, ChatRequest, ChatTransport,
    ExtractedDocument, Page, PageExtractor, PageSelection, RetryPolicy, TranslationConfig,
    Translator, TranslatorError, TransportError, DEFAULT_CHUNK_SIZE,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn source_text(request: &ChatRequest) -> String {
    let prompt = &request.messages[1].content;
    let start = prompt.find("Original text:\n").unwrap() + "Original text:\n".len();
    let end = prompt.rfind("\n\nTranslation:").unwrap();
    prompt[start..end].to_string()
}

/// Upper-cases the source text and records everything it was asked.
#[derive(Default)]
struct UpperTransport {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatTransport for UpperTransport {
    async fn complete(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let text = source_text(request);
        self.seen.lock().unwrap().push(text.clone());
        Ok(text.to_uppercase())
    }
}

/// Never connects.
#[derive(Default)]
struct DeadTransport {
    calls: AtomicU32,
}

#[async_trait]
impl ChatTransport for DeadTransport {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::Connect("tcp connect error: Connection refused".into()))
    }
}

struct FixedExtractor(Vec<Page>);

impl PageExtractor for FixedExtractor {
    fn extract(&self, _path: &Path) -> Result<ExtractedDocument, TranslatorError> {
        Ok(ExtractedDocument::from_pages(self.0.clone()))
    }
}

fn config() -> TranslationConfig {
    TranslationConfig::builder()
        .api_key("sk-test")
        .build()
        .unwrap()
}

fn page(n: u32, text: &str) -> Page {
    Page::new(n, text, [0.0, 0.0, 595.0, 842.0])
}

fn pdf_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("doc.pdf");
    std::fs::write(&path, b"%PDF-1.7\n").unwrap();
    path
}

// ── translate_pages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn five_thousand_char_page_is_sent_in_chunks() {
    let transport = Arc::new(UpperTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config());

    let paragraph = "lorem ipsum dolor sit amet ".repeat(18);
    let paragraph = paragraph.trim();
    let text = vec![paragraph; 11].join("\n\n");
    assert!(text.chars().count() >= 5000);

    let out = assert_ok!(translate_pages(&translator, &[page(1, &text)], 2000).await);

    let seen = transport.seen.lock().unwrap();
    assert!(seen.len() >= 3, "only {} requests", seen.len());
    assert_eq!(*seen, split_into_chunks(&text, 2000));
    assert_eq!(out[0].translated, text.to_uppercase());
    assert_eq!(out[0].original, text);
}

#[tokio::test]
async fn short_pages_are_sent_whole() {
    let transport = Arc::new(UpperTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config());
    let pages = vec![page(1, "first\n\nparagraphs"), page(2, "second")];

    let out = assert_ok!(translate_pages(&translator, &pages, DEFAULT_CHUNK_SIZE).await);
    assert_eq!(out.len(), 2);
    assert_eq!(
        *transport.seen.lock().unwrap(),
        vec!["first\n\nparagraphs".to_string(), "second".to_string()]
    );
}

#[tokio::test]
async fn empty_page_text_is_still_sent() {
    let transport = Arc::new(UpperTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config());

    let out = assert_ok!(translate_pages(&translator, &[page(1, "")], 2000).await);
    assert_eq!(out[0].translated, "");
    assert_eq!(transport.seen.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dead_connection_exhausts_retries_and_reports_hints() {
    let transport = Arc::new(DeadTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config());

    let err = assert_err!(translate_pages(&translator, &[page(1, "Hello"), page(2, "more")], 2000).await);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

    let message = err.to_string();
    assert!(matches!(err, TranslatorError::ConnectionExhausted { attempts: 3, .. }));
    assert!(message.contains("Connection refused"));
    assert!(message.contains("PROXY"));
}

#[tokio::test]
async fn retry_policy_can_be_tightened() {
    let transport = Arc::new(DeadTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config())
        .with_retry_policy(RetryPolicy::linear(2, Duration::ZERO));

    assert_err!(translate_pages(&translator, &[page(1, "Hello")], 2000).await);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retry_policy_can_be_disabled() {
    let transport = Arc::new(DeadTransport::default());
    let translator = Translator::with_transport(transport.clone(), &config())
        .with_retry_policy(RetryPolicy::none());

    let err = assert_err!(translate_pages(&translator, &[page(1, "Hello")], 2000).await);
    assert!(matches!(err, TranslatorError::ConnectionExhausted { attempts: 1, .. }));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

// ── translate_document ───────────────────────────────────────────────────────

#[tokio::test]
async fn document_selection_keeps_document_order() {
    let dir = TempDir::new().unwrap();
    let path = pdf_file(&dir);
    let extractor = Arc::new(FixedExtractor(vec![
        page(1, "one"),
        page(2, "two"),
        page(3, "three"),
    ]));
    let translator = Translator::with_transport(Arc::new(UpperTransport::default()), &config());

    let out = assert_ok!(
        translate_document(
            extractor,
            &translator,
            &path,
            &PageSelection::Set(vec![3, 1, 42]),
            DEFAULT_CHUNK_SIZE,
        )
        .await
    );
    let got: Vec<(u32, &str)> = out.iter().map(|p| (p.page, p.translated.as_str())).collect();
    assert_eq!(got, vec![(1, "ONE"), (3, "THREE")]);
}

#[tokio::test]
async fn document_that_is_not_a_pdf_is_rejected_before_extraction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fake.pdf");
    std::fs::write(&path, b"<html></html>").unwrap();
    let translator = Translator::with_transport(Arc::new(UpperTransport::default()), &config());

    let err = assert_err!(
        translate_document(
            Arc::new(FixedExtractor(vec![page(1, "x")])),
            &translator,
            &path,
            &PageSelection::All,
            DEFAULT_CHUNK_SIZE,
        )
        .await
    );
    assert!(matches!(err, TranslatorError::NotAPdf { .. }));
}

#[tokio::test]
async fn translator_requires_an_api_key() {
    let config = TranslationConfig::builder().provider("openai").build().unwrap();
    let err = assert_err!(Translator::new(&config).await);
    assert!(matches!(err, TranslatorError::Configuration { ref provider, .. } if provider == "openai"));
}
