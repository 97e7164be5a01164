//! Error types for the pdf-translator library.
//!
//! Two error types reflect two layers:
//!
//! * [`TranslatorError`]: everything a caller of the library can see. A
//!   translate request either succeeds for every selected page or fails as a
//!   whole with exactly one of these.
//!
//! * [`TransportError`]: a single failed chat-completion attempt, classified
//!   structurally so the retry policy can tell connection trouble (worth
//!   retrying) from everything else (fail fast). [`crate::Translator`]
//!   folds it into a [`TranslatorError`] before returning.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf-translator library.
#[derive(Debug, Error)]
pub enum TranslatorError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The chat-completion provider cannot be used (missing API key).
    #[error("Provider '{provider}' is not configured.\n{hint}")]
    Configuration { provider: String, hint: String },

    /// A configuration value could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Translation errors ────────────────────────────────────────────────
    /// Every attempt failed with a connection-class error.
    #[error(
        "Connection failed after {attempts} attempts: {detail}\n\
Hints:\n\
  1. Check that the network connection works.\n\
  2. If the API is not directly reachable, set PROXY in .env (e.g. PROXY=http://127.0.0.1:7890).\n\
  3. Check that API_KEY is correct.\n\
  4. Increase TIMEOUT in .env."
    )]
    ConnectionExhausted { attempts: u32, detail: String },

    /// The remote call failed for a reason retrying will not fix.
    #[error("Translation failed: {message}")]
    TranslationFailed { message: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// pdfium could not open the document or read a page's text.
    #[error("PDF extraction failed for '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    // ── Request validation errors ─────────────────────────────────────────
    /// No file was supplied, or the supplied file had an empty name.
    #[error("{0}")]
    MissingFile(String),

    /// The uploaded file does not carry an allowed extension.
    #[error("Unsupported file type: '{filename}' (only .pdf files are accepted)")]
    UnsupportedFileType { filename: String },

    /// The request body is well-formed but semantically unusable.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TranslatorError {
    /// Whether the error was caused by the request rather than by processing it.
    ///
    /// The HTTP layer maps these to `400 Bad Request`; everything else is a
    /// server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslatorError::MissingFile(_)
                | TranslatorError::UnsupportedFileType { .. }
                | TranslatorError::InvalidRequest(_)
        )
    }
}

/// A single failed chat-completion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The TCP/TLS connection could not be established or broke mid-request.
    #[error("connection error: {0}")]
    Connect(String),

    /// The attempt exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid chat-completion payload.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The response parsed but carried no message content.
    #[error("response contained no choices")]
    EmptyResponse,
}

impl TransportError {
    /// Connection-class failures are the only ones worth retrying.
    ///
    /// Timeouts count as connection trouble: a stalled connection looks the
    /// same to the caller as one that never opened.
    pub fn is_connection_class(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() || e.is_request() || e.is_body() {
            TransportError::Connect(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            TransportError::Connect(e.to_string())
        }
    }
}
