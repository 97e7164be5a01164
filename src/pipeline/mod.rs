//! Pipeline stages for PDF translation.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped (a stub extractor, a stub transport) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ chunk ──▶ llm ──▶ retry ──▶ transport
//! (path)    (pdfium)    (split)   (prompts) (backoff) (HTTP)
//! ```
//!
//! 1. [`input`]: validate file names, upload paths and PDF magic bytes
//! 2. [`extract`]: per-page text via pdfium; runs in `spawn_blocking`
//! 3. [`chunk`]: paragraph-aligned splitting of oversized page text
//! 4. [`llm`]: [`llm::Translator`], which renders prompts and maps failures
//! 5. [`retry`]: attempt budget and linear backoff for connection failures
//! 6. [`transport`]: chat-completions over HTTP, with a one-time proxy probe;
//!    the only stage with network I/O

pub mod chunk;
pub mod extract;
pub mod input;
pub mod llm;
pub mod retry;
pub mod transport;
