//! Data types produced by extraction and translation.
//!
//! All of these are plain serialisable values: the HTTP layer returns them
//! as JSON unchanged and the CLI prints them with `--json`.

use serde::{Deserialize, Serialize};

/// One PDF page's extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-indexed page number.
    pub page: u32,
    /// Plain text of the page, trimmed. May be empty (scanned pages).
    pub text: String,
    /// Page box as `[x0, top, x1, bottom]` in PDF points.
    pub bbox: [f32; 4],
}

impl Page {
    pub fn new(page: u32, text: impl Into<String>, bbox: [f32; 4]) -> Self {
        Self {
            page,
            text: text.into(),
            bbox,
        }
    }
}

/// Original and translated text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedPage {
    /// 1-indexed page number, copied from the source [`Page`].
    pub page: u32,
    pub original: String,
    pub translated: String,
}

/// Everything extracted from one PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Page count of the document.
    pub total_pages: usize,
    /// One entry per page, ascending by page number.
    pub pages: Vec<Page>,
    /// Non-empty page texts joined with a blank line.
    pub full_text: String,
}

impl ExtractedDocument {
    /// Assemble a document from its pages, computing `full_text`.
    pub fn from_pages(pages: Vec<Page>) -> Self {
        let full_text = join_texts(pages.iter());
        Self {
            total_pages: pages.len(),
            pages,
            full_text,
        }
    }

    /// Text of the listed pages only, in document order.
    ///
    /// An empty list yields the full text.
    pub fn text_for_pages(&self, page_numbers: &[u32]) -> String {
        if page_numbers.is_empty() {
            return self.full_text.clone();
        }
        join_texts(
            self.pages
                .iter()
                .filter(|p| page_numbers.contains(&p.page)),
        )
    }
}

fn join_texts<'a>(pages: impl Iterator<Item = &'a Page>) -> String {
    pages
        .filter(|p| !p.text.is_empty())
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
