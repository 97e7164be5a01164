//! Paragraph-aligned splitting of long page text.
//!
//! Paragraphs are separated by a blank line (`"\n\n"`). Consecutive
//! paragraphs are packed greedily into a chunk while the chunk stays under
//! the threshold. A paragraph is never cut: one longer than the threshold
//! becomes a chunk of its own.
//!
//! Lengths are counted in `char`s, not bytes, so CJK and other multi-byte
//! text is measured the way a reader would count it.

/// Separator between paragraphs, both when splitting and when rejoining.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Split `text` into paragraph-aligned chunks bounded by `threshold` chars.
///
/// Each chunk is trimmed; chunks that are empty after trimming are dropped.
pub fn split_into_chunks(text: &str, threshold: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        let para_len = paragraph.chars().count();
        if current_len + para_len < threshold {
            current.push_str(paragraph);
            current.push_str(PARAGRAPH_SEPARATOR);
            current_len += para_len + PARAGRAPH_SEPARATOR.len();
        } else {
            push_trimmed(&mut chunks, &current);
            current.clear();
            current.push_str(paragraph);
            current.push_str(PARAGRAPH_SEPARATOR);
            current_len = para_len + PARAGRAPH_SEPARATOR.len();
        }
    }
    push_trimmed(&mut chunks, &current);

    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
