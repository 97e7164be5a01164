//! Prompts sent to the chat model.
//!
//! Every prompt lives here so wording changes touch exactly one place, and
//! so tests can inspect the rendered messages without a live model.

/// Sampling temperature for every translation request.
///
/// Low values keep the model close to the source text.
pub const TRANSLATION_TEMPERATURE: f32 = 0.3;

/// System message naming the model a translation expert for the language pair.
pub fn system_prompt(source_lang: &str, target_lang: &str) -> String {
    format!("You are a professional {source_lang} to {target_lang} translation expert.")
}

/// User message wrapping `text` in the fixed translation instructions.
pub fn translation_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "Translate the following {source_lang} text into {target_lang}. Requirements:\n\
1. Keep the formatting and structure of the original.\n\
2. Translate accurately and fluently.\n\
3. For technical documents, keep technical terminology precise.\n\
\n\
Original text:\n\
{text}\n\
\n\
Translation:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_language_pair() {
        let p = system_prompt("English", "Chinese");
        assert!(p.contains("English to Chinese"));
        assert!(p.contains("translation expert"));
    }

    #[test]
    fn translation_prompt_embeds_text_verbatim() {
        let text = "Line one\n\nLine two";
        let p = translation_prompt(text, "English", "Chinese");
        assert!(p.contains("Translate the following English text into Chinese"));
        assert!(p.contains(text));
        assert!(p.contains("formatting and structure"));
        assert!(p.contains("terminology"));
        assert!(p.trim_end().ends_with("Translation:"));
    }
}
