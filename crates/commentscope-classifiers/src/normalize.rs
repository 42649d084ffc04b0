//! Comment text normalization for model input

use commentscope_core::Result;
use regex::Regex;

/// Strips URLs, mentions, hashtag marks, and decorative characters.
///
/// The cleaned text is only fed to the model stage of the sentiment cascade;
/// the rule stages look at the raw text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_regex: Regex,
    mention_regex: Regex,
    disallowed_regex: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        Ok(Self {
            url_regex: Regex::new(r"https?\S+|www\S+").map_err(|e| {
                commentscope_core::Error::classifier(format!("Failed to compile URL regex: {}", e))
            })?,
            mention_regex: Regex::new(r"@\w+").map_err(|e| {
                commentscope_core::Error::classifier(format!(
                    "Failed to compile mention regex: {}",
                    e
                ))
            })?,
            disallowed_regex: Regex::new(r"[^\w\s.,!?-]").map_err(|e| {
                commentscope_core::Error::classifier(format!(
                    "Failed to compile character filter regex: {}",
                    e
                ))
            })?,
        })
    }

    /// Normalize raw comment text
    pub fn normalize(&self, text: &str) -> String {
        let text = self.url_regex.replace_all(text, "");
        let text = self.mention_regex.replace_all(&text, "");
        let text = text.replace('#', "");
        let text = self.disallowed_regex.replace_all(&text, "");

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create text normalizer")
    }
}

/// Truncate to at most `max_chars` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_urls_mentions_and_hashtags() {
        let normalizer = TextNormalizer::new().unwrap();

        let cleaned = normalizer.normalize(
            "@shop check https://example.com/p?id=1 and www.test.org #awesome deal!!",
        );
        assert_eq!(cleaned, "check and awesome deal!!");
    }

    #[test]
    fn test_removes_emoji_and_symbols_but_keeps_punctuation() {
        let normalizer = TextNormalizer::new().unwrap();

        assert_eq!(
            normalizer.normalize("😡 broke in 2 days... why?! $$$ (never again)"),
            "broke in 2 days... why?! never again"
        );
        assert_eq!(normalizer.normalize("well-made, but slow"), "well-made, but slow");
    }

    #[test]
    fn test_keeps_non_latin_words() {
        let normalizer = TextNormalizer::new().unwrap();

        assert_eq!(normalizer.normalize("juda   yomon  ❤"), "juda yomon");
        assert_eq!(normalizer.normalize("çok kötü"), "çok kötü");
    }

    #[test]
    fn test_empty_and_whitespace() {
        let normalizer = TextNormalizer::new().unwrap();

        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("   \n\t "), "");
        assert_eq!(normalizer.normalize("🔥🔥"), "");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("çöü", 2), "çö");
        assert_eq!(truncate_chars("", 0), "");
    }
}
