//! Text normalization for preprocessing.

use crate::config::TextConfig;
use unicode_normalization::UnicodeNormalization;

/// Document-level normalizer plus the token keep-rule.
#[derive(Debug, Clone)]
pub struct Normalizer {
    unicode_normalize: bool,
}

impl Normalizer {
    /// Creates a new normalizer with the given configuration.
    pub fn new(config: &TextConfig) -> Self {
        Self {
            unicode_normalize: config.unicode_normalize,
        }
    }

    /// Creates a normalizer with default configuration.
    pub fn default_config() -> Self {
        Self::new(&TextConfig::default())
    }

    /// Composes (NFC, if enabled) and lowercases a whole document.
    pub fn normalize_text(&self, text: &str) -> String {
        if self.unicode_normalize {
            text.nfc().collect::<String>().to_lowercase()
        } else {
            text.to_lowercase()
        }
    }

    /// Returns true if the token is non-empty and purely alphabetic.
    #[inline]
    pub fn is_alphabetic(token: &str) -> bool {
        !token.is_empty() && token.chars().all(char::is_alphabetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase() {
        let normalizer = Normalizer::default_config();
        assert_eq!(normalizer.normalize_text("HELLO World"), "hello world");
    }

    #[test]
    fn test_unicode_composition() {
        let normalizer = Normalizer::default_config();
        // "cafe" followed by a combining acute accent
        let decomposed = "Cafe\u{301}";
        assert_eq!(normalizer.normalize_text(decomposed), "caf\u{e9}");
        assert!(Normalizer::is_alphabetic(&normalizer.normalize_text(decomposed)));
    }

    #[test]
    fn test_disabled_normalization() {
        let config = TextConfig {
            unicode_normalize: false,
            ..Default::default()
        };
        let normalizer = Normalizer::new(&config);
        assert_eq!(normalizer.normalize_text("Cafe\u{301}"), "cafe\u{301}");
    }

    #[test]
    fn test_alphabetic_rule() {
        assert!(Normalizer::is_alphabetic("hello"));
        assert!(Normalizer::is_alphabetic("мир"));
        assert!(!Normalizer::is_alphabetic("abc123"));
        assert!(!Normalizer::is_alphabetic("n't"));
        assert!(!Normalizer::is_alphabetic("42"));
        assert!(!Normalizer::is_alphabetic(""));
    }
}
