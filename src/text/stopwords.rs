//! Stop-word sets with negation markers preserved.

use crate::text::Language;
use log::debug;
use std::collections::HashSet;

/// Negation markers that are never treated as stop words.
pub const NEGATION_MARKERS: [&str; 2] = ["not", "no"];

/// A language's stop-word set, minus the negation markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords {
    language: Language,
    words: HashSet<String>,
}

impl StopWords {
    /// Builds a stop-word set from words, dropping the negation markers.
    ///
    /// Words are lowercased. A list lacking one of the markers is accepted
    /// as is.
    pub fn new<I, S>(language: Language, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();

        for marker in NEGATION_MARKERS {
            if !words.remove(marker) {
                debug!(
                    "stop-word list for {} has no entry {:?}; nothing to keep",
                    language, marker
                );
            }
        }

        Self { language, words }
    }

    /// Parses a list in NLTK corpus format (one word per line).
    pub fn from_lines(language: Language, text: &str) -> Self {
        Self::new(language, text.lines())
    }

    /// Language of this list.
    #[inline]
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns true if `word` is a stop word.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of stop words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negations_removed() {
        let stop = StopWords::new(Language::English, ["the", "not", "no", "and"]);
        assert!(stop.contains("the"));
        assert!(!stop.contains("not"));
        assert!(!stop.contains("no"));
        assert_eq!(stop.len(), 2);
    }

    #[test]
    fn test_missing_negations_tolerated() {
        let stop = StopWords::new(Language::German, ["und", "nicht"]);
        assert!(stop.contains("nicht"));
        assert_eq!(stop.len(), 2);
    }

    #[test]
    fn test_from_lines() {
        let stop = StopWords::from_lines(Language::English, "The\n\n a \nnot\n");
        assert!(stop.contains("the"));
        assert!(stop.contains("a"));
        assert!(!stop.contains("not"));
        assert_eq!(stop.len(), 2);
    }
}
