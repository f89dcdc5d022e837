//! The shared preprocessing pipeline.

use crate::config::TextConfig;
use crate::error::Result;
use crate::text::{resources, Language, Lemmatizer, Normalizer, StopWords, Tokenizer};
use rayon::prelude::*;
use rust_stemmers::Stemmer;
use std::fmt;
use std::sync::Arc;

/// Output of [`Preprocessor::preprocess`], one entry per input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preprocessed {
    /// Cleaned token sequences.
    Tokens(Vec<Vec<String>>),
    /// Cleaned tokens joined by single spaces.
    Joined(Vec<String>),
}

impl Preprocessed {
    /// Number of documents.
    pub fn len(&self) -> usize {
        match self {
            Preprocessed::Tokens(docs) => docs.len(),
            Preprocessed::Joined(docs) => docs.len(),
        }
    }

    /// Returns true if there are no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts into token sequences.
    pub fn into_tokens(self) -> Vec<Vec<String>> {
        match self {
            Preprocessed::Tokens(docs) => docs,
            Preprocessed::Joined(docs) => docs
                .into_iter()
                .map(|d| d.split_whitespace().map(str::to_string).collect())
                .collect(),
        }
    }

    /// Converts into space-joined strings.
    pub fn into_joined(self) -> Vec<String> {
        match self {
            Preprocessed::Tokens(docs) => docs.into_iter().map(|d| d.join(" ")).collect(),
            Preprocessed::Joined(docs) => docs,
        }
    }
}

/// Per-token reduction applied after filtering.
enum Reducer {
    Lemmatize(Lemmatizer),
    Stem(Stemmer),
}

impl Reducer {
    fn for_language(language: Language) -> Self {
        if language.uses_lemmatizer() {
            Reducer::Lemmatize(Lemmatizer::new())
        } else {
            Reducer::Stem(Stemmer::create(language.stemmer_algorithm()))
        }
    }

    fn reduce(&self, token: &str) -> String {
        match self {
            Reducer::Lemmatize(lemmatizer) => lemmatizer.lemmatize(token),
            Reducer::Stem(stemmer) => stemmer.stem(token).into_owned(),
        }
    }
}

/// Cleans raw documents into token sequences.
///
/// Each document is normalized and lowercased, split into words, stripped of
/// stop words (the negation markers "not" and "no" survive) and of
/// non-alphabetic tokens, then lemmatized (English) or stemmed.
pub struct Preprocessor {
    language: Language,
    normalizer: Normalizer,
    tokenizer: Tokenizer,
    stop_words: Arc<StopWords>,
    reducer: Reducer,
    parallel: bool,
}

impl Preprocessor {
    /// Builds a preprocessor, provisioning the language's stop words if needed.
    pub fn new(config: &TextConfig) -> Result<Self> {
        let stop_words = resources::provision(config.language, config.resource_dir.as_deref())?;
        Ok(Self::with_stop_words(config, stop_words))
    }

    /// Builds a preprocessor around an already loaded stop-word set.
    pub fn with_stop_words(config: &TextConfig, stop_words: Arc<StopWords>) -> Self {
        Self {
            language: config.language,
            normalizer: Normalizer::new(config),
            tokenizer: Tokenizer::new(config.language),
            stop_words,
            reducer: Reducer::for_language(config.language),
            parallel: config.parallel,
        }
    }

    /// Language this preprocessor applies.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Stop words in effect.
    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    /// Cleans a single document.
    pub fn clean(&self, doc: &str) -> Vec<String> {
        let text = self.normalizer.normalize_text(doc);
        self.tokenizer
            .tokenize(&text)
            .into_iter()
            .filter(|t| !self.stop_words.contains(&t.text) && Normalizer::is_alphabetic(&t.text))
            .map(|t| self.reducer.reduce(&t.text))
            .collect()
    }

    /// Cleans every document, returning token lists or joined strings.
    pub fn preprocess(&self, docs: &[&str], as_list: bool) -> Preprocessed {
        let cleaned: Vec<Vec<String>> = if self.parallel {
            docs.par_iter().map(|doc| self.clean(doc)).collect()
        } else {
            docs.iter().map(|doc| self.clean(doc)).collect()
        };

        if as_list {
            Preprocessed::Tokens(cleaned)
        } else {
            Preprocessed::Joined(cleaned.into_iter().map(|d| d.join(" ")).collect())
        }
    }

    /// Cleans every document into token lists.
    pub fn tokens(&self, docs: &[&str]) -> Vec<Vec<String>> {
        self.preprocess(docs, true).into_tokens()
    }

    /// Cleans every document into space-joined strings.
    pub fn joined(&self, docs: &[&str]) -> Vec<String> {
        self.preprocess(docs, false).into_joined()
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("language", &self.language)
            .field("stop_words", &self.stop_words.len())
            .field("parallel", &self.parallel)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Preprocessor {
        Preprocessor::new(&TextConfig::default()).unwrap()
    }

    #[test]
    fn test_negation_survives() {
        let pre = english();
        assert_eq!(
            pre.tokens(&["I do not like running quickly"]),
            vec![vec!["not", "like", "running", "quickly"]]
        );
    }

    #[test]
    fn test_contracted_negation_is_dropped() {
        // "n't" is not alphabetic, only the spelled-out marker survives
        let pre = english();
        assert_eq!(pre.tokens(&["I don't like cats"]), vec![vec!["like", "cat"]]);
        assert_eq!(pre.tokens(&["I cannot say no"]), vec![vec!["not", "say", "no"]]);
    }

    #[test]
    fn test_non_alphabetic_dropped() {
        let pre = english();
        assert_eq!(
            pre.joined(&["Version 2.0 shipped 42 features!"]),
            vec!["version shipped feature"]
        );
    }

    #[test]
    fn test_empty_document_keeps_position() {
        let pre = english();
        let out = pre.preprocess(&["the cats", "", "the and of", "dogs"], true);
        assert_eq!(
            out,
            Preprocessed::Tokens(vec![
                vec!["cat".to_string()],
                vec![],
                vec![],
                vec!["dog".to_string()],
            ])
        );
    }

    #[test]
    fn test_joined_form() {
        let pre = english();
        let out = pre.preprocess(&["The quick brown foxes"], false);
        assert_eq!(out, Preprocessed::Joined(vec!["quick brown fox".to_string()]));
    }

    #[test]
    fn test_stemming_for_german() {
        let pre = Preprocessor::new(&TextConfig::new(Language::German)).unwrap();
        let tokens = pre.tokens(&["Die Katzen laufen nicht"]);
        assert_eq!(tokens[0], vec!["katz", "lauf"]);
    }

    #[test]
    fn test_parallel_preserves_order() {
        let config = TextConfig {
            parallel: true,
            ..Default::default()
        };
        let pre = Preprocessor::new(&config).unwrap();
        let docs: Vec<String> = (0..64).map(|i| format!("apple{} banana", "x".repeat(i % 5))).collect();
        let refs: Vec<&str> = docs.iter().map(String::as_str).collect();

        let sequential = english().joined(&refs);
        assert_eq!(pre.joined(&refs), sequential);
    }
}
