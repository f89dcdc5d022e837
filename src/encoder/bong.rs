//! Bag-of-n-grams encoder: TF-IDF over contiguous word n-grams.

use crate::config::BongConfig;
use crate::encoder::bow::{encode_padded, fit_vectorizer};
use crate::encoder::{kind_mismatch, EncoderKind, EncoderSnapshot, TextEncoder};
use crate::error::{EncoderError, Result};
use crate::storage::EncoderFile;
use crate::text::Preprocessor;
use crate::vectorize::TfidfVectorizer;
use ndarray::Array2;
use std::path::Path;

/// Like [`crate::BowEncoder`], but the terms are n-grams of exactly `n` words.
#[derive(Debug)]
pub struct BongEncoder {
    config: BongConfig,
    preprocessor: Preprocessor,
    vectorizer: Option<TfidfVectorizer>,
}

impl BongEncoder {
    /// Creates an unfitted encoder.
    pub fn new(config: BongConfig) -> Result<Self> {
        Self::from_parts(config, None)
    }

    pub(crate) fn from_parts(
        config: BongConfig,
        vectorizer: Option<TfidfVectorizer>,
    ) -> Result<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(&config.text)?;
        Ok(Self {
            config,
            preprocessor,
            vectorizer,
        })
    }

    /// Configuration of this encoder.
    pub fn config(&self) -> &BongConfig {
        &self.config
    }

    /// N-gram size.
    pub fn n(&self) -> usize {
        self.config.n
    }

    /// Fitted vectorizer, if any.
    pub fn vectorizer(&self) -> Option<&TfidfVectorizer> {
        self.vectorizer.as_ref()
    }

    /// Loads an encoder written by [`TextEncoder::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match EncoderFile::read(path)? {
            EncoderSnapshot::Bong { config, vectorizer } => Self::from_parts(config, vectorizer),
            other => Err(kind_mismatch(EncoderKind::Bong, other.kind())),
        }
    }
}

impl TextEncoder for BongEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Bong
    }

    fn encoding_length(&self) -> usize {
        self.config.encoding_length
    }

    fn is_fitted(&self) -> bool {
        self.vectorizer.is_some()
    }

    fn fit(&mut self, docs: &[&str]) -> Result<&mut dyn TextEncoder> {
        let vectorizer = fit_vectorizer(
            EncoderKind::Bong,
            &self.preprocessor,
            docs,
            TfidfVectorizer::new(self.config.n).with_max_features(self.config.encoding_length),
        )?;
        self.vectorizer = Some(vectorizer);
        Ok(self)
    }

    fn transform(&self, docs: &[&str]) -> Result<Array2<f64>> {
        let vectorizer = self
            .vectorizer
            .as_ref()
            .ok_or(EncoderError::NotFitted { encoder: "BoNG" })?;
        Ok(encode_padded(
            &self.preprocessor,
            vectorizer,
            docs,
            self.config.encoding_length,
        ))
    }

    fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot::Bong {
            config: self.config.clone(),
            vectorizer: self.vectorizer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Language;

    #[test]
    fn test_bigram_terms() {
        let mut encoder = BongEncoder::new(BongConfig::new(Language::English, 10)).unwrap();
        encoder
            .fit(&["I do not like rainy days", "I like sunny days"])
            .unwrap();
        let terms = encoder.vectorizer().unwrap().terms();
        assert_eq!(terms, vec!["like rainy", "like sunny", "not like", "rainy day", "sunny day"]);
    }

    #[test]
    fn test_trigrams_and_width() {
        let config = BongConfig::new(Language::English, 8).with_n(3);
        let mut encoder = BongEncoder::new(config).unwrap();
        let out = encoder
            .fit_transform(&["quick brown fox jumps", "lazy brown dog sleeps"])
            .unwrap();
        assert_eq!(out.shape(), &[2, 8]);
        assert_eq!(encoder.vectorizer().unwrap().vocabulary_size(), 4);
        for row in out.rows() {
            assert!((row.dot(&row).sqrt() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_word_documents_fail() {
        let mut encoder = BongEncoder::new(BongConfig::default()).unwrap();
        let err = encoder.fit(&["hello", "world"]).unwrap_err();
        assert!(matches!(err, EncoderError::Training(_)));
        assert!(matches!(
            encoder.transform(&["hello"]),
            Err(EncoderError::NotFitted { encoder: "BoNG" })
        ));
    }

    #[test]
    fn test_zero_n_rejected() {
        let config = BongConfig::default().with_n(0);
        assert!(matches!(BongEncoder::new(config), Err(EncoderError::Config(_))));
    }
}
