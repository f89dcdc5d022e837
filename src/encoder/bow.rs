//! Bag-of-words encoder: TF-IDF over unigrams.

use crate::config::BowConfig;
use crate::encoder::{kind_mismatch, require_documents, EncoderKind, EncoderSnapshot, TextEncoder};
use crate::error::{EncoderError, Result};
use crate::storage::EncoderFile;
use crate::text::Preprocessor;
use crate::vectorize::TfidfVectorizer;
use log::info;
use ndarray::{s, Array2};
use std::path::Path;

/// Encodes documents as L2-normalized TF-IDF weights of their words.
///
/// The vocabulary holds at most `encoding_length` words, ordered
/// alphabetically. When fewer words are learned, the remaining columns are
/// zero.
#[derive(Debug)]
pub struct BowEncoder {
    config: BowConfig,
    preprocessor: Preprocessor,
    vectorizer: Option<TfidfVectorizer>,
}

impl BowEncoder {
    /// Creates an unfitted encoder.
    pub fn new(config: BowConfig) -> Result<Self> {
        Self::from_parts(config, None)
    }

    pub(crate) fn from_parts(config: BowConfig, vectorizer: Option<TfidfVectorizer>) -> Result<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(&config.text)?;
        Ok(Self {
            config,
            preprocessor,
            vectorizer,
        })
    }

    /// Configuration of this encoder.
    pub fn config(&self) -> &BowConfig {
        &self.config
    }

    /// Fitted vectorizer, if any.
    pub fn vectorizer(&self) -> Option<&TfidfVectorizer> {
        self.vectorizer.as_ref()
    }

    /// Loads an encoder written by [`TextEncoder::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match EncoderFile::read(path)? {
            EncoderSnapshot::Bow { config, vectorizer } => Self::from_parts(config, vectorizer),
            other => Err(kind_mismatch(EncoderKind::Bow, other.kind())),
        }
    }
}

impl TextEncoder for BowEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Bow
    }

    fn encoding_length(&self) -> usize {
        self.config.encoding_length
    }

    fn is_fitted(&self) -> bool {
        self.vectorizer.is_some()
    }

    fn fit(&mut self, docs: &[&str]) -> Result<&mut dyn TextEncoder> {
        let vectorizer = fit_vectorizer(
            EncoderKind::Bow,
            &self.preprocessor,
            docs,
            TfidfVectorizer::new(1).with_max_features(self.config.encoding_length),
        )?;
        self.vectorizer = Some(vectorizer);
        Ok(self)
    }

    fn transform(&self, docs: &[&str]) -> Result<Array2<f64>> {
        let vectorizer = self
            .vectorizer
            .as_ref()
            .ok_or(EncoderError::NotFitted { encoder: "BoW" })?;
        Ok(encode_padded(
            &self.preprocessor,
            vectorizer,
            docs,
            self.config.encoding_length,
        ))
    }

    fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot::Bow {
            config: self.config.clone(),
            vectorizer: self.vectorizer.clone(),
        }
    }
}

/// Preprocesses `docs` and fits `vectorizer` on the joined tokens.
pub(crate) fn fit_vectorizer(
    kind: EncoderKind,
    preprocessor: &Preprocessor,
    docs: &[&str],
    mut vectorizer: TfidfVectorizer,
) -> Result<TfidfVectorizer> {
    require_documents(kind, docs)?;
    info!("Fitting {} encoder on {} documents", kind, docs.len());

    let joined = preprocessor.joined(docs);
    vectorizer.fit(&joined)?;

    info!(
        "{} encoder fitted: {} terms",
        kind,
        vectorizer.vocabulary_size()
    );
    Ok(vectorizer)
}

/// Projects `docs` through the vectorizer, zero-padding to `width` columns.
pub(crate) fn encode_padded(
    preprocessor: &Preprocessor,
    vectorizer: &TfidfVectorizer,
    docs: &[&str],
    width: usize,
) -> Array2<f64> {
    let mut out = Array2::zeros((docs.len(), width));
    if docs.is_empty() {
        return out;
    }

    let weights = vectorizer.transform(&preprocessor.joined(docs));
    let cols = weights.ncols().min(width);
    out.slice_mut(s![.., ..cols])
        .assign(&weights.slice(s![.., ..cols]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Language;

    fn docs() -> Vec<&'static str> {
        vec![
            "The cats are sleeping on the warm mat",
            "Dogs are barking loudly at the cats",
            "Stock markets fell sharply today",
        ]
    }

    #[test]
    fn test_transform_before_fit() {
        let encoder = BowEncoder::new(BowConfig::default()).unwrap();
        let err = encoder.transform(&["text"]).unwrap_err();
        assert!(matches!(err, EncoderError::NotFitted { encoder: "BoW" }));
    }

    #[test]
    fn test_fit_empty_docs() {
        let mut encoder = BowEncoder::new(BowConfig::default()).unwrap();
        assert!(matches!(encoder.fit(&[]), Err(EncoderError::EmptyInput(_))));
        assert!(!encoder.is_fitted());
    }

    #[test]
    fn test_shape_is_padded() {
        let mut encoder = BowEncoder::new(BowConfig::new(Language::English, 50)).unwrap();
        let out = encoder.fit_transform(&docs()).unwrap();
        assert_eq!(out.shape(), &[3, 50]);

        let vocab = encoder.vectorizer().unwrap().vocabulary_size();
        assert!(vocab < 50);
        assert!(out.slice(s![.., vocab..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_vocabulary_capped() {
        let mut encoder = BowEncoder::new(BowConfig::new(Language::English, 3)).unwrap();
        let out = encoder.fit_transform(&docs()).unwrap();
        assert_eq!(out.ncols(), 3);
        assert_eq!(encoder.vectorizer().unwrap().vocabulary_size(), 3);
        // "cat" (2) is the only repeated term; ties resolve alphabetically
        assert_eq!(encoder.vectorizer().unwrap().terms(), vec!["barking", "cat", "dog"]);
    }

    #[test]
    fn test_empty_transform() {
        let mut encoder = BowEncoder::new(BowConfig::default()).unwrap();
        encoder.fit(&docs()).unwrap();
        assert_eq!(encoder.transform(&[]).unwrap().shape(), &[0, 100]);
    }

    #[test]
    fn test_failed_fit_keeps_state() {
        let mut encoder = BowEncoder::new(BowConfig::default()).unwrap();
        encoder.fit(&docs()).unwrap();
        let before = encoder.vectorizer().cloned();

        let err = encoder.fit(&["the and of", "a"]).unwrap_err();
        assert!(matches!(err, EncoderError::Training(_)));
        assert_eq!(encoder.vectorizer().cloned(), before);
    }

    #[test]
    fn test_invalid_config() {
        let config = BowConfig::new(Language::English, 0);
        assert!(matches!(BowEncoder::new(config), Err(EncoderError::Config(_))));
    }
}
