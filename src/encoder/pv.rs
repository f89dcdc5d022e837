//! Paragraph-vector encoder (PV-DM).

use crate::config::PvConfig;
use crate::embedding::{ParagraphSettings, ParagraphVectors, TaggedDocument};
use crate::encoder::{kind_mismatch, require_documents, EncoderKind, EncoderSnapshot, TextEncoder};
use crate::error::{EncoderError, Result};
use crate::storage::EncoderFile;
use crate::text::Preprocessor;
use log::info;
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// Encodes documents as dense paragraph vectors.
///
/// Training documents get vectors learned jointly with the word vectors;
/// `transform` infers a vector for each new document against the frozen
/// model. With `PvConfig::seed` set, both steps are reproducible.
#[derive(Debug)]
pub struct PvEncoder {
    config: PvConfig,
    preprocessor: Preprocessor,
    model: Option<ParagraphVectors>,
}

impl PvEncoder {
    /// Creates an unfitted encoder.
    pub fn new(config: PvConfig) -> Result<Self> {
        Self::from_parts(config, None)
    }

    pub(crate) fn from_parts(config: PvConfig, model: Option<ParagraphVectors>) -> Result<Self> {
        config.validate()?;
        if let Some(model) = &model {
            if model.vector_size() != config.encoding_length {
                return Err(EncoderError::InvalidModelFormat(format!(
                    "PV model has {} dimensions but encoding_length is {}",
                    model.vector_size(),
                    config.encoding_length
                )));
            }
        }
        let preprocessor = Preprocessor::new(&config.text)?;
        Ok(Self {
            config,
            preprocessor,
            model,
        })
    }

    /// Configuration of this encoder.
    pub fn config(&self) -> &PvConfig {
        &self.config
    }

    /// Trained model, if any.
    pub fn model(&self) -> Option<&ParagraphVectors> {
        self.model.as_ref()
    }

    /// Loads an encoder written by [`TextEncoder::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match EncoderFile::read(path)? {
            EncoderSnapshot::Pv { config, model } => Self::from_parts(config, model),
            other => Err(kind_mismatch(EncoderKind::Pv, other.kind())),
        }
    }

    fn settings(&self) -> ParagraphSettings {
        ParagraphSettings {
            vector_size: self.config.encoding_length,
            window: self.config.window,
            min_count: self.config.min_count,
            negative: self.config.negative,
            sample: self.config.sample,
            alpha: self.config.learning_rate as f32,
            min_alpha: self.config.min_learning_rate as f32,
        }
    }

    /// Fresh generator for one fit, or for one document in transform.
    fn rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

impl TextEncoder for PvEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Pv
    }

    fn encoding_length(&self) -> usize {
        self.config.encoding_length
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn fit(&mut self, docs: &[&str]) -> Result<&mut dyn TextEncoder> {
        require_documents(EncoderKind::Pv, docs)?;
        info!(
            "Fitting PV encoder on {} documents ({} dimensions, {} epochs)",
            docs.len(),
            self.config.encoding_length,
            self.config.epochs
        );

        let tagged = TaggedDocument::from_token_lists(self.preprocessor.tokens(docs));
        let mut rng = self.rng();
        let mut model = ParagraphVectors::new(self.settings());
        model.build_vocab(&tagged)?;
        model.train(&tagged, self.config.epochs, &mut rng)?;

        info!("PV encoder fitted: {} words", model.vocabulary_size());
        self.model = Some(model);
        Ok(self)
    }

    fn transform(&self, docs: &[&str]) -> Result<Array2<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or(EncoderError::NotFitted { encoder: "PV" })?;

        let width = self.config.encoding_length;
        let mut out = Array2::zeros((docs.len(), width));
        if docs.is_empty() {
            return Ok(out);
        }

        // Each document gets its own generator so a row never depends on
        // the rest of the batch.
        let epochs = self.config.inference_epochs();
        for (mut row, tokens) in out.rows_mut().into_iter().zip(self.preprocessor.tokens(docs)) {
            let vector = model.infer_vector(&tokens, epochs, &mut self.rng());
            row.assign(&vector.mapv(f64::from));
        }
        Ok(out)
    }

    fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot::Pv {
            config: self.config.clone(),
            model: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Language;

    fn docs() -> Vec<&'static str> {
        vec![
            "The market rallied as investors bought technology stocks",
            "Investors sold stocks as the market slumped",
            "The team scored a late goal to win the match",
            "A late goal gave the home team the match",
            "Technology stocks led the market higher",
        ]
    }

    fn config() -> PvConfig {
        PvConfig::new(Language::English, 12)
            .with_epochs(10)
            .with_min_count(1)
            .with_seed(17)
    }

    #[test]
    fn test_shape() {
        let mut encoder = PvEncoder::new(config()).unwrap();
        let out = encoder.fit_transform(&docs()).unwrap();
        assert_eq!(out.shape(), &[5, 12]);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_seeded_transform_is_reproducible() {
        let mut a = PvEncoder::new(config()).unwrap();
        let mut b = PvEncoder::new(config()).unwrap();
        a.fit(&docs()).unwrap();
        b.fit(&docs()).unwrap();

        let queries = ["stocks and the market", "a goal for the team"];
        assert_eq!(a.transform(&queries).unwrap(), b.transform(&queries).unwrap());
        assert_eq!(a.transform(&queries).unwrap(), a.transform(&queries).unwrap());
    }

    #[test]
    fn test_row_independent_of_batch() {
        let mut encoder = PvEncoder::new(config()).unwrap();
        encoder.fit(&docs()).unwrap();

        let batch = encoder
            .transform(&["cat market", "a goal for the team", "cat market"])
            .unwrap();
        assert_eq!(batch.row(0), batch.row(2));

        let single = encoder.transform(&["a goal for the team"]).unwrap();
        assert_eq!(single.row(0), batch.row(1));
    }

    #[test]
    fn test_unknown_tokens_still_full_length() {
        let mut encoder = PvEncoder::new(config()).unwrap();
        encoder.fit(&docs()).unwrap();
        let out = encoder.transform(&["zebra quokka", ""]).unwrap();
        assert_eq!(out.shape(), &[2, 12]);
        assert!(out.iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_empty_vocabulary() {
        let mut encoder = PvEncoder::new(PvConfig::new(Language::English, 8).with_seed(1)).unwrap();
        // every token occurs once, below the default min_count of 2
        let err = encoder.fit(&["alpha beta", "gamma delta"]).unwrap_err();
        assert!(matches!(err, EncoderError::Training(_)));
        assert!(!encoder.is_fitted());
    }

    #[test]
    fn test_not_fitted() {
        let encoder = PvEncoder::new(config()).unwrap();
        assert!(matches!(
            encoder.transform(&["text"]),
            Err(EncoderError::NotFitted { encoder: "PV" })
        ));
    }
}
