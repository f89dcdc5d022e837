//! Topic-distribution encoder (LDA).

use crate::config::LdaConfig;
use crate::encoder::{kind_mismatch, require_documents, EncoderKind, EncoderSnapshot, TextEncoder};
use crate::error::{EncoderError, Result};
use crate::storage::EncoderFile;
use crate::text::Preprocessor;
use crate::topic::{BagOfWords, Dictionary, LdaModel, LdaSettings};
use log::info;
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dictionary and topic model learned by [`LdaEncoder::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLda {
    /// Token ids of the training corpus.
    pub dictionary: Dictionary,
    /// Trained topic model.
    pub model: LdaModel,
}

/// Encodes documents as their distribution over `encoding_length` topics.
///
/// Every row sums to one. Tokens unseen during fit are ignored, so a document
/// made only of such tokens gets the uniform distribution.
#[derive(Debug)]
pub struct LdaEncoder {
    config: LdaConfig,
    preprocessor: Preprocessor,
    fitted: Option<FittedLda>,
}

impl LdaEncoder {
    /// Creates an unfitted encoder.
    pub fn new(config: LdaConfig) -> Result<Self> {
        Self::from_parts(config, None)
    }

    pub(crate) fn from_parts(config: LdaConfig, fitted: Option<FittedLda>) -> Result<Self> {
        config.validate()?;
        if let Some(fitted) = &fitted {
            if fitted.model.num_topics() != config.num_topics() {
                return Err(EncoderError::InvalidModelFormat(format!(
                    "LDA model has {} topics but encoding_length is {}",
                    fitted.model.num_topics(),
                    config.num_topics()
                )));
            }
        }
        let preprocessor = Preprocessor::new(&config.text)?;
        Ok(Self {
            config,
            preprocessor,
            fitted,
        })
    }

    /// Configuration of this encoder.
    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    /// Learned dictionary, if fitted.
    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.fitted.as_ref().map(|f| &f.dictionary)
    }

    /// Trained topic model, if fitted.
    pub fn model(&self) -> Option<&LdaModel> {
        self.fitted.as_ref().map(|f| &f.model)
    }

    /// Loads an encoder written by [`TextEncoder::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match EncoderFile::read(path)? {
            EncoderSnapshot::Lda { config, fitted } => Self::from_parts(config, fitted),
            other => Err(kind_mismatch(EncoderKind::Lda, other.kind())),
        }
    }

    fn settings(&self) -> LdaSettings {
        LdaSettings {
            num_topics: self.config.num_topics(),
            passes: self.config.passes,
            iterations: self.config.iterations,
            gamma_threshold: self.config.gamma_threshold,
        }
    }
}

impl TextEncoder for LdaEncoder {
    fn kind(&self) -> EncoderKind {
        EncoderKind::Lda
    }

    fn encoding_length(&self) -> usize {
        self.config.encoding_length
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    fn fit(&mut self, docs: &[&str]) -> Result<&mut dyn TextEncoder> {
        require_documents(EncoderKind::Lda, docs)?;
        info!(
            "Fitting LDA encoder on {} documents ({} topics)",
            docs.len(),
            self.config.num_topics()
        );

        let tokens = self.preprocessor.tokens(docs);
        let dictionary = Dictionary::from_documents(&tokens);
        let corpus: Vec<BagOfWords> = tokens.iter().map(|doc| dictionary.doc2bow(doc)).collect();

        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let model = LdaModel::train(&corpus, dictionary.len(), &self.settings(), &mut rng)?;

        info!(
            "LDA encoder fitted: {} dictionary entries, {} topics",
            dictionary.len(),
            model.num_topics()
        );
        self.fitted = Some(FittedLda { dictionary, model });
        Ok(self)
    }

    fn transform(&self, docs: &[&str]) -> Result<Array2<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(EncoderError::NotFitted { encoder: "LDA" })?;

        let mut out = Array2::zeros((docs.len(), self.config.num_topics()));
        if docs.is_empty() {
            return Ok(out);
        }

        for (mut row, tokens) in out.rows_mut().into_iter().zip(self.preprocessor.tokens(docs)) {
            let bow = fitted.dictionary.doc2bow(&tokens);
            row.assign(&fitted.model.document_topics(&bow));
        }
        Ok(out)
    }

    fn snapshot(&self) -> EncoderSnapshot {
        EncoderSnapshot::Lda {
            config: self.config.clone(),
            fitted: self.fitted.clone(),
        }
    }
}
