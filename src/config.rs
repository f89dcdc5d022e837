//! Configuration for the text encoders.
//!
//! Every encoder variant has its own immutable configuration struct. All of
//! them embed a shared [`TextConfig`] driving the preprocessing pipeline.
//! Configurations serialize with serde, so they can be stored alongside
//! fitted encoders or loaded from JSON through [`EncoderConfig`].

use crate::encoder::{BongEncoder, BowEncoder, EncoderKind, LdaEncoder, PvEncoder, TextEncoder};
use crate::error::{EncoderError, Result};
use crate::text::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default encoding length for the bag-of-words and bag-of-n-grams encoders.
pub const DEFAULT_BOW_LENGTH: usize = 100;

/// Default encoding length for the paragraph-vector encoder.
pub const DEFAULT_PV_LENGTH: usize = 20;

/// Default number of topics for the LDA encoder.
pub const DEFAULT_LDA_TOPICS: usize = 20;

/// Text preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Natural language of the documents.
    /// Default: English.
    pub language: Language,

    /// Apply Unicode normalization (NFC) before lowercasing.
    /// Default: true.
    pub unicode_normalize: bool,

    /// Directory holding linguistic resources in NLTK layout
    /// (`corpora/stopwords/<language>`). Bundled lists are used when absent.
    /// Default: None.
    pub resource_dir: Option<PathBuf>,

    /// Preprocess documents on the rayon thread pool.
    /// Default: false.
    pub parallel: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            unicode_normalize: true,
            resource_dir: None,
            parallel: false,
        }
    }
}

impl TextConfig {
    /// Creates a text configuration for the given language.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Default::default()
        }
    }
}

/// Bag-of-words encoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BowConfig {
    /// Preprocessing configuration.
    pub text: TextConfig,
    /// Vector length, also the vocabulary cap.
    /// Default: 100.
    pub encoding_length: usize,
}

impl Default for BowConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            encoding_length: DEFAULT_BOW_LENGTH,
        }
    }
}

impl BowConfig {
    /// Creates a configuration for the given language and length.
    pub fn new(language: Language, encoding_length: usize) -> Self {
        Self {
            text: TextConfig::new(language),
            encoding_length,
        }
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        require_nonzero("encoding_length", self.encoding_length)
    }
}

/// Bag-of-n-grams encoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BongConfig {
    /// Preprocessing configuration.
    pub text: TextConfig,
    /// Vector length, also the vocabulary cap.
    /// Default: 100.
    pub encoding_length: usize,
    /// Number of contiguous words per n-gram.
    /// Default: 2.
    pub n: usize,
}

impl Default for BongConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            encoding_length: DEFAULT_BOW_LENGTH,
            n: 2,
        }
    }
}

impl BongConfig {
    /// Creates a configuration for the given language and length.
    pub fn new(language: Language, encoding_length: usize) -> Self {
        Self {
            text: TextConfig::new(language),
            encoding_length,
            ..Default::default()
        }
    }

    /// Sets the n-gram size.
    pub fn with_n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        require_nonzero("encoding_length", self.encoding_length)?;
        require_nonzero("n", self.n)
    }
}

/// Paragraph-vector (PV-DM) encoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PvConfig {
    /// Preprocessing configuration.
    pub text: TextConfig,

    /// Embedding dimensionality.
    /// Default: 20.
    pub encoding_length: usize,

    /// Training passes over the corpus.
    /// Default: 15.
    pub epochs: usize,

    /// Tokens occurring fewer times than this are dropped from the vocabulary.
    /// Default: 2.
    pub min_count: usize,

    /// Maximum distance between the predicted word and its context words.
    /// Default: 8.
    pub window: usize,

    /// Negative samples drawn per prediction.
    /// Default: 5.
    pub negative: usize,

    /// Downsampling threshold for frequent words (0 disables).
    /// Default: 1e-3.
    pub sample: f64,

    /// Initial learning rate.
    /// Default: 0.025.
    pub learning_rate: f64,

    /// Learning rate reached at the end of training.
    /// Default: 1e-4.
    pub min_learning_rate: f64,

    /// Passes used when inferring vectors for new documents.
    /// Default: None (same as `epochs`).
    pub infer_epochs: Option<usize>,

    /// Random seed for shuffling, initialization and inference.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            encoding_length: DEFAULT_PV_LENGTH,
            epochs: 15,
            min_count: 2,
            window: 8,
            negative: 5,
            sample: 1e-3,
            learning_rate: 0.025,
            min_learning_rate: 1e-4,
            infer_epochs: None,
            seed: None,
        }
    }
}

impl PvConfig {
    /// Creates a configuration for the given language and length.
    pub fn new(language: Language, encoding_length: usize) -> Self {
        Self {
            text: TextConfig::new(language),
            encoding_length,
            ..Default::default()
        }
    }

    /// Sets the number of training epochs.
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the minimum token count.
    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the number of inference passes.
    #[inline]
    pub fn inference_epochs(&self) -> usize {
        self.infer_epochs.unwrap_or(self.epochs)
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        require_nonzero("encoding_length", self.encoding_length)?;
        require_nonzero("epochs", self.epochs)?;
        require_nonzero("window", self.window)?;
        if let Some(infer) = self.infer_epochs {
            require_nonzero("infer_epochs", infer)?;
        }
        require_positive("learning_rate", self.learning_rate)?;
        require_positive("min_learning_rate", self.min_learning_rate)?;
        if self.min_learning_rate > self.learning_rate {
            return Err(EncoderError::Config(format!(
                "min_learning_rate ({}) must not exceed learning_rate ({})",
                self.min_learning_rate, self.learning_rate
            )));
        }
        if !(self.sample >= 0.0 && self.sample.is_finite()) {
            return Err(EncoderError::Config(format!(
                "sample must be a non-negative number, got {}",
                self.sample
            )));
        }
        Ok(())
    }
}

/// Topic-distribution (LDA) encoder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {
    /// Preprocessing configuration.
    pub text: TextConfig,

    /// Number of topics, which is also the vector length.
    /// Default: 20.
    pub encoding_length: usize,

    /// Passes of variational EM over the corpus.
    /// Default: 1.
    pub passes: usize,

    /// Maximum E-step iterations per document.
    /// Default: 50.
    pub iterations: usize,

    /// Mean absolute change in a document's gamma below which its E-step stops.
    /// Default: 1e-3.
    pub gamma_threshold: f64,

    /// Random seed for the topic-word initialization.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            text: TextConfig::default(),
            encoding_length: DEFAULT_LDA_TOPICS,
            passes: 1,
            iterations: 50,
            gamma_threshold: 1e-3,
            seed: None,
        }
    }
}

impl LdaConfig {
    /// Creates a configuration for the given language and topic count.
    pub fn new(language: Language, num_topics: usize) -> Self {
        Self {
            text: TextConfig::new(language),
            encoding_length: num_topics,
            ..Default::default()
        }
    }

    /// Sets the number of passes.
    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of topics.
    #[inline]
    pub fn num_topics(&self) -> usize {
        self.encoding_length
    }

    /// Validates the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        require_nonzero("encoding_length (topics)", self.encoding_length)?;
        require_nonzero("passes", self.passes)?;
        require_nonzero("iterations", self.iterations)?;
        require_positive("gamma_threshold", self.gamma_threshold)
    }
}

/// Configuration of any encoder variant, tagged by `"variant"` in JSON.
///
/// ```
/// use vectext::EncoderConfig;
///
/// let config = EncoderConfig::from_json_str(r#"{"variant": "bong", "n": 3}"#).unwrap();
/// assert_eq!(config.kind().name(), "BoNG");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "lowercase")]
pub enum EncoderConfig {
    /// Bag-of-words.
    Bow(BowConfig),
    /// Bag-of-n-grams.
    Bong(BongConfig),
    /// Paragraph vectors.
    Pv(PvConfig),
    /// Latent Dirichlet allocation.
    Lda(LdaConfig),
}

impl EncoderConfig {
    /// Parses a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the encoder variant this configuration builds.
    pub fn kind(&self) -> EncoderKind {
        match self {
            EncoderConfig::Bow(_) => EncoderKind::Bow,
            EncoderConfig::Bong(_) => EncoderKind::Bong,
            EncoderConfig::Pv(_) => EncoderKind::Pv,
            EncoderConfig::Lda(_) => EncoderKind::Lda,
        }
    }

    /// Returns the shared text configuration.
    pub fn text(&self) -> &TextConfig {
        match self {
            EncoderConfig::Bow(c) => &c.text,
            EncoderConfig::Bong(c) => &c.text,
            EncoderConfig::Pv(c) => &c.text,
            EncoderConfig::Lda(c) => &c.text,
        }
    }

    /// Validates the wrapped configuration.
    pub fn validate(&self) -> Result<()> {
        match self {
            EncoderConfig::Bow(c) => c.validate(),
            EncoderConfig::Bong(c) => c.validate(),
            EncoderConfig::Pv(c) => c.validate(),
            EncoderConfig::Lda(c) => c.validate(),
        }
    }

    /// Builds an unfitted encoder.
    pub fn build(self) -> Result<Box<dyn TextEncoder>> {
        Ok(match self {
            EncoderConfig::Bow(c) => Box::new(BowEncoder::new(c)?),
            EncoderConfig::Bong(c) => Box::new(BongEncoder::new(c)?),
            EncoderConfig::Pv(c) => Box::new(PvEncoder::new(c)?),
            EncoderConfig::Lda(c) => Box::new(LdaEncoder::new(c)?),
        })
    }
}

fn require_nonzero(param: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(EncoderError::Config(format!("{param} must be greater than zero")));
    }
    Ok(())
}

fn require_positive(param: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(EncoderError::Config(format!(
            "{param} must be a positive number, got {value}"
        )));
    }
    Ok(())
}
