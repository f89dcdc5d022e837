//! The text encoders and their common interface.
//!
//! Every encoder follows the same lifecycle: build it from its configuration,
//! `fit` it once on training documents, then `transform` any number of
//! document batches into an `(n_docs, encoding_length)` matrix.

mod bong;
mod bow;
mod lda;
mod pv;

pub use bong::BongEncoder;
pub use bow::BowEncoder;
pub use lda::{FittedLda, LdaEncoder};
pub use pv::PvEncoder;

use crate::config::{BongConfig, BowConfig, LdaConfig, PvConfig};
use crate::embedding::ParagraphVectors;
use crate::error::{EncoderError, Result};
use crate::storage::EncoderFile;
use crate::vectorize::TfidfVectorizer;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The encoder variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncoderKind {
    /// TF-IDF over unigrams.
    Bow,
    /// TF-IDF over word n-grams.
    Bong,
    /// Paragraph vectors.
    Pv,
    /// LDA topic distributions.
    Lda,
}

impl EncoderKind {
    /// All variants.
    pub const ALL: [EncoderKind; 4] = [
        EncoderKind::Bow,
        EncoderKind::Bong,
        EncoderKind::Pv,
        EncoderKind::Lda,
    ];

    /// Display name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            EncoderKind::Bow => "BoW",
            EncoderKind::Bong => "BoNG",
            EncoderKind::Pv => "PV",
            EncoderKind::Lda => "LDA",
        }
    }

    /// Tag stored in encoder file headers.
    pub fn to_byte(self) -> u8 {
        match self {
            EncoderKind::Bow => 1,
            EncoderKind::Bong => 2,
            EncoderKind::Pv => 3,
            EncoderKind::Lda => 4,
        }
    }

    /// Parses a header tag.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_byte() == byte)
    }
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncoderKind {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EncoderError::Config(format!("unknown encoder variant: {s}")))
    }
}

/// Common interface of all encoders.
///
/// The trait is object safe; [`crate::EncoderConfig::build`] and
/// [`crate::storage::load_encoder`] hand out `Box<dyn TextEncoder>`.
pub trait TextEncoder: Send + fmt::Debug {
    /// Variant of this encoder.
    fn kind(&self) -> EncoderKind;

    /// Display name ("BoW", "BoNG", "PV" or "LDA").
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Width of every encoded row.
    fn encoding_length(&self) -> usize;

    /// Returns true once `fit` has succeeded.
    fn is_fitted(&self) -> bool;

    /// Learns the encoder state from training documents.
    ///
    /// A failed fit leaves the previous state untouched. Returns the encoder
    /// so calls can be chained.
    fn fit(&mut self, docs: &[&str]) -> Result<&mut dyn TextEncoder>;

    /// Encodes documents into a `(docs.len(), encoding_length)` matrix.
    fn transform(&self, docs: &[&str]) -> Result<Array2<f64>>;

    /// Fits on `docs`, then encodes them.
    fn fit_transform(&mut self, docs: &[&str]) -> Result<Array2<f64>> {
        self.fit(docs)?;
        self.transform(docs)
    }

    /// Captures configuration and fitted state for persistence.
    fn snapshot(&self) -> EncoderSnapshot;

    /// Writes the encoder to an encoder file.
    fn save(&self, path: &Path) -> Result<()> {
        EncoderFile::write(path, &self.snapshot())
    }
}

/// Serializable configuration and state of an encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncoderSnapshot {
    /// Bag-of-words encoder.
    Bow {
        /// Configuration.
        config: BowConfig,
        /// Fitted vectorizer.
        vectorizer: Option<TfidfVectorizer>,
    },
    /// Bag-of-n-grams encoder.
    Bong {
        /// Configuration.
        config: BongConfig,
        /// Fitted vectorizer.
        vectorizer: Option<TfidfVectorizer>,
    },
    /// Paragraph-vector encoder.
    Pv {
        /// Configuration.
        config: PvConfig,
        /// Trained model.
        model: Option<ParagraphVectors>,
    },
    /// Topic-distribution encoder.
    Lda {
        /// Configuration.
        config: LdaConfig,
        /// Dictionary and trained model.
        fitted: Option<FittedLda>,
    },
}

impl EncoderSnapshot {
    /// Variant captured in this snapshot.
    pub fn kind(&self) -> EncoderKind {
        match self {
            EncoderSnapshot::Bow { .. } => EncoderKind::Bow,
            EncoderSnapshot::Bong { .. } => EncoderKind::Bong,
            EncoderSnapshot::Pv { .. } => EncoderKind::Pv,
            EncoderSnapshot::Lda { .. } => EncoderKind::Lda,
        }
    }

    /// Returns true if the snapshot carries fitted state.
    pub fn is_fitted(&self) -> bool {
        match self {
            EncoderSnapshot::Bow { vectorizer, .. } | EncoderSnapshot::Bong { vectorizer, .. } => {
                vectorizer.is_some()
            }
            EncoderSnapshot::Pv { model, .. } => model.is_some(),
            EncoderSnapshot::Lda { fitted, .. } => fitted.is_some(),
        }
    }

    /// Rebuilds the encoder, provisioning its language resources.
    pub fn into_encoder(self) -> Result<Box<dyn TextEncoder>> {
        Ok(match self {
            EncoderSnapshot::Bow { config, vectorizer } => {
                Box::new(BowEncoder::from_parts(config, vectorizer)?)
            }
            EncoderSnapshot::Bong { config, vectorizer } => {
                Box::new(BongEncoder::from_parts(config, vectorizer)?)
            }
            EncoderSnapshot::Pv { config, model } => Box::new(PvEncoder::from_parts(config, model)?),
            EncoderSnapshot::Lda { config, fitted } => {
                Box::new(LdaEncoder::from_parts(config, fitted)?)
            }
        })
    }
}

/// Fails with `EmptyInput` when there is nothing to fit on.
pub(crate) fn require_documents(kind: EncoderKind, docs: &[&str]) -> Result<()> {
    if docs.is_empty() {
        return Err(EncoderError::EmptyInput(format!(
            "{} encoder needs at least one training document",
            kind.name()
        )));
    }
    Ok(())
}

/// Error for a snapshot of the wrong variant.
pub(crate) fn kind_mismatch(expected: EncoderKind, found: EncoderKind) -> EncoderError {
    EncoderError::InvalidModelFormat(format!(
        "expected a {expected} encoder, found {found}"
    ))
}
