//! # vectext - Text Encoders
//!
//! vectext turns free text into fixed-width numeric vectors for downstream
//! machine learning.
//!
//! ## Overview
//!
//! Four encoders share one interface, [`TextEncoder`]: construct from a
//! configuration, `fit` once on training documents, then `transform` any
//! number of documents into an `(n_docs, encoding_length)` matrix.
//!
//! ## Key Features
//!
//! - **BoW**: TF-IDF over words, capped to `encoding_length` terms
//! - **BoNG**: TF-IDF over contiguous word n-grams
//! - **PV**: paragraph vectors (PV-DM) with negative sampling
//! - **LDA**: topic distributions from variational Bayes LDA
//! - **Shared preprocessing**: stop words (keeping "not" and "no"),
//!   lemmatization for English and Snowball stemming for other languages
//! - **Binary persistence** of fitted encoders
//!
//! ## Quick Start
//!
//! ```rust
//! use vectext::{BowConfig, BowEncoder, Language, TextEncoder};
//!
//! let docs = ["The cat sat on the mat", "Dogs do not like cats"];
//! let mut encoder = BowEncoder::new(BowConfig::new(Language::English, 16))?;
//! let matrix = encoder.fit_transform(&docs)?;
//! assert_eq!(matrix.shape(), &[2, 16]);
//! # Ok::<(), vectext::EncoderError>(())
//! ```
//!
//! Encoders can also be described in JSON and built behind the trait:
//!
//! ```rust
//! use vectext::EncoderConfig;
//!
//! let config = EncoderConfig::from_json_str(r#"{"variant": "lda", "encoding_length": 4, "seed": 7}"#)?;
//! let mut encoder = config.build()?;
//! encoder.fit(&["rates rise as banks lend", "the striker scored a goal"])?;
//! assert_eq!(encoder.name(), "LDA");
//! # Ok::<(), vectext::EncoderError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`text`] - Languages, resources, tokenization and preprocessing
//! - [`vectorize`] - TF-IDF weighting
//! - [`embedding`] - Paragraph vectors
//! - [`topic`] - Dictionary and LDA
//! - [`encoder`] - The encoders and the [`TextEncoder`] trait
//! - [`storage`] - Binary format and persistence
//! - [`config`] - Serde-backed configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod embedding;
pub mod encoder;
pub mod error;
pub mod storage;
pub mod text;
pub mod topic;
pub mod vectorize;

// Re-export commonly used types
pub use config::{BongConfig, BowConfig, EncoderConfig, LdaConfig, PvConfig, TextConfig};
pub use encoder::{
    BongEncoder, BowEncoder, EncoderKind, EncoderSnapshot, LdaEncoder, PvEncoder, TextEncoder,
};
pub use error::{EncoderError, Result};
pub use storage::{load_encoder, EncoderFile};
pub use text::{Language, Preprocessed, Preprocessor};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
