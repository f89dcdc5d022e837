//! Error types for the text encoders.

use thiserror::Error;

/// The main error type for encoder operations.
#[derive(Error, Debug)]
pub enum EncoderError {
    /// Invalid configuration (unsupported language, bad hyperparameter).
    #[error("Configuration error: {0}")]
    Config(String),

    /// `transform` was called before `fit`.
    #[error("{encoder} encoder is not fitted; call fit() first")]
    NotFitted {
        /// Name of the encoder variant.
        encoder: &'static str,
    },

    /// Linguistic resources (stop-word lists) could not be provisioned.
    #[error("Resource provisioning error: {0}")]
    ResourceProvisioning(String),

    /// Empty input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A vectorizer or model could not be trained on the given corpus.
    #[error("Training error: {0}")]
    Training(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid encoder file.
    #[error("Invalid model format: {0}")]
    InvalidModelFormat(String),
}

/// Result type alias for encoder operations.
pub type Result<T> = std::result::Result<T, EncoderError>;

impl From<bincode::Error> for EncoderError {
    fn from(err: bincode::Error) -> Self {
        EncoderError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for EncoderError {
    fn from(err: serde_json::Error) -> Self {
        EncoderError::Serialization(err.to_string())
    }
}
