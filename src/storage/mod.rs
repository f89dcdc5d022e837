//! Persistence of encoders in a compact binary format.

mod format;

pub use format::{EncoderFile, EncoderHeader, HEADER_SIZE};

use crate::encoder::TextEncoder;
use crate::error::Result;
use std::path::Path;

/// Loads any encoder file, returning the encoder behind the trait.
///
/// The stored language's resources are provisioned as part of loading.
pub fn load_encoder<P: AsRef<Path>>(path: P) -> Result<Box<dyn TextEncoder>> {
    EncoderFile::read(path)?.into_encoder()
}
