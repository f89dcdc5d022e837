//! Dense document embeddings.

mod paragraph;

pub use paragraph::{ParagraphSettings, ParagraphVectors, TaggedDocument};
