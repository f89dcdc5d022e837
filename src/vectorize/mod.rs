//! Sparse term-weighting vectorizers.

mod tfidf;

pub use tfidf::TfidfVectorizer;
