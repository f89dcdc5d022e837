//! Text processing: languages, linguistic resources, tokenization and the
//! preprocessing pipeline shared by every encoder.

mod language;
mod lemmatizer;
mod normalizer;
mod preprocess;
pub mod resources;
mod stopwords;
mod tokenizer;

pub use language::Language;
pub use lemmatizer::Lemmatizer;
pub use normalizer::Normalizer;
pub use preprocess::{Preprocessed, Preprocessor};
pub use resources::{is_provisioned, provision, provision_all};
pub use stopwords::{StopWords, NEGATION_MARKERS};
pub use tokenizer::{Token, Tokenizer};
