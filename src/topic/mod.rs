//! Topic modeling: a token dictionary and Latent Dirichlet Allocation.

mod dictionary;
mod lda;

pub use dictionary::{BagOfWords, Dictionary};
pub use lda::{digamma, LdaModel, LdaSettings};
