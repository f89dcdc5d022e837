//! Token to integer id mapping.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Sparse document: `(token id, count)` pairs sorted by id.
pub type BagOfWords = Vec<(usize, usize)>;

/// Maps tokens to dense ids and tracks document frequencies.
///
/// Ids are handed out in order of first appearance. Tokens first seen in the
/// same document receive consecutive ids in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    token2id: HashMap<String, usize>,
    id2token: Vec<String>,
    dfs: Vec<usize>,
    num_docs: usize,
    num_pos: usize,
}

impl Dictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from tokenized documents.
    pub fn from_documents<S: AsRef<str>>(docs: &[Vec<S>]) -> Self {
        let mut dictionary = Self::new();
        for doc in docs {
            dictionary.add_document(doc);
        }
        dictionary
    }

    /// Adds a document, assigning ids to unseen tokens.
    pub fn add_document<S: AsRef<str>>(&mut self, doc: &[S]) -> BagOfWords {
        let counts = count_tokens(doc);

        for token in counts.keys() {
            if !self.token2id.contains_key(*token) {
                self.token2id.insert(token.to_string(), self.id2token.len());
                self.id2token.push(token.to_string());
                self.dfs.push(0);
            }
        }

        let bow = self.known(&counts);
        for &(id, count) in &bow {
            self.dfs[id] += 1;
            self.num_pos += count;
        }
        self.num_docs += 1;
        bow
    }

    /// Converts a document to bag-of-words, ignoring unknown tokens.
    pub fn doc2bow<S: AsRef<str>>(&self, doc: &[S]) -> BagOfWords {
        self.known(&count_tokens(doc))
    }

    fn known(&self, counts: &BTreeMap<&str, usize>) -> BagOfWords {
        let mut bow: BagOfWords = counts
            .iter()
            .filter_map(|(token, &count)| self.token2id.get(*token).map(|&id| (id, count)))
            .collect();
        bow.sort_unstable();
        bow
    }

    /// Id of a token.
    pub fn token_id(&self, token: &str) -> Option<usize> {
        self.token2id.get(token).copied()
    }

    /// Token for an id.
    pub fn token(&self, id: usize) -> Option<&str> {
        self.id2token.get(id).map(String::as_str)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    /// Returns true if no token has been added.
    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    /// Number of documents processed.
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Total number of token occurrences processed.
    pub fn num_pos(&self) -> usize {
        self.num_pos
    }

    /// Number of documents containing the token with `id`.
    pub fn document_frequency(&self, id: usize) -> usize {
        self.dfs.get(id).copied().unwrap_or(0)
    }
}

/// Token counts keyed in lexicographic order.
fn count_tokens<S: AsRef<str>>(doc: &[S]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for token in doc {
        *counts.entry(token.as_ref()).or_insert(0) += 1;
    }
    counts
}
