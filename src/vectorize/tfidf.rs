//! TF-IDF weighting over word n-grams.

use crate::error::{EncoderError, Result};
use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Words of two or more word characters.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// TF-IDF vectorizer with a capped, alphabetically ordered vocabulary.
///
/// Weights are raw term counts times the smoothed inverse document frequency
/// `ln((1 + n) / (1 + df)) + 1`, and every row is scaled to unit L2 norm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    ngram: usize,
    max_features: Option<usize>,
    /// Term to column index.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Creates an unfitted vectorizer over n-grams of exactly `ngram` words.
    pub fn new(ngram: usize) -> Self {
        Self {
            ngram: ngram.max(1),
            max_features: None,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
        }
    }

    /// Keeps only the `max_features` most frequent terms.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// N-gram size.
    pub fn ngram(&self) -> usize {
        self.ngram
    }

    /// Number of learned terms.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Learned terms in column order.
    pub fn terms(&self) -> Vec<&str> {
        self.vocabulary.keys().map(String::as_str).collect()
    }

    /// Column of a term, if it was learned.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Inverse document frequency per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Learns vocabulary and idf weights from joined documents.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let n_docs = documents.len();
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let terms = self.analyze(doc.as_ref());
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *term_freq.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        if term_freq.is_empty() {
            return Err(EncoderError::Training(
                "empty vocabulary; perhaps the documents only contain stop words".to_string(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max_features) = self.max_features {
            ranked.truncate(max_features);
        }

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.vocabulary = kept.into_iter().enumerate().map(|(i, t)| (t, i)).collect();

        Ok(())
    }

    /// Projects joined documents onto the learned vocabulary.
    ///
    /// Returns a `(documents, vocabulary_size)` matrix with L2-normalized rows.
    /// Unknown terms are ignored; a document with no known terms is all zeros.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((documents.len(), self.vocabulary.len()));

        for (row, doc) in documents.iter().enumerate() {
            for term in self.analyze(doc.as_ref()) {
                if let Some(&col) = self.vocabulary.get(&term) {
                    matrix[[row, col]] += 1.0;
                }
            }

            let mut values = matrix.row_mut(row);
            values.zip_mut_with(&ndarray::aview1(&self.idf), |v, idf| *v *= idf);
            let norm = values.dot(&values).sqrt();
            if norm > 0.0 {
                values.mapv_inplace(|v| v / norm);
            }
        }

        matrix
    }

    /// Splits text into the n-gram terms counted by this vectorizer.
    fn analyze(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
        if self.ngram == 1 {
            return words.into_iter().map(str::to_string).collect();
        }
        words.windows(self.ngram).map(|w| w.join(" ")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_vocabulary_is_alphabetical() {
        let mut v = TfidfVectorizer::new(1);
        v.fit(&["pear apple", "fig apple"]).unwrap();
        assert_eq!(v.terms(), vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let mut v = TfidfVectorizer::new(1);
        v.fit(&["a b cd"]).unwrap();
        assert_eq!(v.terms(), vec!["cd"]);
    }

    #[test]
    fn test_max_features_by_frequency() {
        let mut v = TfidfVectorizer::new(1).with_max_features(2);
        v.fit(&["zeta zeta alpha", "zeta beta beta gamma"]).unwrap();
        // zeta=3, beta=2, alpha=1, gamma=1
        assert_eq!(v.terms(), vec!["beta", "zeta"]);
    }

    #[test]
    fn test_max_features_ties_break_alphabetically() {
        let mut v = TfidfVectorizer::new(1).with_max_features(2);
        v.fit(&["delta charlie bravo alpha"]).unwrap();
        assert_eq!(v.terms(), vec!["alpha", "bravo"]);
    }

    #[test]
    fn test_smooth_idf() {
        let mut v = TfidfVectorizer::new(1);
        v.fit(&["apple banana", "apple"]).unwrap();
        let apple = v.term_index("apple").unwrap();
        let banana = v.term_index("banana").unwrap();
        assert!(approx(v.idf()[apple], 1.0));
        assert!(approx(v.idf()[banana], (3.0f64 / 2.0).ln() + 1.0));
    }

    #[test]
    fn test_rows_are_unit_norm() {
        let mut v = TfidfVectorizer::new(1);
        let docs = ["apple banana apple", "banana cherry", "cherry"];
        v.fit(&docs).unwrap();
        let m = v.transform(&docs);
        for row in m.rows() {
            assert!(approx(row.dot(&row).sqrt(), 1.0));
        }
    }

    #[test]
    fn test_counts_scaled_by_idf() {
        let mut v = TfidfVectorizer::new(1);
        v.fit(&["apple banana", "banana"]).unwrap();
        let m = v.transform(&["apple apple banana"]);

        let apple = 2.0 * ((3.0f64 / 2.0).ln() + 1.0);
        let banana = 1.0;
        let norm = (apple * apple + banana * banana).sqrt();
        assert!(approx(m[[0, 0]], apple / norm));
        assert!(approx(m[[0, 1]], banana / norm));
    }

    #[test]
    fn test_unknown_terms_give_zero_row() {
        let mut v = TfidfVectorizer::new(1);
        v.fit(&["apple banana"]).unwrap();
        let m = v.transform(&["durian"]);
        assert_eq!(m.shape(), &[1, 2]);
        assert!(m.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_bigrams() {
        let mut v = TfidfVectorizer::new(2);
        v.fit(&["not like running", "like running fast"]).unwrap();
        assert_eq!(v.terms(), vec!["like running", "not like", "running fast"]);
    }

    #[test]
    fn test_empty_vocabulary() {
        let mut v = TfidfVectorizer::new(1);
        let err = v.fit(&["", "x"]).unwrap_err();
        assert!(matches!(err, EncoderError::Training(_)));

        let mut bigrams = TfidfVectorizer::new(2);
        assert!(bigrams.fit(&["single"]).is_err());
    }
}
