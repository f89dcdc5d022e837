//! Paragraph vectors (PV-DM) trained with negative sampling.
//!
//! Each training document owns a vector that is averaged with the vectors of
//! the surrounding words to predict a center word. Prediction uses negative
//! sampling against a unigram table raised to the 3/4 power, and frequent
//! words are randomly downsampled. At inference time only a fresh document
//! vector is trained; word and output weights stay frozen.

use crate::error::{EncoderError, Result};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resolution of the negative-sampling table.
const CUM_TABLE_DOMAIN: f64 = 2_147_483_647.0;

/// Exponent applied to word counts in the negative-sampling table.
const NS_EXPONENT: f64 = 0.75;

/// Dot products beyond this magnitude are saturated and skipped.
const MAX_EXP: f32 = 6.0;

/// A document with its integer tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedDocument {
    /// Cleaned tokens.
    pub words: Vec<String>,
    /// Tag, the row of the document in the training set.
    pub tag: usize,
}

impl TaggedDocument {
    /// Creates a tagged document.
    pub fn new(words: Vec<String>, tag: usize) -> Self {
        Self { words, tag }
    }

    /// Tags each document with its position.
    pub fn from_token_lists(docs: Vec<Vec<String>>) -> Vec<Self> {
        docs.into_iter()
            .enumerate()
            .map(|(tag, words)| Self::new(words, tag))
            .collect()
    }
}

/// Hyperparameters for [`ParagraphVectors`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphSettings {
    /// Dimension of word and document vectors.
    pub vector_size: usize,
    /// Maximum distance between the center word and a context word.
    pub window: usize,
    /// Words rarer than this are discarded.
    pub min_count: usize,
    /// Noise words drawn per positive example.
    pub negative: usize,
    /// Downsampling threshold for frequent words.
    pub sample: f64,
    /// Initial learning rate.
    pub alpha: f32,
    /// Final learning rate.
    pub min_alpha: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VocabEntry {
    word: String,
    count: usize,
    /// Probability of keeping an occurrence during training.
    keep: f32,
}

/// Trained paragraph-vector model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphVectors {
    settings: ParagraphSettings,
    vocab: Vec<VocabEntry>,
    index: HashMap<String, usize>,
    cum_table: Vec<u32>,
    word_vectors: Array2<f32>,
    output_weights: Array2<f32>,
    doc_vectors: Array2<f32>,
}

impl ParagraphVectors {
    /// Creates an empty model.
    pub fn new(settings: ParagraphSettings) -> Self {
        let dim = settings.vector_size;
        Self {
            settings,
            vocab: Vec::new(),
            index: HashMap::new(),
            cum_table: Vec::new(),
            word_vectors: Array2::zeros((0, dim)),
            output_weights: Array2::zeros((0, dim)),
            doc_vectors: Array2::zeros((0, dim)),
        }
    }

    /// Hyperparameters of this model.
    pub fn settings(&self) -> &ParagraphSettings {
        &self.settings
    }

    /// Number of retained words.
    pub fn vocabulary_size(&self) -> usize {
        self.vocab.len()
    }

    /// Dimension of the vectors.
    pub fn vector_size(&self) -> usize {
        self.settings.vector_size
    }

    /// Number of trained document vectors.
    pub fn document_count(&self) -> usize {
        self.doc_vectors.nrows()
    }

    /// Returns true if `word` survived the `min_count` cut.
    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Vector of a training document.
    pub fn document_vector(&self, tag: usize) -> Option<ArrayView1<'_, f32>> {
        (tag < self.doc_vectors.nrows()).then(|| self.doc_vectors.row(tag))
    }

    /// Vector of a vocabulary word.
    pub fn word_vector(&self, word: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(word).map(|&i| self.word_vectors.row(i))
    }

    /// Counts words and builds the vocabulary, sampling and noise tables.
    ///
    /// The vocabulary is ordered by descending count, ties by word.
    pub fn build_vocab(&mut self, docs: &[TaggedDocument]) -> Result<()> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            for word in &doc.words {
                *counts.entry(word.as_str()).or_insert(0) += 1;
            }
        }

        let mut retained: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|&(_, count)| count >= self.settings.min_count)
            .collect();
        if retained.is_empty() {
            return Err(EncoderError::Training(format!(
                "empty vocabulary: no word occurs at least {} times",
                self.settings.min_count
            )));
        }
        retained.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let total: usize = retained.iter().map(|&(_, c)| c).sum();
        let threshold = if self.settings.sample > 0.0 {
            self.settings.sample * total as f64
        } else {
            f64::INFINITY
        };

        self.vocab = retained
            .iter()
            .map(|&(word, count)| {
                let c = count as f64;
                let keep = ((c / threshold).sqrt() + 1.0) * (threshold / c);
                VocabEntry {
                    word: word.to_string(),
                    count,
                    keep: keep.min(1.0) as f32,
                }
            })
            .collect();
        self.index = self
            .vocab
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.word.clone(), i))
            .collect();
        self.cum_table = self.build_cum_table();

        info!(
            "Built vocabulary: {} words ({} occurrences) from {} documents",
            self.vocab.len(),
            total,
            docs.len()
        );
        Ok(())
    }

    fn build_cum_table(&self) -> Vec<u32> {
        let powered: Vec<f64> = self
            .vocab
            .iter()
            .map(|entry| (entry.count as f64).powf(NS_EXPONENT))
            .collect();
        let norm: f64 = powered.iter().sum();

        let mut running = 0.0;
        powered
            .iter()
            .map(|p| {
                running += p;
                (running / norm * CUM_TABLE_DOMAIN).round() as u32
            })
            .collect()
    }

    /// Trains word, output and document weights for `epochs` passes.
    ///
    /// Weights are reinitialized from `rng`, and the example order is shuffled
    /// once. The learning rate decays linearly over all passes.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        docs: &[TaggedDocument],
        epochs: usize,
        rng: &mut R,
    ) -> Result<()> {
        if self.vocab.is_empty() {
            return Err(EncoderError::Training(
                "cannot train before building a non-empty vocabulary".to_string(),
            ));
        }

        let dim = self.settings.vector_size;
        let n_docs = docs.iter().map(|d| d.tag + 1).max().unwrap_or(0);
        self.word_vectors = random_vectors(self.vocab.len(), dim, rng);
        self.output_weights = Array2::zeros((self.vocab.len(), dim));
        self.doc_vectors = random_vectors(n_docs, dim, rng);

        let encoded: Vec<(usize, Vec<usize>)> = docs
            .iter()
            .map(|d| (d.tag, self.lookup(&d.words)))
            .collect();
        let mut order: Vec<usize> = (0..encoded.len()).collect();
        order.shuffle(rng);

        let words_per_epoch: usize = encoded.iter().map(|(_, w)| w.len()).sum::<usize>().max(1);
        let total_words = (words_per_epoch * epochs) as f32;
        let (start, end) = (self.settings.alpha, self.settings.min_alpha);
        let mut processed = 0usize;

        for epoch in 0..epochs {
            let epoch_alpha = start - (start - end) * (processed as f32 / total_words);
            for &i in &order {
                let (tag, words) = (encoded[i].0, &encoded[i].1);
                let alpha = start - (start - end) * (processed as f32 / total_words);
                let mut doc_vector = self.doc_vectors.row(tag).to_owned();
                self.train_document(words, &mut doc_vector, alpha.max(end), rng);
                self.doc_vectors.row_mut(tag).assign(&doc_vector);
                processed += words.len();
            }
            debug!("PV epoch {}/{} done (alpha {:.5})", epoch + 1, epochs, epoch_alpha);
        }

        info!(
            "Trained paragraph vectors: {} documents, {} words, {} epochs",
            n_docs,
            self.vocab.len(),
            epochs
        );
        Ok(())
    }

    /// Infers a vector for unseen tokens, leaving the model untouched.
    ///
    /// Unknown tokens are ignored. Without known tokens the returned vector is
    /// the random initialization.
    pub fn infer_vector<R: Rng + ?Sized>(
        &self,
        words: &[String],
        epochs: usize,
        rng: &mut R,
    ) -> Array1<f32> {
        let dim = self.settings.vector_size;
        let mut doc_vector = random_vectors(1, dim, rng).row(0).to_owned();
        let indices = self.lookup(words);
        if indices.is_empty() || epochs == 0 {
            return doc_vector;
        }

        let (start, end) = (self.settings.alpha, self.settings.min_alpha);
        let step = (start - end) / (epochs.max(2) - 1) as f32;
        let mut alpha = start;
        for _ in 0..epochs {
            self.infer_document(&indices, &mut doc_vector, alpha, rng);
            alpha = (alpha - step).max(end);
        }
        doc_vector
    }

    fn lookup(&self, words: &[String]) -> Vec<usize> {
        words.iter().filter_map(|w| self.index.get(w).copied()).collect()
    }

    /// Applies downsampling to one pass over a document.
    fn sample_words<R: Rng + ?Sized>(&self, words: &[usize], rng: &mut R) -> Vec<usize> {
        words
            .iter()
            .copied()
            .filter(|&w| {
                let keep = self.vocab[w].keep;
                keep >= 1.0 || rng.gen::<f32>() < keep
            })
            .collect()
    }

    /// Averages the document vector with a reduced window of context words.
    fn context<R: Rng + ?Sized>(
        &self,
        words: &[usize],
        pos: usize,
        doc_vector: &Array1<f32>,
        rng: &mut R,
    ) -> (Array1<f32>, Vec<usize>) {
        let window = self.settings.window.max(1);
        let reduced = rng.gen_range(0..window);
        let lo = (pos + reduced).saturating_sub(window);
        let hi = (pos + window + 1 - reduced).min(words.len());

        let context: Vec<usize> = (lo..hi).filter(|&j| j != pos).map(|j| words[j]).collect();
        let mut l1 = doc_vector.clone();
        for &w in &context {
            l1 += &self.word_vectors.row(w);
        }
        l1 /= (context.len() + 1) as f32;
        (l1, context)
    }

    fn train_document<R: Rng + ?Sized>(
        &mut self,
        words: &[usize],
        doc_vector: &mut Array1<f32>,
        alpha: f32,
        rng: &mut R,
    ) {
        let words = self.sample_words(words, rng);
        for pos in 0..words.len() {
            let (l1, context) = self.context(&words, pos, doc_vector, rng);
            let neu1e = self.negative_sampling(words[pos], &l1, alpha, rng);
            *doc_vector += &neu1e;
            for &w in &context {
                self.word_vectors.row_mut(w).scaled_add(1.0, &neu1e);
            }
        }
    }

    fn infer_document<R: Rng + ?Sized>(
        &self,
        words: &[usize],
        doc_vector: &mut Array1<f32>,
        alpha: f32,
        rng: &mut R,
    ) {
        let words = self.sample_words(words, rng);
        for pos in 0..words.len() {
            let (l1, _) = self.context(&words, pos, doc_vector, rng);
            let neu1e = self.error_gradient(words[pos], &l1, alpha, rng);
            *doc_vector += &neu1e;
        }
    }

    /// One positive and `negative` noise updates of the output weights.
    ///
    /// Returns the error to propagate back to the inputs.
    fn negative_sampling<R: Rng + ?Sized>(
        &mut self,
        target: usize,
        l1: &Array1<f32>,
        alpha: f32,
        rng: &mut R,
    ) -> Array1<f32> {
        let mut neu1e = Array1::zeros(l1.len());
        for (word, label) in self.draw_examples(target, rng) {
            let f = l1.dot(&self.output_weights.row(word));
            if f.abs() >= MAX_EXP {
                continue;
            }
            let g = (label - sigmoid(f)) * alpha;
            neu1e.scaled_add(g, &self.output_weights.row(word));
            self.output_weights.row_mut(word).scaled_add(g, l1);
        }
        neu1e
    }

    fn error_gradient<R: Rng + ?Sized>(
        &self,
        target: usize,
        l1: &Array1<f32>,
        alpha: f32,
        rng: &mut R,
    ) -> Array1<f32> {
        let mut neu1e = Array1::zeros(l1.len());
        for (word, label) in self.draw_examples(target, rng) {
            let f = l1.dot(&self.output_weights.row(word));
            if f.abs() >= MAX_EXP {
                continue;
            }
            let g = (label - sigmoid(f)) * alpha;
            neu1e.scaled_add(g, &self.output_weights.row(word));
        }
        neu1e
    }

    /// The target with label 1, then noise words with label 0.
    fn draw_examples<R: Rng + ?Sized>(&self, target: usize, rng: &mut R) -> Vec<(usize, f32)> {
        let mut examples = Vec::with_capacity(self.settings.negative + 1);
        examples.push((target, 1.0));
        let top = self.cum_table.last().copied().unwrap_or(0);
        if top == 0 {
            return examples;
        }
        for _ in 0..self.settings.negative {
            let r = rng.gen_range(0..top);
            let word = self.cum_table.partition_point(|&c| c <= r);
            if word != target && word < self.vocab.len() {
                examples.push((word, 0.0));
            }
        }
        examples
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Rows drawn uniformly from `[-0.5, 0.5) / dim`.
fn random_vectors<R: Rng + ?Sized>(rows: usize, dim: usize, rng: &mut R) -> Array2<f32> {
    let scale = 1.0 / dim.max(1) as f32;
    Array2::from_shape_fn((rows, dim), |_| (rng.gen::<f32>() - 0.5) * scale)
}
