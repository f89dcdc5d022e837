//! Latent Dirichlet Allocation trained with batch variational Bayes.
//!
//! The topic-word variational parameter `lambda` starts from a
//! Gamma(100, 1/100) draw. Each pass runs a per-document E-step that iterates
//! the topic weights `gamma` to convergence and accumulates sufficient
//! statistics, then an M-step blends `eta + sstats` into `lambda`.

use crate::error::{EncoderError, Result};
use crate::topic::BagOfWords;
use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand_distr::{Distribution, Gamma};
use serde::{Deserialize, Serialize};

/// Shape and scale of the initialization Gamma distribution.
const GAMMA_SHAPE: f64 = 100.0;
const GAMMA_SCALE: f64 = 1.0 / 100.0;

/// Learning-rate schedule `(offset + t)^-decay` for later passes.
const OFFSET: f64 = 1.0;
const DECAY: f64 = 0.5;

/// Guards divisions by the per-token normalizer.
const PHI_EPSILON: f64 = 1e-100;

/// Training parameters for [`LdaModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaSettings {
    /// Number of topics.
    pub num_topics: usize,
    /// Passes over the corpus.
    pub passes: usize,
    /// Maximum E-step iterations per document.
    pub iterations: usize,
    /// E-step stops once the mean absolute change in gamma falls below this.
    pub gamma_threshold: f64,
}

/// Fitted LDA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaModel {
    num_topics: usize,
    num_terms: usize,
    alpha: f64,
    eta: f64,
    iterations: usize,
    gamma_threshold: f64,
    lambda: Array2<f64>,
    exp_elog_beta: Array2<f64>,
}

impl LdaModel {
    /// Trains a model on a bag-of-words corpus over `num_terms` ids.
    pub fn train<R: Rng + ?Sized>(
        corpus: &[BagOfWords],
        num_terms: usize,
        settings: &LdaSettings,
        rng: &mut R,
    ) -> Result<Self> {
        if num_terms == 0 {
            return Err(EncoderError::Training(
                "cannot train LDA on an empty dictionary".to_string(),
            ));
        }
        if settings.num_topics == 0 {
            return Err(EncoderError::Config("num_topics must be positive".to_string()));
        }

        let k = settings.num_topics;
        let prior = 1.0 / k as f64;
        let gamma_dist = Gamma::new(GAMMA_SHAPE, GAMMA_SCALE)
            .map_err(|e| EncoderError::Training(format!("invalid gamma distribution: {e}")))?;

        let lambda = Array2::from_shape_simple_fn((k, num_terms), || gamma_dist.sample(&mut *rng));
        let mut model = Self {
            num_topics: k,
            num_terms,
            alpha: prior,
            eta: prior,
            iterations: settings.iterations,
            gamma_threshold: settings.gamma_threshold,
            exp_elog_beta: exp_dirichlet_expectation(&lambda),
            lambda,
        };

        info!(
            "Training LDA: {} documents, {} terms, {} topics, {} passes",
            corpus.len(),
            num_terms,
            k,
            settings.passes
        );

        for pass in 0..settings.passes {
            let mut sstats = Array2::<f64>::zeros((k, num_terms));
            let mut converged = 0usize;

            for bow in corpus {
                let init = Array1::from_shape_simple_fn(k, || gamma_dist.sample(&mut *rng));
                let (_, done) = model.e_step(bow, init, Some(&mut sstats));
                converged += usize::from(done);
            }

            sstats *= &model.exp_elog_beta;
            let rho = (OFFSET + pass as f64).powf(-DECAY);
            let target = sstats.mapv(|s| s + model.eta);
            model.lambda = &model.lambda * (1.0 - rho) + &target * rho;
            model.exp_elog_beta = exp_dirichlet_expectation(&model.lambda);

            debug!(
                "LDA pass {}/{}: {}/{} documents converged (rho {:.3})",
                pass + 1,
                settings.passes,
                converged,
                corpus.len(),
                rho
            );
        }

        Ok(model)
    }

    /// Number of topics.
    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Number of term ids the model covers.
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// Symmetric document-topic prior.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Symmetric topic-word prior.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Topic distribution of a document, one probability per topic.
    ///
    /// Inference starts from `alpha + n_words / K`, so the result is
    /// deterministic. Ids outside the model are ignored, and a document without
    /// known ids gets the uniform prior.
    pub fn document_topics(&self, bow: &[(usize, usize)]) -> Array1<f64> {
        let known: BagOfWords = bow
            .iter()
            .copied()
            .filter(|&(id, count)| id < self.num_terms && count > 0)
            .collect();
        let n_words: usize = known.iter().map(|&(_, c)| c).sum();
        let init = Array1::from_elem(
            self.num_topics,
            self.alpha + n_words as f64 / self.num_topics as f64,
        );

        let (gamma, _) = self.e_step(&known, init, None);
        let total = gamma.sum();
        if total > 0.0 {
            gamma / total
        } else {
            Array1::from_elem(self.num_topics, 1.0 / self.num_topics as f64)
        }
    }

    /// Term probabilities of a topic, most probable first.
    pub fn topic_terms(&self, topic: usize) -> Option<Vec<(usize, f64)>> {
        if topic >= self.num_topics {
            return None;
        }
        let row = self.lambda.row(topic);
        let total = row.sum();
        let mut terms: Vec<(usize, f64)> = row.iter().map(|&v| v / total).enumerate().collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Some(terms)
    }

    /// Iterates gamma for one document; returns it and whether it converged.
    ///
    /// When `sstats` is given, the document's contribution is added to it.
    fn e_step(
        &self,
        bow: &[(usize, usize)],
        mut gamma: Array1<f64>,
        sstats: Option<&mut Array2<f64>>,
    ) -> (Array1<f64>, bool) {
        if bow.is_empty() {
            return (Array1::from_elem(self.num_topics, self.alpha), true);
        }

        let ids: Vec<usize> = bow.iter().map(|&(id, _)| id).collect();
        let counts = Array1::from_iter(bow.iter().map(|&(_, c)| c as f64));
        let beta = self.exp_elog_beta.select(Axis(1), &ids);

        let mut exp_elog_theta = exp_dirichlet_expectation_1d(&gamma);
        let mut phinorm = exp_elog_theta.dot(&beta) + PHI_EPSILON;
        let mut converged = false;

        for _ in 0..self.iterations {
            let last = gamma.clone();
            let weighted = &counts / &phinorm;
            gamma = &exp_elog_theta * &beta.dot(&weighted) + self.alpha;
            exp_elog_theta = exp_dirichlet_expectation_1d(&gamma);
            phinorm = exp_elog_theta.dot(&beta) + PHI_EPSILON;

            let change = (&gamma - &last).mapv(f64::abs).mean().unwrap_or(0.0);
            if change < self.gamma_threshold {
                converged = true;
                break;
            }
        }

        if let Some(sstats) = sstats {
            let weighted = &counts / &phinorm;
            for (topic, &theta) in exp_elog_theta.iter().enumerate() {
                for (j, &id) in ids.iter().enumerate() {
                    sstats[[topic, id]] += theta * weighted[j];
                }
            }
        }

        (gamma, converged)
    }
}

/// `exp(E[log beta])` for each row of a Dirichlet parameter matrix.
fn exp_dirichlet_expectation(param: &Array2<f64>) -> Array2<f64> {
    let mut out = param.clone();
    for mut row in out.rows_mut() {
        let psi_total = digamma(row.sum());
        row.mapv_inplace(|v| (digamma(v) - psi_total).exp());
    }
    out
}

fn exp_dirichlet_expectation_1d(param: &Array1<f64>) -> Array1<f64> {
    let psi_total = digamma(param.sum());
    param.mapv(|v| (digamma(v) - psi_total).exp())
}

/// The digamma function for positive arguments.
///
/// Shifts `x` above 6 with the recurrence `psi(x) = psi(x + 1) - 1/x`, then
/// applies the asymptotic expansion.
pub fn digamma(x: f64) -> f64 {
    let mut x = x;
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    result + x.ln() - 0.5 * inv
        - inv2
            * (1.0 / 12.0
                - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Dictionary;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings(num_topics: usize, passes: usize) -> LdaSettings {
        LdaSettings {
            num_topics,
            passes,
            iterations: 50,
            gamma_threshold: 1e-3,
        }
    }

    fn corpus() -> (Dictionary, Vec<BagOfWords>) {
        let docs: Vec<Vec<&str>> = vec![
            vec!["stock", "market", "trade", "stock", "price"],
            vec!["market", "price", "trade", "investor"],
            vec!["football", "goal", "team", "match"],
            vec!["team", "match", "goal", "player", "football"],
            vec!["stock", "investor", "price"],
        ];
        let dictionary = Dictionary::from_documents(&docs);
        let bows = docs.iter().map(|d| dictionary.doc2bow(d)).collect();
        (dictionary, bows)
    }

    #[test]
    fn test_digamma_values() {
        let euler = 0.577_215_664_901_532_9;
        assert!((digamma(1.0) + euler).abs() < 1e-10);
        assert!((digamma(0.5) - (-euler - 2.0 * 2f64.ln())).abs() < 1e-10);
        assert!((digamma(10.0) - 2.251_752_589_066_721).abs() < 1e-10);
    }

    #[test]
    fn test_rows_sum_to_one() {
        let (dictionary, bows) = corpus();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let model = LdaModel::train(&bows, dictionary.len(), &settings(3, 2), &mut rng).unwrap();

        for bow in &bows {
            let topics = model.document_topics(bow);
            assert_eq!(topics.len(), 3);
            assert!((topics.sum() - 1.0).abs() < 1e-4);
            assert!(topics.iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn test_unknown_document_is_uniform() {
        let (dictionary, bows) = corpus();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let model = LdaModel::train(&bows, dictionary.len(), &settings(4, 1), &mut rng).unwrap();

        for topics in [model.document_topics(&[]), model.document_topics(&[(999, 3)])] {
            assert!(topics.iter().all(|&p| (p - 0.25).abs() < 1e-12));
        }
    }

    #[test]
    fn test_inference_is_deterministic() {
        let (dictionary, bows) = corpus();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let model = LdaModel::train(&bows, dictionary.len(), &settings(2, 1), &mut rng).unwrap();
        assert_eq!(model.document_topics(&bows[0]), model.document_topics(&bows[0]));
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        let (dictionary, bows) = corpus();
        let train = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            LdaModel::train(&bows, dictionary.len(), &settings(2, 3), &mut rng).unwrap()
        };
        assert_eq!(train(1), train(1));
    }

    #[test]
    fn test_priors() {
        let (dictionary, bows) = corpus();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let model = LdaModel::train(&bows, dictionary.len(), &settings(4, 1), &mut rng).unwrap();
        assert_eq!(model.alpha(), 0.25);
        assert_eq!(model.eta(), 0.25);
        assert_eq!(model.num_terms(), dictionary.len());
    }

    #[test]
    fn test_topic_terms_sorted() {
        let (dictionary, bows) = corpus();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let model = LdaModel::train(&bows, dictionary.len(), &settings(2, 2), &mut rng).unwrap();

        let terms = model.topic_terms(0).unwrap();
        assert_eq!(terms.len(), dictionary.len());
        assert!(terms.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!((terms.iter().map(|t| t.1).sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(model.topic_terms(2).is_none());
    }

    #[test]
    fn test_empty_dictionary() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = LdaModel::train(&[vec![]], 0, &settings(2, 1), &mut rng).unwrap_err();
        assert!(matches!(err, EncoderError::Training(_)));
    }
}
