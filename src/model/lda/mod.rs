
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{IntentError, Result};

/// Gibbs sweeps run for each configured pass over the corpus
const SWEEPS_PER_PASS: usize = 20;
/// Fixed-point iterations when inferring a new document's topic mix
const INFERENCE_ITERATIONS: usize = 100;

/// A bag-of-words document: sorted `(token id, count)` pairs
pub type BagOfWords = [(usize, usize)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LdaConfig {
    pub num_topics: usize,
    pub passes: usize,
    pub seed: u64,
}

/// Latent Dirichlet Allocation with symmetric priors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdaModel {
    num_topics: usize,
    alpha: f64,
    eta: f64,
    /// Row `k` is topic `k`'s distribution over token ids
    topic_word: Vec<Vec<f64>>,
}

impl LdaModel {
    /// Train by collapsed Gibbs sampling with a seeded generator
    #[inline]
    pub fn fit(corpus: &[Vec<(usize, usize)>], num_terms: usize, config: LdaConfig) -> Result<Self> {
        if config.num_topics == 0 {
            return Err(IntentError::Model("Topic count must be at least 1".to_string()));
        }
        if num_terms == 0 || corpus.iter().all(Vec::is_empty) {
            return Err(IntentError::Model(
                "Cannot train a topic model on an empty corpus".to_string(),
            ));
        }

        let k = config.num_topics;
        let alpha = 1.0 / k as f64;
        let eta = 1.0 / k as f64;
        let v_eta = num_terms as f64 * eta;
        let mut rng = StdRng::seed_from_u64(config.seed);

        // Expand counts into one entry per token occurrence
        let documents: Vec<Vec<usize>> = corpus
            .iter()
            .map(|bow| {
                bow.iter()
                    .filter(|&&(id, _)| id < num_terms)
                    .flat_map(|&(id, count)| std::iter::repeat_n(id, count))
                    .collect()
            })
            .collect();

        let mut doc_topic = vec![vec![0usize; k]; documents.len()];
        let mut topic_word = vec![vec![0usize; num_terms]; k];
        let mut topic_total = vec![0usize; k];
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(documents.len());

        for (d, words) in documents.iter().enumerate() {
            let mut doc_assignments = Vec::with_capacity(words.len());
            for &w in words {
                let topic = rng.gen_range(0..k);
                doc_topic[d][topic] += 1;
                topic_word[topic][w] += 1;
                topic_total[topic] += 1;
                doc_assignments.push(topic);
            }
            assignments.push(doc_assignments);
        }

        let mut weights = vec![0.0; k];
        let sweeps = config.passes.max(1) * SWEEPS_PER_PASS;
        // Samples from the first half of the chain are discarded
        let burn_in = sweeps / 2;
        let mut accumulated = vec![vec![0.0; num_terms]; k];
        let mut samples = 0usize;
        for sweep in 0..sweeps {
            for (d, words) in documents.iter().enumerate() {
                for (position, &w) in words.iter().enumerate() {
                    let old = assignments[d][position];
                    doc_topic[d][old] -= 1;
                    topic_word[old][w] -= 1;
                    topic_total[old] -= 1;

                    let mut total = 0.0;
                    for topic in 0..k {
                        let weight = (doc_topic[d][topic] as f64 + alpha)
                            * (topic_word[topic][w] as f64 + eta)
                            / (topic_total[topic] as f64 + v_eta);
                        total += weight;
                        weights[topic] = total;
                    }

                    let draw = rng.r#gen::<f64>() * total;
                    let new = weights.iter().position(|&cumulative| draw < cumulative).unwrap_or(k - 1);

                    assignments[d][position] = new;
                    doc_topic[d][new] += 1;
                    topic_word[new][w] += 1;
                    topic_total[new] += 1;
                }
            }

            if sweep >= burn_in {
                for (sum_row, row) in accumulated.iter_mut().zip(&topic_word) {
                    for (sum, &count) in sum_row.iter_mut().zip(row) {
                        *sum += count as f64;
                    }
                }
                samples += 1;
            }

            if sweep % SWEEPS_PER_PASS == 0 {
                debug!("Completed Gibbs sweep {} of {}", sweep + 1, sweeps);
            }
        }

        // Posterior mean of the topic-word counts over the kept samples
        let samples = samples.max(1) as f64;
        let topic_word = accumulated
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum::<f64>() / samples;
                row.iter()
                    .map(|&sum| (sum / samples + eta) / (total + v_eta))
                    .collect()
            })
            .collect();

        info!(
            "Trained LDA with {} topics over {} documents and {} terms",
            k,
            documents.len(),
            num_terms
        );

        Ok(Self {
            num_topics: k,
            alpha,
            eta,
            topic_word,
        })
    }

    /// Full topic mixture of a document; empty when no known token occurs
    #[inline]
    pub fn infer(&self, bow: &BagOfWords) -> Vec<f64> {
        let words: Vec<(usize, f64)> = bow
            .iter()
            .filter(|&&(id, _)| id < self.num_terms())
            .map(|&(id, count)| (id, count as f64))
            .collect();
        if words.is_empty() {
            return Vec::new();
        }

        let k = self.num_topics;
        let mut theta = vec![1.0 / k as f64; k];
        for _ in 0..INFERENCE_ITERATIONS {
            let mut expected = vec![self.alpha; k];
            for &(id, count) in &words {
                let norm: f64 = (0..k).map(|topic| self.topic_word[topic][id] * theta[topic]).sum();
                if norm <= 0.0 {
                    continue;
                }
                for topic in 0..k {
                    expected[topic] += count * self.topic_word[topic][id] * theta[topic] / norm;
                }
            }
            let total: f64 = expected.iter().sum();
            theta = expected.into_iter().map(|value| value / total).collect();
        }
        theta
    }

    /// Topics whose probability reaches `min_probability`, by topic id
    #[inline]
    pub fn document_topics(&self, bow: &BagOfWords, min_probability: f64) -> Vec<(usize, f64)> {
        self.infer(bow)
            .into_iter()
            .enumerate()
            .filter(|&(_, probability)| probability >= min_probability)
            .collect()
    }

    /// Highest-probability token ids of a topic
    #[inline]
    pub fn top_words(&self, topic: usize, n: usize) -> Vec<(usize, f64)> {
        let Some(row) = self.topic_word.get(topic) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    #[inline]
    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    #[inline]
    pub fn num_terms(&self) -> usize {
        self.topic_word.first().map_or(0, Vec::len)
    }
}
