#[cfg(test)]
mod tests;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::{FeatureVector, is_stop_word, tokenize};
use crate::{IntentError, Result};

/// Fit-time settings of the TF-IDF vectorizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    /// Smallest and largest n-gram length, inclusive
    pub ngram_range: (usize, usize),
    pub remove_stop_words: bool,
    /// Terms must appear in at least this many documents
    pub min_df: usize,
    /// Terms appearing in more than this share of documents are dropped
    pub max_df: f64,
}

impl Default for TfidfConfig {
    #[inline]
    fn default() -> Self {
        Self {
            ngram_range: (1, 2),
            remove_stop_words: true,
            min_df: 1,
            max_df: 1.0,
        }
    }
}

impl TfidfConfig {
    /// Settings for page-content classification, where boilerplate terms
    /// shared by most pages are noise
    #[inline]
    pub fn page_content() -> Self {
        Self {
            min_df: 2,
            max_df: 0.9,
            ..Self::default()
        }
    }
}

/// TF-IDF vectorizer with a frozen vocabulary and smoothed IDF weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and IDF weights from a corpus
    #[inline]
    pub fn fit<S: AsRef<str>>(config: TfidfConfig, documents: &[S]) -> Result<Self> {
        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(IntentError::Model(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }

        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in documents {
            for term in analyze(&config, document.as_ref()).into_iter().unique() {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(IntentError::Model(
                "Empty vocabulary; the documents may only contain stop words".to_string(),
            ));
        }

        let max_doc_count = config.max_df * n_documents as f64;
        if max_doc_count < config.min_df as f64 {
            return Err(IntentError::Model(format!(
                "max_df {} covers fewer documents than min_df {}",
                config.max_df, config.min_df
            )));
        }

        let kept: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df >= config.min_df && df as f64 <= max_doc_count)
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect();

        if kept.is_empty() {
            return Err(IntentError::Model(
                "After pruning, no terms remain. Try a lower min_df or a higher max_df."
                    .to_string(),
            ));
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (index, (term, df)) in kept.into_iter().enumerate() {
            idf.push(((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        debug!(
            "Fitted TF-IDF vocabulary of {} terms from {} documents",
            vocabulary.len(),
            n_documents
        );

        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    /// Encode a text as an L2-normalized TF-IDF vector
    ///
    /// Terms outside the vocabulary are ignored, so an empty or unseen text
    /// yields an empty vector.
    #[inline]
    pub fn transform(&self, text: &str) -> FeatureVector {
        // Ordered by index so the norm is summed in a fixed order
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(&self.config, text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();
        let norm = weighted
            .iter()
            .map(|&(_, value)| value * value)
            .sum::<f64>()
            .sqrt();

        if norm == 0.0 {
            return FeatureVector::empty(self.dim());
        }

        FeatureVector::new(
            self.dim(),
            weighted
                .into_iter()
                .map(|(index, value)| (index, value / norm))
                .collect(),
        )
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    #[inline]
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    #[inline]
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    #[inline]
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.term_index(term).map(|index| self.idf[index])
    }
}

/// Split a text into the unigrams and n-grams the vectorizer counts
///
/// Stop words are removed before n-grams are formed.
#[inline]
pub fn analyze(config: &TfidfConfig, text: &str) -> Vec<String> {
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|token| !config.remove_stop_words || !is_stop_word(token))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}
