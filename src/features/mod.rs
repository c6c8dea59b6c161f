//! Text to feature-vector pipelines
//!
//! Two encoders share the tokenizer and stop-word list: a TF-IDF vectorizer
//! for the classifiers and a bag-of-words dictionary for the topic model.
//! Both are fitted once at training time and frozen into the saved artifact.

pub mod dictionary;
pub mod stop_words;
pub mod tfidf;


use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub use dictionary::{Dictionary, lemmatize, preprocess_for_topics};
pub use stop_words::is_stop_word;
pub use tfidf::{TfidfConfig, TfidfVectorizer};

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Lower-case a text and split it into word tokens of two or more characters
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .filter_map(Result::ok)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Sparse numeric vector over a fixed vocabulary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    /// `(index, value)` pairs sorted by index, without zeros
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    #[inline]
    pub fn new(dim: usize, mut entries: Vec<(usize, f64)>) -> Self {
        entries.retain(|&(index, value)| index < dim && value != 0.0);
        entries.sort_by_key(|&(index, _)| index);
        Self { dim, entries }
    }

    #[inline]
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|&(_, value)| value * value)
            .sum::<f64>()
            .sqrt()
    }

    /// Dot product with a dense weight row of the same dimension
    #[inline]
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(index, value)| dense.get(index).map(|weight| weight * value))
            .sum()
    }

    #[inline]
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(index, value) in &self.entries {
            dense[index] = value;
        }
        dense
    }
}
