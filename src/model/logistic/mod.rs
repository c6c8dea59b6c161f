#[cfg(test)]
mod tests;

use itertools::Itertools;
use linfa::prelude::*;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::FeatureVector;
use crate::{IntentError, Result};

/// Optimisation settings for [`LogisticRegression::fit`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticConfig {
    pub max_iter: usize,
    /// Gradient norm at which the solver stops early
    pub tolerance: f64,
    /// Inverse L2 regularization strength
    pub c: f64,
}

impl Default for LogisticConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_iter: 500,
            tolerance: 1e-4,
            c: 1.0,
        }
    }
}

/// Multinomial (softmax) logistic regression over sparse features
///
/// Fitting is delegated to `linfa-logistic`; only the learned coefficients
/// are kept so the model serializes as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Class labels in sorted order; row `k` of `weights` belongs to `classes[k]`
    classes: Vec<String>,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    /// Fit a multinomial model with an L2 penalty of `1 / C`
    #[inline]
    pub fn fit(samples: &[FeatureVector], labels: &[String], config: LogisticConfig) -> Result<Self> {
        if samples.is_empty() {
            return Err(IntentError::Model("Cannot fit a classifier on zero samples".to_string()));
        }
        if samples.len() != labels.len() {
            return Err(IntentError::Model(format!(
                "Got {} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }

        let classes: Vec<String> = labels.iter().cloned().unique().sorted().collect();
        let dim = samples[0].dim();

        // A single class always predicts itself; nothing to optimise
        if classes.len() == 1 {
            return Ok(Self {
                classes,
                weights: vec![vec![0.0; dim]],
                intercepts: vec![0.0],
            });
        }

        let mut records = Array2::<f64>::zeros((samples.len(), dim));
        for (row, sample) in samples.iter().enumerate() {
            for &(index, value) in sample.entries() {
                if index < dim {
                    records[[row, index]] = value;
                }
            }
        }
        // Targets are indices into the sorted class list, so fitted columns
        // come back in the same order as `classes`
        let targets: Array1<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();
        let dataset = Dataset::new(records, targets);

        debug!(
            "Fitting logistic regression on {} samples, {} features, {} classes",
            samples.len(),
            dim,
            classes.len()
        );

        let fitted = MultiLogisticRegression::default()
            .alpha(1.0 / config.c)
            .gradient_tolerance(config.tolerance)
            .max_iterations(u64::try_from(config.max_iter).unwrap_or(u64::MAX))
            .fit(&dataset)
            .map_err(|e| IntentError::Model(format!("Logistic regression failed: {}", e)))?;

        let params = fitted.params();
        let intercept = fitted.intercept();
        let weights = (0..classes.len())
            .map(|class| params.column(class).to_vec())
            .collect();
        let intercepts = (0..classes.len()).map(|class| intercept[class]).collect();

        Ok(Self {
            classes,
            weights,
            intercepts,
        })
    }

    /// Most likely class; ties go to the first class in sorted order
    #[inline]
    pub fn predict(&self, sample: &FeatureVector) -> &str {
        let scores = scores(&self.weights, &self.intercepts, sample);
        let mut best = 0;
        for (class, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = class;
            }
        }
        &self.classes[best]
    }

    /// Class probabilities in the order of [`Self::classes`]
    #[inline]
    pub fn predict_proba(&self, sample: &FeatureVector) -> Vec<f64> {
        softmax(&scores(&self.weights, &self.intercepts, sample))
    }

    #[inline]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

fn scores(weights: &[Vec<f64>], intercepts: &[f64], sample: &FeatureVector) -> Vec<f64> {
    weights
        .iter()
        .zip(intercepts)
        .map(|(row, intercept)| sample.dot(row) + intercept)
        .collect()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|value| value / total).collect()
}
