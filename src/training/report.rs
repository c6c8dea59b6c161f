use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class precision, recall and F1 over a held-out split
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

impl ClassificationReport {
    /// Compare true labels with predictions. Classes are the sorted union of
    /// both; a zero denominator scores 0.
    #[inline]
    pub fn new(truth: &[String], predicted: &[String]) -> Self {
        let labels: BTreeSet<&str> = truth
            .iter()
            .chain(predicted)
            .map(String::as_str)
            .collect();
        let pairs: Vec<(&str, &str)> = truth
            .iter()
            .zip(predicted)
            .map(|(t, p)| (t.as_str(), p.as_str()))
            .collect();
        let support = pairs.len();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let tp = pairs.iter().filter(|&&(t, p)| t == label && p == label).count();
                let predicted_count = pairs.iter().filter(|&&(_, p)| p == label).count();
                let class_support = pairs.iter().filter(|&&(t, _)| t == label).count();

                let precision = ratio(tp, predicted_count);
                let recall = ratio(tp, class_support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: class_support,
                }
            })
            .collect();

        let correct = pairs.iter().filter(|(t, p)| t == p).count();

        let macro_avg = if classes.is_empty() {
            AverageMetrics::default()
        } else {
            let n = classes.len() as f64;
            AverageMetrics {
                precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
                recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
                f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
            }
        };

        let weighted_avg = if support == 0 {
            AverageMetrics::default()
        } else {
            let total = support as f64;
            let weighted = |metric: fn(&ClassMetrics) -> f64| {
                classes
                    .iter()
                    .map(|c| metric(c) * c.support as f64)
                    .sum::<f64>()
                    / total
            };
            AverageMetrics {
                precision: weighted(|c| c.precision),
                recall: weighted(|c| c.recall),
                f1: weighted(|c| c.f1),
            }
        };

        Self {
            classes,
            accuracy: ratio(correct, support),
            macro_avg,
            weighted_avg,
            support,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or_default();

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.label, class.precision, class.recall, class.f1, class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}
