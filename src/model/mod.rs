//! Fitted models behind a single inference capability
//!
//! A [`TextClassifier`] bundles a TF-IDF vectorizer with a logistic
//! regression; a [`TopicModel`] bundles a dictionary with an LDA model. Both
//! are trained offline, saved as JSON and read-only once loaded.

pub mod kmeans;
pub mod lda;
pub mod logistic;


use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

use crate::config::TopicConfig;
use crate::features::dictionary::DEFAULT_KEEP_N;
use crate::features::{Dictionary, TfidfConfig, TfidfVectorizer, preprocess_for_topics};
use crate::{IntentError, Result};

pub use kmeans::{Clustering, KMeans};
pub use lda::{LdaConfig, LdaModel};
pub use logistic::{LogisticConfig, LogisticRegression};

/// Topic name (`Topic0`, `Topic1`, ...) to probability
pub type TopicDistribution = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Classifier,
    Topics,
}

/// What a model produced for one text
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    Label(String),
    Topics(TopicDistribution),
}

/// Anything that maps a feature text to an [`Inference`]
pub trait InferenceModel: Send + Sync {
    fn infer(&self, text: &str) -> Inference;

    fn kind(&self) -> ModelKind;
}

/// TF-IDF + logistic regression pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClassifier {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl TextClassifier {
    /// Fit the vectorizer and the classifier together on the same texts
    #[inline]
    pub fn fit(
        texts: &[String],
        labels: &[String],
        tfidf: TfidfConfig,
        logistic: LogisticConfig,
    ) -> Result<Self> {
        let vectorizer = TfidfVectorizer::fit(tfidf, texts)?;
        let samples: Vec<_> = texts.iter().map(|text| vectorizer.transform(text)).collect();
        let classifier = LogisticRegression::fit(&samples, labels, logistic)?;

        info!(
            "Fitted classifier with {} classes over {} features",
            classifier.classes().len(),
            vectorizer.dim()
        );

        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    #[inline]
    pub fn predict(&self, text: &str) -> &str {
        self.classifier.predict(&self.vectorizer.transform(text))
    }

    #[inline]
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    #[inline]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Write the pipeline to `path`, replacing any previous artifact
    #[inline]
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    #[inline]
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }
}

impl InferenceModel for TextClassifier {
    fn infer(&self, text: &str) -> Inference {
        Inference::Label(self.predict(text).to_string())
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Classifier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StoredTopics {
    lda: LdaModel,
    min_probability: f64,
}

/// Dictionary + LDA pair
#[derive(Debug, Clone, PartialEq)]
pub struct TopicModel {
    dictionary: Dictionary,
    lda: LdaModel,
    min_probability: f64,
}

impl TopicModel {
    /// Preprocess documents, build the dictionary and train LDA with
    /// `min(max_topics, documents)` topics
    #[inline]
    pub fn fit<S: AsRef<str>>(documents: &[S], config: &TopicConfig) -> Result<Self> {
        let processed: Vec<Vec<String>> = documents
            .iter()
            .map(|document| preprocess_for_topics(document.as_ref()))
            .filter(|tokens| !tokens.is_empty())
            .collect();

        if processed.is_empty() {
            return Err(IntentError::Model(
                "No valid words remain after preprocessing the documents".to_string(),
            ));
        }

        let mut dictionary = Dictionary::from_documents(&processed);
        dictionary.filter_extremes(config.no_below, config.no_above, DEFAULT_KEEP_N);

        let corpus: Vec<Vec<(usize, usize)>> =
            processed.iter().map(|tokens| dictionary.doc2bow(tokens)).collect();

        let num_topics = config.max_topics.min(processed.len());
        debug!("Using {} topics for {} documents", num_topics, processed.len());

        let lda = LdaModel::fit(
            &corpus,
            dictionary.len(),
            LdaConfig {
                num_topics,
                passes: config.passes,
                seed: config.seed,
            },
        )?;

        Ok(Self {
            dictionary,
            lda,
            min_probability: config.min_probability,
        })
    }

    /// Topics of a text at or above the configured probability threshold
    #[inline]
    pub fn topics(&self, text: &str) -> TopicDistribution {
        let bow = self.dictionary.doc2bow(&preprocess_for_topics(text));
        self.lda
            .document_topics(&bow, self.min_probability)
            .into_iter()
            .map(|(topic, probability)| (format!("Topic{}", topic), probability))
            .collect()
    }

    /// Top `n` words of every topic, for reporting
    #[inline]
    pub fn describe_topics(&self, n: usize) -> Vec<Vec<(String, f64)>> {
        let id2token = self.dictionary.id2token();
        (0..self.lda.num_topics())
            .map(|topic| {
                self.lda
                    .top_words(topic, n)
                    .into_iter()
                    .filter_map(|(id, weight)| {
                        id2token.get(id).map(|token| ((*token).to_string(), weight))
                    })
                    .collect()
            })
            .collect()
    }

    #[inline]
    pub fn num_topics(&self) -> usize {
        self.lda.num_topics()
    }

    #[inline]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Write the model and its dictionary as two files
    #[inline]
    pub fn save(&self, model_path: &Path, dictionary_path: &Path) -> Result<()> {
        save_json(
            &StoredTopics {
                lda: self.lda.clone(),
                min_probability: self.min_probability,
            },
            model_path,
        )?;
        save_json(&self.dictionary, dictionary_path)
    }

    #[inline]
    pub fn load(model_path: &Path, dictionary_path: &Path) -> Result<Self> {
        let stored: StoredTopics = load_json(model_path)?;
        let dictionary: Dictionary = load_json(dictionary_path)?;

        if dictionary.len() != stored.lda.num_terms() {
            return Err(IntentError::Model(format!(
                "Dictionary has {} tokens but the topic model expects {}",
                dictionary.len(),
                stored.lda.num_terms()
            )));
        }

        Ok(Self {
            dictionary,
            lda: stored.lda,
            min_probability: stored.min_probability,
        })
    }
}

impl InferenceModel for TopicModel {
    fn infer(&self, text: &str) -> Inference {
        Inference::Topics(self.topics(text))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Topics
    }
}

fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create artifact: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))?;

    debug!("Saved artifact to {}", path.display());
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file =
        File::open(path).with_context(|| format!("Failed to open artifact: {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse artifact: {}", path.display()))?;
    Ok(value)
}
