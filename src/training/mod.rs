//! Offline training jobs
//!
//! Every job loads its dataset from the configured paths, fits, evaluates on
//! a seeded held-out split and overwrites the previous artifact. Nothing here
//! gates saving on evaluation quality.

mod report;

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, TrainingConfig};
use crate::dataset::{self, LabeledSite, Visit};
use crate::features::{TfidfConfig, TfidfVectorizer};
use crate::model::kmeans::DEFAULT_MAX_ITER;
use crate::model::{KMeans, LogisticConfig, TextClassifier, TopicModel};
use crate::normalizer::PageFetcher;
use crate::{IntentError, Result};

pub use report::{AverageMetrics, ClassMetrics, ClassificationReport};

/// Upper bound on the number of visit clusters
pub const MAX_CLUSTERS: usize = 5;

/// A fitted and saved classifier with its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub classifier: TextClassifier,
    pub report: ClassificationReport,
    pub test_texts: Vec<String>,
    pub test_labels: Vec<String>,
    pub test_predictions: Vec<String>,
    pub model_path: PathBuf,
}

/// A visit and the cluster it was assigned to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    pub visit: Visit,
    pub cluster: usize,
}

impl From<&TrainingConfig> for LogisticConfig {
    #[inline]
    fn from(config: &TrainingConfig) -> Self {
        Self {
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            c: config.c,
        }
    }
}

/// Split, fit, evaluate and save a text classifier
#[inline]
pub fn fit_and_save(
    texts: Vec<String>,
    labels: Vec<String>,
    tfidf: TfidfConfig,
    training: &TrainingConfig,
    model_path: &Path,
) -> Result<TrainingOutcome> {
    if texts.is_empty() {
        return Err(IntentError::Dataset("No training examples".to_string()));
    }

    let examples: Vec<(String, String)> = texts.into_iter().zip(labels).collect();
    let split = dataset::train_test_split(&examples, training.test_size, training.seed);
    info!(
        "Training on {} examples, holding out {}",
        split.train.len(),
        split.test.len()
    );
    if split.test.is_empty() {
        warn!("Held-out split is empty; the report will be meaningless");
    }

    let (train_texts, train_labels): (Vec<String>, Vec<String>) = split.train.into_iter().unzip();
    let (test_texts, test_labels): (Vec<String>, Vec<String>) = split.test.into_iter().unzip();

    let classifier =
        TextClassifier::fit(&train_texts, &train_labels, tfidf, training.into())?;

    let test_predictions: Vec<String> = test_texts
        .iter()
        .map(|text| classifier.predict(text).to_string())
        .collect();
    let report = ClassificationReport::new(&test_labels, &test_predictions);

    classifier.save(model_path)?;
    info!("Saved classifier to {}", model_path.display());

    Ok(TrainingOutcome {
        classifier,
        report,
        test_texts,
        test_labels,
        test_predictions,
        model_path: model_path.to_path_buf(),
    })
}

/// Intent classifier over `title + domain` of recorded visits, labeled by
/// the domain-category map
#[inline]
pub fn train_intent_classifier(config: &Config) -> Result<TrainingOutcome> {
    let visits = dataset::load_visits(&config.visits_path())?;
    let categories = dataset::load_category_map(config.category_map_path())?;

    let (texts, labels) = dataset::intent_examples(&visits, &categories);
    fit_and_save(
        texts,
        labels,
        TfidfConfig::default(),
        &config.training,
        &config.intent_model_path(),
    )
}

/// Website classifier over fetched page text. `csv` overrides the labeled
/// JSON dataset.
#[inline]
pub fn train_website_classifier(config: &Config, csv: Option<&Path>) -> Result<TrainingOutcome> {
    let sites = match csv {
        Some(path) => dataset::read_website_csv(path)?,
        None => dataset::load_labeled_sites(&config.labeled_data_path())?,
    };

    let fetcher = PageFetcher::new(&config.fetch);
    let (texts, labels) =
        collect_page_texts(&fetcher, &sites, Duration::from_millis(config.fetch.rate_limit_ms));

    info!("Fetched text for {} of {} websites", texts.len(), sites.len());
    if texts.is_empty() {
        return Err(IntentError::Dataset(
            "No website content could be fetched".to_string(),
        ));
    }

    fit_and_save(
        texts,
        labels,
        TfidfConfig::page_content(),
        &config.training,
        &config.website_model_path(),
    )
}

/// Fetch page text for each site in order, sleeping `delay` between
/// requests. Failed or empty pages are dropped.
#[inline]
pub fn collect_page_texts(
    fetcher: &PageFetcher,
    sites: &[LabeledSite],
    delay: Duration,
) -> (Vec<String>, Vec<String>) {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new(sites.len() as u64).with_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] Fetching {msg}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };

    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for (index, site) in sites.iter().enumerate() {
        if index > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        bar.set_message(site.url.clone());

        match fetcher.fetch_page_text(&site.url) {
            Ok(text) if !text.is_empty() => {
                texts.push(text);
                labels.push(site.category.clone());
            }
            Ok(_) => debug!("No text extracted from {}", site.url),
            Err(e) => warn!("Could not fetch {}: {}", site.url, e),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    (texts, labels)
}

/// LDA topic model over `title + url` of recorded visits
#[inline]
pub fn train_topic_model(config: &Config) -> Result<TopicModel> {
    let visits = dataset::load_visits(&config.visits_path())?;
    let documents: Vec<String> = visits.iter().map(Visit::topic_text).collect();

    let model = TopicModel::fit(&documents, &config.topics)?;
    model.save(&config.topic_model_path(), &config.topic_dictionary_path())?;
    info!(
        "Saved topic model with {} topics to {}",
        model.num_topics(),
        config.topic_model_path().display()
    );

    Ok(model)
}

/// Group visits with k-means over TF-IDF of `title + domain`, using
/// `min(MAX_CLUSTERS, visits)` clusters
#[inline]
pub fn cluster_visits(visits: &[Visit], seed: u64) -> Result<Vec<ClusterAssignment>> {
    if visits.is_empty() {
        return Err(IntentError::Dataset("No visits to cluster".to_string()));
    }

    let texts: Vec<String> = visits.iter().map(Visit::intent_text).collect();
    let vectorizer = TfidfVectorizer::fit(TfidfConfig::default(), &texts)?;
    let rows: Vec<Vec<f64>> = texts
        .iter()
        .map(|text| vectorizer.transform(text).to_dense())
        .collect();

    let k = MAX_CLUSTERS.min(visits.len());
    let clustering = KMeans::fit(&rows, k, seed, DEFAULT_MAX_ITER)?;

    Ok(visits
        .iter()
        .cloned()
        .zip(clustering.labels)
        .map(|(visit, cluster)| ClusterAssignment { visit, cluster })
        .collect())
}
