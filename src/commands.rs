use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, get_config_dir, show_config};
use crate::dataset::{self, intent_text};
use crate::model::TextClassifier;
use crate::service;
use crate::training::{self, TrainingOutcome};

/// Number of words listed per topic after training
const TOP_WORDS: usize = 10;

/// Load configuration from `config_dir`, or the default directory
#[inline]
pub fn load_config(config_dir: Option<&Path>) -> Result<Config> {
    let dir = match config_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_config_dir()?,
    };
    Config::load(&dir)
}

/// Start the HTTP prediction service
#[inline]
pub async fn serve(config: &Config) -> Result<()> {
    service::serve(config).await
}

#[inline]
pub fn show_or_init_config(config: &Config, init: bool) -> Result<()> {
    if init {
        config.save()?;
        println!(
            "Wrote configuration to {}",
            style(config.config_file_path().display()).cyan()
        );
    }
    show_config(config);
    Ok(())
}

/// Train the intent classifier from recorded visits
#[inline]
pub fn train_intent(config: &Config) -> Result<()> {
    println!("Training intent classifier...");
    let outcome =
        training::train_intent_classifier(config).context("Intent classifier training failed")?;
    print_outcome(&outcome);
    Ok(())
}

/// Train the website classifier from fetched page text
#[inline]
pub fn train_website(config: &Config, csv: Option<&Path>) -> Result<()> {
    println!("Fetching content for all websites in the dataset...");
    let outcome = training::train_website_classifier(config, csv)
        .context("Website classifier training failed")?;
    print_outcome(&outcome);
    Ok(())
}

/// Train the LDA topic model and list the top words of every topic
#[inline]
pub fn train_topics(config: &Config) -> Result<()> {
    println!("Training topic model...");
    let model = training::train_topic_model(config).context("Topic model training failed")?;

    for (topic, words) in model.describe_topics(TOP_WORDS).iter().enumerate() {
        let rendered: Vec<String> = words
            .iter()
            .map(|(word, weight)| format!("{:.3}*\"{}\"", weight, word))
            .collect();
        println!("{} {}", style(format!("Topic{}:", topic)).bold(), rendered.join(" + "));
    }
    println!(
        "Topic model saved to {}",
        style(config.topic_model_path().display()).cyan()
    );
    Ok(())
}

/// Predict the intent of a single visit with the saved classifier
#[inline]
pub fn predict(config: &Config, url: &str, title: &str) -> Result<()> {
    let path = config.intent_model_path();
    let classifier = TextClassifier::load(&path)
        .with_context(|| format!("Failed to load intent model from {}", path.display()))?;

    let intent = classifier.predict(&intent_text(title, url));
    println!("Predicted Intent: {}", intent);
    Ok(())
}

/// Cluster recorded visits and list each cluster's members
#[inline]
pub fn cluster(config: &Config) -> Result<()> {
    let visits = dataset::load_visits(&config.visits_path())?;
    let assignments = training::cluster_visits(&visits, config.training.seed)?;

    let clusters = assignments
        .iter()
        .map(|assignment| assignment.cluster)
        .max()
        .map_or(0, |max| max + 1);

    for cluster in 0..clusters {
        println!();
        println!("{}", style(format!("Cluster {} visits:", cluster)).bold());
        for assignment in assignments.iter().filter(|a| a.cluster == cluster) {
            println!(" - {} ({})", assignment.visit.title, assignment.visit.url);
        }
    }
    Ok(())
}

/// Convert the website classification CSV into the labeled JSON dataset
#[inline]
pub fn prepare(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.website_csv_path());
    let output = output.unwrap_or_else(|| config.labeled_data_path());

    let sites = dataset::read_website_csv(&input)?;
    dataset::write_labeled_sites(&output, &sites)?;

    info!("Prepared {} labeled sites", sites.len());
    println!(
        "Saved {} labeled websites to {}",
        sites.len(),
        style(output.display()).cyan()
    );
    Ok(())
}

fn print_outcome(outcome: &TrainingOutcome) {
    println!();
    println!("{}", style("--- Model Evaluation ---").bold());
    print!("{}", outcome.report);
    println!();
    println!(
        "Model saved to {}",
        style(outcome.model_path.display()).green()
    );
}
