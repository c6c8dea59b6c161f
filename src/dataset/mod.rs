//! Browsing visits and labeled websites on disk

#[cfg(test)]
mod tests;

use anyhow::Context;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::normalizer::{extract_domain, format_dataset_url};
use crate::{IntentError, Result};

/// Label given to visits whose domain has no known category
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Domain to category
pub type CategoryMap = HashMap<String, String>;

/// One page visit recorded by the browser extension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl Visit {
    #[inline]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Title followed by the visit's domain
    #[inline]
    pub fn intent_text(&self) -> String {
        intent_text(&self.title, &self.url)
    }

    /// Title followed by the full URL
    #[inline]
    pub fn topic_text(&self) -> String {
        format!("{} {}", self.title, self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSite {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct WebsiteRow {
    website_url: Option<String>,
    #[serde(rename = "Category")]
    category: Option<String>,
}

/// Held-out evaluation split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

/// Feature text used for intent prediction
#[inline]
pub fn intent_text(title: &str, url: &str) -> String {
    format!("{} {}", title, extract_domain(url))
}

#[inline]
pub fn load_visits(path: &Path) -> Result<Vec<Visit>> {
    let visits: Vec<Visit> = read_json(path)?;
    info!("Loaded {} visits from {}", visits.len(), path.display());
    Ok(visits)
}

#[inline]
pub fn load_labeled_sites(path: &Path) -> Result<Vec<LabeledSite>> {
    let sites: Vec<LabeledSite> = read_json(path)?;
    info!("Loaded {} labeled sites from {}", sites.len(), path.display());
    Ok(sites)
}

#[inline]
pub fn load_category_map(path: &Path) -> Result<CategoryMap> {
    let map: CategoryMap = read_json(path)?;
    debug!("Loaded {} domain categories", map.len());
    Ok(map)
}

/// Read the website classification CSV (`website_url`, `Category` columns).
/// Rows missing either field are dropped and URLs get a scheme.
#[inline]
pub fn read_website_csv(path: &Path) -> Result<Vec<LabeledSite>> {
    ensure_exists(path)?;
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    let mut sites = Vec::new();
    let mut dropped = 0_usize;
    for (line, row) in reader.deserialize::<WebsiteRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed CSV row {}: {}", line + 1, e);
                dropped += 1;
                continue;
            }
        };

        let url = row.website_url.as_deref().map(str::trim).unwrap_or_default();
        let category = row.category.as_deref().map(str::trim).unwrap_or_default();
        if url.is_empty() || category.is_empty() {
            dropped += 1;
            continue;
        }

        sites.push(LabeledSite {
            url: format_dataset_url(url),
            category: category.to_string(),
        });
    }

    if dropped > 0 {
        debug!("Dropped {} incomplete CSV rows", dropped);
    }
    info!("Read {} labeled sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Write labeled sites as a pretty JSON array, replacing the file
#[inline]
pub fn write_labeled_sites(path: &Path, sites: &[LabeledSite]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(sites)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write dataset: {}", path.display()))?;
    Ok(())
}

/// Feature texts and labels for the intent classifier. Visits whose
/// domain is not in `categories` are labeled [`UNKNOWN_LABEL`].
#[inline]
pub fn intent_examples(visits: &[Visit], categories: &CategoryMap) -> (Vec<String>, Vec<String>) {
    visits
        .iter()
        .map(|visit| {
            let label = categories
                .get(&extract_domain(&visit.url))
                .map_or(UNKNOWN_LABEL, String::as_str);
            (visit.intent_text(), label.to_string())
        })
        .unzip()
}

/// Shuffle with a fixed seed and hold out `ceil(test_size * n)` items.
/// At least one item stays in the training half.
#[inline]
pub fn train_test_split<T: Clone>(items: &[T], test_size: f64, seed: u64) -> Split<T> {
    let n = items.len();
    let test_count = ((test_size * n as f64).ceil() as usize).min(n.saturating_sub(1));

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test, train) = indices.split_at(test_count);
    Split {
        train: train.iter().map(|&i| items[i].clone()).collect(),
        test: test.iter().map(|&i| items[i].clone()).collect(),
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(IntentError::Dataset(format!(
            "File not found: {}",
            path.display()
        )))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    ensure_exists(path)?;
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(value)
}
