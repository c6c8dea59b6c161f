
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::is_stop_word;

/// Upper bound on dictionary size after filtering
pub const DEFAULT_KEEP_N: usize = 100_000;

/// Token-to-id mapping with per-token document frequencies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    token2id: BTreeMap<String, usize>,
    /// Document frequency indexed by token id
    dfs: Vec<usize>,
    num_docs: usize,
}

impl Dictionary {
    #[inline]
    pub fn from_documents(documents: &[Vec<String>]) -> Self {
        let mut dictionary = Self::default();
        for document in documents {
            dictionary.add_document(document);
        }
        dictionary
    }

    /// Register a tokenized document; unseen tokens get ids in sorted order
    #[inline]
    pub fn add_document(&mut self, tokens: &[String]) {
        self.num_docs += 1;

        let unique: Vec<&String> = tokens.iter().unique().collect();
        let unseen: Vec<String> = unique
            .iter()
            .filter(|token| !self.token2id.contains_key(token.as_str()))
            .map(|token| (*token).clone())
            .sorted()
            .collect();
        for token in unseen {
            let id = self.dfs.len();
            self.token2id.insert(token, id);
            self.dfs.push(0);
        }

        for token in unique {
            if let Some(&id) = self.token2id.get(token) {
                self.dfs[id] += 1;
            }
        }
    }

    /// Drop tokens found in fewer than `no_below` documents or in more than
    /// `no_above` (a fraction) of them, keep the `keep_n` most frequent, then
    /// reassign ids contiguously in their previous order
    #[inline]
    pub fn filter_extremes(&mut self, no_below: usize, no_above: f64, keep_n: usize) {
        let no_above_abs = (no_above * self.num_docs as f64) as usize;
        let before = self.len();

        let kept_ids: Vec<usize> = (0..self.dfs.len())
            .filter(|&id| self.dfs[id] >= no_below && self.dfs[id] <= no_above_abs)
            .sorted_by(|&a, &b| self.dfs[b].cmp(&self.dfs[a]).then(a.cmp(&b)))
            .take(keep_n)
            .sorted()
            .collect();

        let id2token: HashMap<usize, &String> =
            self.token2id.iter().map(|(token, &id)| (id, token)).collect();

        let mut token2id = BTreeMap::new();
        let mut dfs = Vec::with_capacity(kept_ids.len());
        for (new_id, old_id) in kept_ids.into_iter().enumerate() {
            if let Some(token) = id2token.get(&old_id) {
                token2id.insert((*token).clone(), new_id);
                dfs.push(self.dfs[old_id]);
            }
        }

        self.token2id = token2id;
        self.dfs = dfs;

        debug!(
            "Filtered dictionary from {} to {} tokens",
            before,
            self.len()
        );
    }

    /// Sorted `(id, count)` pairs for the known tokens of a document
    #[inline]
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(usize, usize)> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for token in tokens {
            if let Some(&id) = self.token2id.get(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    #[inline]
    pub fn id(&self, token: &str) -> Option<usize> {
        self.token2id.get(token).copied()
    }

    #[inline]
    pub fn document_frequency(&self, token: &str) -> Option<usize> {
        self.id(token).map(|id| self.dfs[id])
    }

    /// Tokens indexed by id
    #[inline]
    pub fn id2token(&self) -> Vec<&str> {
        let mut tokens = vec![""; self.dfs.len()];
        for (token, &id) in &self.token2id {
            tokens[id] = token.as_str();
        }
        tokens
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dfs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dfs.is_empty()
    }

    #[inline]
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }
}

/// Clean a text into topic-model tokens
///
/// Non-word characters become spaces, everything is lower-cased, stop words
/// and tokens of three characters or fewer are dropped, and the rest are
/// lemmatized.
#[inline]
pub fn preprocess_for_topics(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .filter(|word| !is_stop_word(word) && word.chars().count() > 3)
        .map(lemmatize)
        .collect()
}

/// Words ending in `-ies` whose singular is the same word
const INVARIANT_IES: &[&str] = &["series", "species", "rabies", "facies"];

/// Plurals of nouns ending in `-ie`, which keep the `e`
const IE_PLURALS: &[&str] = &[
    "movies", "cookies", "calories", "zombies", "selfies", "hoodies", "ties", "lies",
];

/// Reduce a plural noun to its singular form
///
/// A small rule set covering regular English plurals; words that do not
/// look plural are returned unchanged.
#[inline]
pub fn lemmatize(word: &str) -> String {
    if word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
        || INVARIANT_IES.contains(&word)
    {
        return word.to_string();
    }

    if IE_PLURALS.contains(&word) {
        return word.trim_end_matches('s').to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.chars().count() > 1 {
            return format!("{}y", stem);
        }
    }

    for suffix in ["sses", "ches", "shes", "xes", "zes"] {
        if word.ends_with(suffix) {
            if let Some(stem) = word.strip_suffix("es") {
                return stem.to_string();
            }
        }
    }

    if let Some(stem) = word.strip_suffix("men") {
        return format!("{}man", stem);
    }

    match word.strip_suffix('s') {
        Some(stem) if stem.chars().count() > 3 => stem.to_string(),
        _ => word.to_string(),
    }
}
