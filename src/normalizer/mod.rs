//! URL and page-text normalization
//!
//! Turns a visited URL into the domain used as a feature and a fetched page
//! into the plain text the website classifier is trained on.


use itertools::Itertools;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use ureq::Agent;
use url::Url;

use crate::config::FetchConfig;

static TEXT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, h1, h2, h3, title").expect("valid selector"));

static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"meta[name="description"], meta[name="keywords"], meta[property="og:description"]"#,
    )
    .expect("valid selector")
});

/// Why a page could not be turned into text
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}

/// Extract the network location of a URL without a leading `www.`
///
/// Malformed input yields an empty string.
#[inline]
pub fn extract_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let netloc = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    netloc
        .strip_prefix("www.")
        .map_or_else(|| netloc.clone(), str::to_string)
}

/// Give scheme-less dataset URLs (`example.com`) a fetchable form
#[inline]
pub fn format_dataset_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://www.{}", url)
    }
}

/// Validate that a URL can be fetched over HTTP(S)
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url, FetchError> {
    let url = Url::parse(url_str.trim()).map_err(|_| FetchError::InvalidUrl(url_str.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(FetchError::InvalidUrl(url_str.to_string()));
    }

    if url.host_str().is_none() {
        return Err(FetchError::InvalidUrl(url_str.to_string()));
    }

    Ok(url)
}

/// Pull the readable text out of an HTML page
///
/// Collects headings, paragraphs, the title and descriptive meta tags,
/// ignoring anything inside `script` or `style`, and collapses whitespace.
#[inline]
pub fn extract_page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts: Vec<String> = document.select(&TEXT_SELECTOR).map(visible_text).collect();

    parts.extend(
        document
            .select(&META_SELECTOR)
            .filter_map(|meta| meta.value().attr("content"))
            .map(str::to_string),
    );

    collapse_whitespace(&parts.join(" "))
}

#[inline]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor.value().as_element().is_some_and(|parent| {
                    matches!(parent.name(), "script" | "style" | "noscript")
                })
            });
            match node.value() {
                Node::Text(text) if !hidden => Some(&**text),
                _ => None,
            }
        })
        .collect()
}

/// Blocking single-attempt page fetcher
#[derive(Debug, Clone)]
pub struct PageFetcher {
    agent: Agent,
}

impl PageFetcher {
    #[inline]
    pub fn new(config: &FetchConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self { agent }
    }

    /// Fetch the raw HTML of a page, without retries
    #[inline]
    pub fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = validate_url(url)?;
        debug!("Making HTTP GET request to: {}", parsed);

        match self.agent.get(parsed.as_str()).call() {
            Ok(mut response) => {
                let body = response
                    .body_mut()
                    .read_to_string()
                    .map_err(|e| FetchError::Body {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                debug!("Read {} bytes from {}", body.len(), url);
                Ok(body)
            }
            Err(ureq::Error::StatusCode(status)) => {
                debug!("HTTP request failed with status {}: {}", status, url);
                Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                })
            }
            Err(e) => {
                debug!("HTTP request failed with transport error: {}", e);
                Err(FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Fetch a page and extract its readable text
    #[inline]
    pub fn fetch_page_text(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetch_html(url)?;
        Ok(extract_page_text(&html))
    }
}

impl Default for PageFetcher {
    #[inline]
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}
