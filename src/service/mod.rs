//! HTTP prediction service
//!
//! A [`ServiceContext`] is built once at startup and shared read-only with
//! every handler. A model that failed to load stays unavailable until the
//! process restarts.

mod errors;
mod summary;

use anyhow::Context;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dataset::intent_text;
use crate::model::{Inference, InferenceModel, TextClassifier, TopicDistribution, TopicModel};
use crate::normalizer::PageFetcher;

pub use errors::{ApiError, ErrorBody};
pub use summary::{MIN_INTENTS, NOT_ENOUGH_DATA, summarize_intents};

type LoadedModel = Box<dyn InferenceModel>;

/// Loaded models and the page fetcher used by `/classify`
pub struct ServiceContext {
    intent: Option<LoadedModel>,
    website: Option<LoadedModel>,
    topics: Option<LoadedModel>,
    fetcher: PageFetcher,
}

impl ServiceContext {
    /// A context with no models loaded
    #[inline]
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            intent: None,
            website: None,
            topics: None,
            fetcher,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_intent_model(mut self, model: impl InferenceModel + 'static) -> Self {
        self.intent = Some(Box::new(model));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_website_model(mut self, model: impl InferenceModel + 'static) -> Self {
        self.website = Some(Box::new(model));
        self
    }

    #[inline]
    #[must_use]
    pub fn with_topic_model(mut self, model: impl InferenceModel + 'static) -> Self {
        self.topics = Some(Box::new(model));
        self
    }

    /// Load every artifact named by `config`. Missing or unreadable
    /// artifacts are logged and left unavailable.
    #[inline]
    pub fn load(config: &Config) -> Self {
        let mut context = Self::new(PageFetcher::new(&config.fetch));

        match TextClassifier::load(&config.intent_model_path()) {
            Ok(model) => context = context.with_intent_model(model),
            Err(e) => warn!("Intent model unavailable: {}", e),
        }
        match TextClassifier::load(&config.website_model_path()) {
            Ok(model) => context = context.with_website_model(model),
            Err(e) => warn!("Website model unavailable: {}", e),
        }
        match TopicModel::load(&config.topic_model_path(), &config.topic_dictionary_path()) {
            Ok(model) => context = context.with_topic_model(model),
            Err(e) => warn!("Topic model unavailable: {}", e),
        }

        context
    }

    #[inline]
    pub fn models(&self) -> ModelStatus {
        ModelStatus {
            intent: self.intent.is_some(),
            website: self.website.is_some(),
            topics: self.topics.is_some(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub intents: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct IntentResponse {
    pub intent: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: TopicDistribution,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub intent: bool,
    pub website: bool,
    pub topics: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub models: ModelStatus,
}

/// Build the router over a shared context
#[inline]
pub fn router(context: Arc<ServiceContext>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/classify", post(classify))
        .route("/analyze_topics", post(analyze_topics))
        .route("/summarize", post(summarize))
        .route("/health", get(health))
        .with_state(context)
}

/// Load the models and serve until the process is stopped
#[inline]
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let context = Arc::new(ServiceContext::load(config));
    let models = context.models();
    info!(
        "Models loaded: intent={}, website={}, topics={}",
        models.intent, models.website, models.topics
    );

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(context))
        .await
        .context("Server shutdown")?;
    Ok(())
}

fn require_model<'a>(
    model: Option<&'a LoadedModel>,
    name: &'static str,
) -> Result<&'a LoadedModel, ApiError> {
    model.ok_or(ApiError::ModelUnavailable(name))
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn expect_label(inference: Inference) -> Result<String, ApiError> {
    match inference {
        Inference::Label(label) => Ok(label),
        Inference::Topics(_) => Err(ApiError::Internal(
            "Model produced topics where a label was expected".to_string(),
        )),
    }
}

async fn predict(
    State(context): State<Arc<ServiceContext>>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<IntentResponse>, ApiError> {
    let Json(request) = payload?;
    let model = require_model(context.intent.as_ref(), "Intent")?;

    let (Some(title), Some(url)) = (non_empty(request.title), non_empty(request.url)) else {
        return Err(ApiError::BadRequest("Missing title or url".to_string()));
    };

    let text = intent_text(&title, &url);
    debug!("Predicting intent for {:?}", text);
    let intent = expect_label(model.infer(&text))?;
    Ok(Json(IntentResponse { intent }))
}

async fn classify(
    State(context): State<Arc<ServiceContext>>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Json(request) = payload?;
    let model = require_model(context.website.as_ref(), "Website")?;

    let Some(url) = non_empty(request.url) else {
        return Err(ApiError::BadRequest("Missing url".to_string()));
    };

    let fetcher = context.fetcher.clone();
    let fetch_url = url.clone();
    let fetched = tokio::task::spawn_blocking(move || fetcher.fetch_page_text(&fetch_url))
        .await
        .map_err(|e| ApiError::Internal(format!("Fetch task failed: {}", e)))?;

    let text = match fetched {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => {
            debug!("No text extracted from {}, using title", url);
            request.title.unwrap_or_default()
        }
        Err(e) => {
            warn!("Falling back to title for {}: {}", url, e);
            request.title.unwrap_or_default()
        }
    };

    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "No page text or title available to classify".to_string(),
        ));
    }

    let category = expect_label(model.infer(&text))?;
    Ok(Json(CategoryResponse { category }))
}

async fn analyze_topics(
    State(context): State<Arc<ServiceContext>>,
    payload: Result<Json<PageRequest>, JsonRejection>,
) -> Result<Json<TopicsResponse>, ApiError> {
    let Json(request) = payload?;
    let model = require_model(context.topics.as_ref(), "Topic")?;

    let Some(url) = non_empty(request.url) else {
        return Err(ApiError::BadRequest("Missing url".to_string()));
    };
    let text = format!("{} {}", request.title.unwrap_or_default(), url);

    match model.infer(&text) {
        Inference::Topics(topics) => Ok(Json(TopicsResponse { topics })),
        Inference::Label(_) => Err(ApiError::Internal(
            "Model produced a label where topics were expected".to_string(),
        )),
    }
}

async fn summarize(
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Json(request) = payload?;
    let Some(intents) = request.intents else {
        return Err(ApiError::BadRequest("Missing intents".to_string()));
    };

    Ok(Json(SummaryResponse {
        summary: summarize_intents(&intents),
    }))
}

async fn health(State(context): State<Arc<ServiceContext>>) -> Json<HealthResponse> {
    let models = context.models();
    Json(HealthResponse {
        status: "healthy",
        model_loaded: models.intent,
        models,
    })
}
