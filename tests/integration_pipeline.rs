#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use browse_intent::config::{Config, PathsConfig};
use browse_intent::dataset::intent_text;
use browse_intent::model::TextClassifier;
use browse_intent::service::{ServiceContext, router};
use browse_intent::training::{train_intent_classifier, train_topic_model};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const VISITS: &str = r#"[
    {"url": "https://www.amazon.com/running-shoes", "title": "Running shoes sale"},
    {"url": "https://www.amazon.com/cart", "title": "Shopping cart checkout"},
    {"url": "https://www.amazon.com/laptops", "title": "Laptop deals"},
    {"url": "https://www.ebay.com/phones", "title": "Phone auction deals"},
    {"url": "https://www.ebay.com/watches", "title": "Watch auction"},
    {"url": "https://www.cnn.com/politics", "title": "Election results politics"},
    {"url": "https://www.cnn.com/world", "title": "World news headlines"},
    {"url": "https://www.bbc.com/news", "title": "Breaking news headlines"},
    {"url": "https://www.bbc.com/weather", "title": "Weather forecast news"},
    {"url": "https://docs.python.org/tutorial", "title": "Python tutorial classes"},
    {"url": "https://realpython.com/functions", "title": "Python functions tutorial"},
    {"url": "https://doc.rust-lang.org/book", "title": "Rust programming book"}
]"#;

const CATEGORIES: &str = r#"{
    "amazon.com": "Shopping",
    "ebay.com": "Shopping",
    "cnn.com": "News",
    "bbc.com": "News",
    "docs.python.org": "Learning",
    "realpython.com": "Learning",
    "doc.rust-lang.org": "Learning"
}"#;

fn setup(dir: &Path) -> Config {
    let config = Config {
        paths: PathsConfig {
            data_dir: dir.join("data"),
            models_dir: dir.join("models"),
            category_map: dir.join("domain_category_map.json"),
        },
        base_dir: dir.to_path_buf(),
        ..Config::default()
    };

    fs::create_dir_all(&config.paths.data_dir).expect("should create data dir");
    fs::write(config.visits_path(), VISITS).expect("should write visits");
    fs::write(config.category_map_path(), CATEGORIES).expect("should write categories");
    config
}

async fn post(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    let response = app.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    (
        status,
        serde_json::from_slice(&bytes).expect("body should be JSON"),
    )
}

#[test]
fn reloaded_model_reproduces_held_out_predictions() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = setup(temp_dir.path());

    let outcome = train_intent_classifier(&config).expect("training should succeed");
    assert_eq!(outcome.test_texts.len(), 3);
    assert_eq!(outcome.report.support, 3);

    let reloaded = TextClassifier::load(&config.intent_model_path()).expect("model should load");
    let reproduced: Vec<String> = outcome
        .test_texts
        .iter()
        .map(|text| reloaded.predict(text).to_string())
        .collect();
    assert_eq!(reproduced, outcome.test_predictions);
}

#[test]
fn retraining_overwrites_artifact() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = setup(temp_dir.path());

    let first = train_intent_classifier(&config).expect("training should succeed");
    let second = train_intent_classifier(&config).expect("retraining should succeed");
    assert_eq!(first.classifier, second.classifier);

    let reloaded = TextClassifier::load(&config.intent_model_path()).expect("model should load");
    assert_eq!(reloaded, second.classifier);
}

#[tokio::test]
async fn service_serves_trained_models() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = setup(temp_dir.path());

    let outcome = train_intent_classifier(&config).expect("training should succeed");
    train_topic_model(&config).expect("topic training should succeed");

    let context = ServiceContext::load(&config);
    let models = context.models();
    assert!(models.intent);
    assert!(models.topics);
    assert!(!models.website);

    let app = router(Arc::new(context));

    let url = "https://www.cnn.com/live";
    let title = "Live election coverage";
    let expected = outcome.classifier.predict(&intent_text(title, url)).to_string();
    let (status, body) = post(
        app.clone(),
        "/predict",
        &format!(r#"{{"title": "{title}", "url": "{url}"}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intent"], expected.as_str());

    let (status, body) = post(
        app.clone(),
        "/analyze_topics",
        r#"{"title": "Python tutorial", "url": "https://realpython.com/classes"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let topics = body["topics"].as_object().expect("topics should be an object");
    assert!(topics.keys().all(|name| name.starts_with("Topic")));
    assert!(
        topics
            .values()
            .all(|p| p.as_f64().is_some_and(|p| (0.1..=1.0).contains(&p)))
    );

    let (status, body) = post(app, "/classify", r#"{"url": "https://example.com"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Website model not loaded");
}
