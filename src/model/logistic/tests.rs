use super::*;
use crate::features::{TfidfConfig, TfidfVectorizer};

fn training_set() -> (TfidfVectorizer, Vec<FeatureVector>, Vec<String>) {
    let texts = [
        ("buy running shoes amazon.com", "shopping"),
        ("cheap laptop deals ebay.com", "shopping"),
        ("add to cart checkout amazon.com", "shopping"),
        ("breaking news election cnn.com", "news"),
        ("world news headlines bbc.com", "news"),
        ("election results news cnn.com", "news"),
        ("rust borrow checker tutorial github.com", "learning"),
        ("python tutorial for beginners realpython.com", "learning"),
    ];
    let documents: Vec<&str> = texts.iter().map(|(text, _)| *text).collect();
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &documents).expect("fit should succeed");
    let samples = documents
        .iter()
        .map(|text| vectorizer.transform(text))
        .collect();
    let labels = texts.iter().map(|(_, label)| (*label).to_string()).collect();
    (vectorizer, samples, labels)
}

#[test]
fn learns_training_labels() {
    let (vectorizer, samples, labels) = training_set();
    let model = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");

    assert_eq!(model.classes(), &["learning", "news", "shopping"]);
    assert_eq!(model.predict(&vectorizer.transform("amazon shoes")), "shopping");
    assert_eq!(model.predict(&vectorizer.transform("election news")), "news");
    assert_eq!(model.predict(&vectorizer.transform("python tutorial")), "learning");
}

#[test]
fn prediction_is_deterministic() {
    let (vectorizer, samples, labels) = training_set();
    let first = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");
    let second = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");
    assert_eq!(first, second);

    let sample = vectorizer.transform("cnn headlines");
    assert_eq!(first.predict(&sample), first.predict(&sample));
}

#[test]
fn probabilities_sum_to_one() {
    let (vectorizer, samples, labels) = training_set();
    let model = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");

    let probabilities = model.predict_proba(&vectorizer.transform("laptop deals"));
    assert_eq!(probabilities.len(), 3);
    assert!((probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn empty_vector_still_predicts() {
    let (vectorizer, samples, labels) = training_set();
    let model = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");

    let label = model.predict(&vectorizer.transform(""));
    assert!(model.classes().iter().any(|class| class == label));
}

#[test]
fn stronger_regularization_shrinks_weights() {
    let (_, samples, labels) = training_set();
    let loose = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");
    let tight = LogisticRegression::fit(
        &samples,
        &labels,
        LogisticConfig {
            c: 0.01,
            ..LogisticConfig::default()
        },
    )
    .expect("fit should succeed");

    let squared_norm = |model: &LogisticRegression| -> f64 {
        model.weights.iter().flatten().map(|w| w * w).sum()
    };
    assert_eq!(loose.weights.len(), 3);
    assert_eq!(loose.weights[0].len(), samples[0].dim());
    assert!(squared_norm(&tight) < squared_norm(&loose));
}

#[test]
fn single_class_predicts_that_class() {
    let samples = vec![FeatureVector::new(2, vec![(0, 1.0)])];
    let labels = vec!["Unknown".to_string()];
    let model = LogisticRegression::fit(&samples, &labels, LogisticConfig::default())
        .expect("fit should succeed");
    assert_eq!(model.predict(&FeatureVector::empty(2)), "Unknown");
}

#[test]
fn rejects_bad_input() {
    assert!(LogisticRegression::fit(&[], &[], LogisticConfig::default()).is_err());

    let samples = vec![FeatureVector::empty(1)];
    assert!(LogisticRegression::fit(&samples, &[], LogisticConfig::default()).is_err());
}
