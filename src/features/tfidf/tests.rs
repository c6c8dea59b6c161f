use super::*;

fn corpus() -> Vec<&'static str> {
    vec![
        "cheap running shoes amazon.com",
        "running shoes sale ebay.com",
        "breaking news politics cnn.com",
        "world news today bbc.com",
    ]
}

#[test]
fn analyze_builds_unigrams_and_bigrams_without_stop_words() {
    let terms = analyze(&TfidfConfig::default(), "The best running shoes");
    assert_eq!(
        terms,
        vec!["best", "running", "shoes", "best running", "running shoes"]
    );
}

#[test]
fn vocabulary_is_alphabetical() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &corpus()).expect("fit should succeed");

    let amazon = vectorizer.term_index("amazon").expect("amazon is in vocabulary");
    let bbc = vectorizer.term_index("bbc").expect("bbc is in vocabulary");
    assert!(amazon < bbc);
    assert_eq!(vectorizer.term_index("amazon"), Some(0));
    assert!(vectorizer.term_index("running shoes").is_some());
    assert!(vectorizer.term_index("the").is_none());
}

#[test]
fn smoothed_idf() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &corpus()).expect("fit should succeed");

    // "news" appears in 2 of 4 documents
    let expected = (5.0_f64 / 3.0).ln() + 1.0;
    let idf = vectorizer.idf("news").expect("news is in vocabulary");
    assert!((idf - expected).abs() < 1e-12);

    // "amazon" appears once
    let rare = vectorizer.idf("amazon").expect("amazon is in vocabulary");
    assert!(rare > idf);
}

#[test]
fn transform_is_l2_normalized() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &corpus()).expect("fit should succeed");
    let vector = vectorizer.transform("running shoes for running");

    assert!(!vector.is_empty());
    assert!((vector.norm() - 1.0).abs() < 1e-9);
    assert_eq!(vector.dim(), vectorizer.dim());
}

#[test]
fn transform_empty_and_unknown_text() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &corpus()).expect("fit should succeed");

    let empty = vectorizer.transform("");
    assert!(empty.is_empty());
    assert_eq!(empty.dim(), vectorizer.dim());

    assert!(vectorizer.transform("zebra quantum").is_empty());
}

#[test]
fn transform_is_deterministic() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::default(), &corpus()).expect("fit should succeed");
    let first = vectorizer.transform("world news on amazon");
    let second = vectorizer.transform("world news on amazon");
    assert_eq!(first, second);
}

#[test]
fn transform_is_bit_identical_with_uneven_term_counts() {
    let document = (0..300)
        .flat_map(|i| std::iter::repeat_n(format!("term{i:03}"), i % 7 + 1))
        .join(" ");
    let config = TfidfConfig {
        ngram_range: (1, 1),
        ..TfidfConfig::default()
    };
    let vectorizer = TfidfVectorizer::fit(config, &[document.as_str(), "term000 filler"])
        .expect("fit should succeed");

    let first = vectorizer.transform(&document);
    assert_eq!(first.entries().len(), 300);
    for _ in 0..200 {
        let again = vectorizer.transform(&document);
        let same_bits = first
            .entries()
            .iter()
            .zip(again.entries())
            .all(|(a, b)| a.0 == b.0 && a.1.to_bits() == b.1.to_bits());
        assert!(same_bits, "repeated transforms should match bit for bit");
    }
}

#[test]
fn document_frequency_pruning() {
    let config = TfidfConfig {
        min_df: 2,
        max_df: 0.9,
        ..TfidfConfig::default()
    };
    let vectorizer = TfidfVectorizer::fit(config, &corpus()).expect("fit should succeed");

    assert!(vectorizer.term_index("news").is_some());
    assert!(vectorizer.term_index("running shoes").is_some());
    assert!(vectorizer.term_index("amazon").is_none());
}

#[test]
fn fit_fails_when_nothing_survives() {
    let only_stop_words = vec!["the and of", "is it a"];
    assert!(TfidfVectorizer::fit(TfidfConfig::default(), &only_stop_words).is_err());

    let config = TfidfConfig {
        min_df: 5,
        ..TfidfConfig::default()
    };
    assert!(TfidfVectorizer::fit(config, &corpus()).is_err());
}

#[test]
fn serde_roundtrip() {
    let vectorizer =
        TfidfVectorizer::fit(TfidfConfig::page_content(), &corpus()).expect("fit should succeed");
    let json = serde_json::to_string(&vectorizer).expect("vectorizer should serialize");
    let restored: TfidfVectorizer =
        serde_json::from_str(&json).expect("vectorizer should deserialize");
    assert_eq!(vectorizer, restored);
}
