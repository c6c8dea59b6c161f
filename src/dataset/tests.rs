use super::*;
use std::collections::HashSet;
use tempfile::TempDir;

fn categories() -> CategoryMap {
    [("amazon.com", "Shopping"), ("cnn.com", "News")]
        .into_iter()
        .map(|(domain, category)| (domain.to_string(), category.to_string()))
        .collect()
}

#[test]
fn visit_feature_texts() {
    let visit = Visit::new("https://www.amazon.com/cart", "Your Cart");
    assert_eq!(visit.intent_text(), "Your Cart amazon.com");
    assert_eq!(visit.topic_text(), "Your Cart https://www.amazon.com/cart");
    assert_eq!(intent_text("Home", "not a url"), "Home ");
}

#[test]
fn visits_with_missing_keys_default_to_empty() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("visits.json");
    fs::write(
        &path,
        r#"[
            {"url": "https://cnn.com", "title": "CNN", "timestamp": 1},
            {"url": "https://example.com"},
            {"title": "Untitled"}
        ]"#,
    )
    .expect("should write visits");

    let visits = load_visits(&path).expect("visits should load");
    assert_eq!(visits.len(), 3);
    assert_eq!(visits[1].title, "");
    assert_eq!(visits[2].url, "");
}

#[test]
fn missing_file_is_a_dataset_error() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let result = load_visits(&temp_dir.path().join("visits.json"));
    assert!(matches!(result, Err(IntentError::Dataset(_))));
}

#[test]
fn malformed_json_fails() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("labeled_data.json");
    fs::write(&path, "{not json").expect("should write file");
    assert!(load_labeled_sites(&path).is_err());
}

#[test]
fn intent_examples_label_unknown_domains() {
    let visits = vec![
        Visit::new("https://www.amazon.com/dp/1", "Shoes"),
        Visit::new("https://cnn.com/world", "World"),
        Visit::new("https://example.org", "Example"),
        Visit::new("garbage", "Broken"),
    ];

    let (texts, labels) = intent_examples(&visits, &categories());
    assert_eq!(texts[0], "Shoes amazon.com");
    assert_eq!(labels, vec!["Shopping", "News", UNKNOWN_LABEL, UNKNOWN_LABEL]);
}

#[test]
fn split_sizes_and_disjointness() {
    let items: Vec<usize> = (0..10).collect();
    let split = train_test_split(&items, 0.2, 42);

    assert_eq!(split.test.len(), 2);
    assert_eq!(split.train.len(), 8);

    let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
    assert_eq!(all.len(), 10);
}

#[test]
fn split_rounds_test_size_up() {
    let items: Vec<usize> = (0..7).collect();
    let split = train_test_split(&items, 0.2, 42);
    assert_eq!(split.test.len(), 2);
    assert_eq!(split.train.len(), 5);
}

#[test]
fn split_is_reproducible() {
    let items: Vec<usize> = (0..50).collect();
    assert_eq!(
        train_test_split(&items, 0.2, 42),
        train_test_split(&items, 0.2, 42)
    );
    assert_ne!(
        train_test_split(&items, 0.2, 42),
        train_test_split(&items, 0.2, 7)
    );
}

#[test]
fn split_keeps_a_training_item() {
    let split = train_test_split(&[1], 0.2, 42);
    assert_eq!(split.train, vec![1]);
    assert!(split.test.is_empty());

    let split = train_test_split::<u8>(&[], 0.2, 42);
    assert!(split.train.is_empty());
    assert!(split.test.is_empty());
}

#[test]
fn csv_rows_are_cleaned() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("website_classification.csv");
    fs::write(
        &path,
        "id,website_url,cleaned_website_text,Category\n\
         0,https://www.booking.com/index.html,hotels deals,Travel\n\
         1,github.com,code hosting,Computers and Technology\n\
         2,,no url,News\n\
         3,https://example.com,no category,\n",
    )
    .expect("should write csv");

    let sites = read_website_csv(&path).expect("csv should parse");
    assert_eq!(
        sites,
        vec![
            LabeledSite {
                url: "https://www.booking.com/index.html".to_string(),
                category: "Travel".to_string(),
            },
            LabeledSite {
                url: "https://www.github.com".to_string(),
                category: "Computers and Technology".to_string(),
            },
        ]
    );
}

#[test]
fn labeled_sites_write_then_load() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("data").join("labeled_data.json");
    let sites = vec![LabeledSite {
        url: "https://www.bbc.com".to_string(),
        category: "News".to_string(),
    }];

    write_labeled_sites(&path, &sites).expect("should write dataset");
    assert_eq!(load_labeled_sites(&path).expect("should load dataset"), sites);
}

#[test]
fn category_map_loads() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let path = temp_dir.path().join("domain_category_map.json");
    fs::write(&path, r#"{"amazon.com": "Shopping"}"#).expect("should write map");

    let map = load_category_map(&path).expect("map should load");
    assert_eq!(map.get("amazon.com").map(String::as_str), Some("Shopping"));
}
