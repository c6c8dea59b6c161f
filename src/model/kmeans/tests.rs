use super::*;

fn blobs() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 0.1],
        vec![0.1, 0.0],
        vec![0.05, 0.05],
        vec![5.0, 5.1],
        vec![5.1, 5.0],
        vec![4.95, 5.05],
    ]
}

#[test]
fn separates_two_blobs() {
    let clustering = KMeans::fit(&blobs(), 2, 42, DEFAULT_MAX_ITER).expect("fit should succeed");
    let labels = clustering.labels;

    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[1], labels[2]);
    assert_eq!(labels[3], labels[4]);
    assert_eq!(labels[4], labels[5]);
    assert_ne!(labels[0], labels[3]);
}

#[test]
fn predict_uses_nearest_centroid() {
    let clustering = KMeans::fit(&blobs(), 2, 42, DEFAULT_MAX_ITER).expect("fit should succeed");
    assert_eq!(
        clustering.model.predict(&[4.9, 4.9]),
        clustering.labels[3]
    );
    assert_eq!(clustering.model.centroids().len(), 2);
}

#[test]
fn one_cluster_per_row() {
    let rows = blobs();
    let clustering = KMeans::fit(&rows, rows.len(), 7, DEFAULT_MAX_ITER).expect("fit should succeed");
    let mut labels = clustering.labels.clone();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), rows.len());
}

#[test]
fn rejects_invalid_k() {
    assert!(KMeans::fit(&blobs(), 0, 42, DEFAULT_MAX_ITER).is_err());
    assert!(KMeans::fit(&blobs(), 7, 42, DEFAULT_MAX_ITER).is_err());
}
