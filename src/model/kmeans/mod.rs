#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::{IntentError, Result};

pub const DEFAULT_MAX_ITER: usize = 300;

/// K-means clustering with k-means++ seeding
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    centroids: Vec<Vec<f64>>,
}

/// Fitted centroids plus the cluster of every input row
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub model: KMeans,
    pub labels: Vec<usize>,
}

impl KMeans {
    /// Cluster dense rows into `k` groups, iterating until assignments settle
    #[inline]
    pub fn fit(rows: &[Vec<f64>], k: usize, seed: u64, max_iter: usize) -> Result<Clustering> {
        if k == 0 || k > rows.len() {
            return Err(IntentError::Model(format!(
                "Cannot form {} clusters from {} rows",
                k,
                rows.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = seed_centroids(rows, k, &mut rng);
        let mut labels = vec![usize::MAX; rows.len()];

        for iteration in 0..max_iter.max(1) {
            let mut changed = false;
            for (row, label) in rows.iter().zip(labels.iter_mut()) {
                let closest = nearest(&centroids, row);
                if *label != closest {
                    *label = closest;
                    changed = true;
                }
            }

            if !changed {
                debug!("K-means converged after {} iterations", iteration);
                break;
            }

            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                let members: Vec<&Vec<f64>> = rows
                    .iter()
                    .zip(&labels)
                    .filter(|&(_, &label)| label == cluster)
                    .map(|(row, _)| row)
                    .collect();
                // An emptied cluster keeps its previous centroid
                if members.is_empty() {
                    continue;
                }
                for (index, value) in centroid.iter_mut().enumerate() {
                    *value = members.iter().map(|row| row[index]).sum::<f64>() / members.len() as f64;
                }
            }
        }

        Ok(Clustering {
            model: Self { centroids },
            labels,
        })
    }

    #[inline]
    pub fn predict(&self, row: &[f64]) -> usize {
        nearest(&self.centroids, row)
    }

    #[inline]
    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centroids: &[Vec<f64>], row: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (cluster, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(centroid, row);
        if distance < best_distance {
            best = cluster;
            best_distance = distance;
        }
    }
    best
}

fn seed_centroids(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = vec![rows[rng.gen_range(0..rows.len())].clone()];

    while centroids.len() < k {
        let distances: Vec<f64> = rows
            .iter()
            .map(|row| squared_distance(row, &centroids[nearest(&centroids, row)]))
            .collect();
        let total: f64 = distances.iter().sum();

        // Every row coincides with a centroid; fall back to the next row in order
        if total <= 0.0 {
            centroids.push(rows[centroids.len() % rows.len()].clone());
            continue;
        }

        let draw = rng.r#gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut chosen = rows.len() - 1;
        for (index, distance) in distances.iter().enumerate() {
            cumulative += distance;
            if draw < cumulative {
                chosen = index;
                break;
            }
        }
        centroids.push(rows[chosen].clone());
    }

    centroids
}
