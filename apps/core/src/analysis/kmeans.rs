//! Seeded k-means over dense rows.
//!
//! k-means++ seeding, Lloyd iterations, several restarts keeping the lowest
//! inertia. The RNG is created per fit from the configured seed, so a fit is a
//! pure function of its input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ClusterError;

/// Relative centroid movement below which a run is considered converged.
const TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    n_init: usize,
    max_iter: usize,
    seed: u64,
}

/// Outcome of the best restart.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster index per input row
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
}

impl KMeans {
    pub fn new(k: usize, n_init: usize, max_iter: usize, seed: u64) -> Self {
        Self {
            k,
            n_init: n_init.max(1),
            max_iter: max_iter.max(1),
            seed,
        }
    }

    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit, ClusterError> {
        if self.k == 0 || data.len() < self.k {
            return Err(ClusterError::NotEnoughSamples {
                samples: data.len(),
                clusters: self.k,
            });
        }
        let dims = data[0].len();
        if dims == 0 {
            return Err(ClusterError::Degenerate("rows have no features".to_string()));
        }
        if data.iter().any(|row| row.len() != dims) {
            return Err(ClusterError::Degenerate("rows differ in length".to_string()));
        }
        if data.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ClusterError::Degenerate("non-finite feature value".to_string()));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for run in 0..self.n_init {
            let fit = self.single_run(data, &mut rng);
            debug!(run, inertia = fit.inertia, "k-means restart finished");
            let better = best.as_ref().map_or(true, |b| fit.inertia < b.inertia);
            if better {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| ClusterError::Degenerate("no k-means run completed".to_string()))
    }

    fn single_run(&self, data: &[Vec<f64>], rng: &mut StdRng) -> KMeansFit {
        let mut centroids = self.seed_centroids(data, rng);
        let mut labels = vec![0usize; data.len()];

        for _ in 0..self.max_iter {
            for (i, row) in data.iter().enumerate() {
                labels[i] = nearest(row, &centroids).0;
            }

            let updated = recompute_centroids(data, &labels, &centroids);
            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_distance(old, new))
                .sum();
            centroids = updated;

            if shift <= TOLERANCE * TOLERANCE {
                break;
            }
        }

        let mut inertia = 0.0;
        for (i, row) in data.iter().enumerate() {
            let (label, distance) = nearest(row, &centroids);
            labels[i] = label;
            inertia += distance;
        }

        KMeansFit {
            labels,
            centroids,
            inertia,
        }
    }

    /// k-means++: each new centre is drawn with probability proportional to
    /// its squared distance from the closest centre chosen so far.
    fn seed_centroids(&self, data: &[Vec<f64>], rng: &mut StdRng) -> Vec<Vec<f64>> {
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(data[rng.gen_range(0..data.len())].clone());

        while centroids.len() < self.k {
            let weights: Vec<f64> = data.iter().map(|row| nearest(row, &centroids).1).collect();
            let total: f64 = weights.iter().sum();

            let chosen = if total <= 0.0 {
                rng.gen_range(0..data.len())
            } else {
                let mut target = rng.gen::<f64>() * total;
                let mut idx = data.len() - 1;
                for (i, w) in weights.iter().enumerate() {
                    if target < *w {
                        idx = i;
                        break;
                    }
                    target -= w;
                }
                idx
            };
            centroids.push(data[chosen].clone());
        }

        centroids
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid and the squared distance to it. Lowest index wins ties.
fn nearest(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(row, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Mean of each cluster's members. An empty cluster keeps its previous centre.
fn recompute_centroids(data: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dims = previous.first().map_or(0, |c| c.len());
    let mut sums = vec![vec![0.0; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (row, &label) in data.iter().zip(labels) {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(row) {
            *s += v;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((sum, count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![0.05, 0.05],
            vec![5.0, 5.1],
            vec![5.1, 5.0],
            vec![5.05, 5.05],
        ]
    }

    #[test]
    fn test_separates_blobs() {
        let fit = KMeans::new(2, 10, 300, 42).fit(&two_blobs()).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[1], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[4], fit.labels[5]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert!(fit.inertia < 0.1);
    }

    #[test]
    fn test_same_seed_same_result() {
        let data = two_blobs();
        let a = KMeans::new(3, 5, 100, 7).fit(&data).unwrap();
        let b = KMeans::new(3, 5, 100, 7).fit(&data).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_identical_points_do_not_fail() {
        let data = vec![vec![1.0, 0.0]; 4];
        let fit = KMeans::new(2, 3, 50, 42).fit(&data).unwrap();
        assert_eq!(fit.labels.len(), 4);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_too_few_samples() {
        let err = KMeans::new(3, 1, 10, 42).fit(&[vec![1.0], vec![2.0]]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::NotEnoughSamples {
                samples: 2,
                clusters: 3
            }
        );
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = KMeans::new(2, 1, 10, 42)
            .fit(&[vec![1.0, 2.0], vec![1.0]])
            .unwrap_err();
        assert!(matches!(err, ClusterError::Degenerate(_)));
    }
}
