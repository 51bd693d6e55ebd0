use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algo::tfidf::{FeatureMatrix, SparseVector};

/// Restart and convergence settings for [`kmeans`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KMeansParams {
    /// Independent k-means++ seedings; the lowest-inertia run wins.
    pub n_init: usize,
    /// Lloyd iterations per run.
    pub max_iter: usize,
    /// Convergence threshold on total centroid shift, relative to the mean
    /// per-feature variance.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// Result of a k-means fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    /// Cluster index per row, each `< k`.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances of rows to their centroid.
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeansFit {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }
}

/// Lloyd's k-means over sparse rows with k-means++ seeding.
///
/// `k` is clamped to `1..=n_rows`. The RNG is seeded once from
/// `params.seed` and shared by all restarts, so identical input and params
/// always give the same partition.
pub fn kmeans(matrix: &FeatureMatrix, k: usize, params: &KMeansParams) -> KMeansFit {
    let n = matrix.n_rows();
    if n == 0 {
        return KMeansFit {
            labels: vec![],
            centroids: vec![],
            inertia: 0.0,
            n_iter: 0,
        };
    }
    let k = k.clamp(1, n);
    let rows = matrix.rows();
    let dims = matrix.n_cols();
    let row_norms: Vec<f64> = rows.iter().map(SparseVector::norm_sq).collect();
    let tol = params.tol * mean_variance(rows, dims);

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best: Option<KMeansFit> = None;

    for _ in 0..params.n_init.max(1) {
        let init = plus_plus_init(rows, &row_norms, dims, k, &mut rng);
        let fit = lloyd(rows, &row_norms, dims, init, params.max_iter, tol);
        if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
            best = Some(fit);
        }
    }

    // n_init >= 1 so at least one fit was produced
    best.unwrap_or_else(|| KMeansFit {
        labels: vec![0; n],
        centroids: vec![vec![0.0; dims]],
        inertia: 0.0,
        n_iter: 0,
    })
}

/// Squared Euclidean distance between a sparse row and a dense centroid.
fn sq_dist(row: &SparseVector, row_norm: f64, centroid: &[f64], centroid_norm: f64) -> f64 {
    (row_norm - 2.0 * row.dot_dense(centroid) + centroid_norm).max(0.0)
}

fn dense_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

fn mean_variance(rows: &[SparseVector], dims: usize) -> f64 {
    if dims == 0 || rows.is_empty() {
        return 0.0;
    }
    let n = rows.len() as f64;
    let mut sum = vec![0.0; dims];
    let mut sum_sq = vec![0.0; dims];
    for row in rows {
        for (&c, &v) in row.indices.iter().zip(&row.values) {
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }
    let total: f64 = sum
        .iter()
        .zip(&sum_sq)
        .map(|(s, sq)| sq / n - (s / n) * (s / n))
        .sum();
    total / dims as f64
}

fn plus_plus_init(
    rows: &[SparseVector],
    row_norms: &[f64],
    dims: usize,
    k: usize,
    rng: &mut StdRng,
) -> Vec<Vec<f64>> {
    let n = rows.len();
    let first = rng.random_range(0..n);
    let mut centroids = vec![rows[first].to_dense(dims)];
    let mut closest: Vec<f64> = (0..n)
        .map(|i| sq_dist(&rows[i], row_norms[i], &centroids[0], row_norms[first]))
        .collect();

    while centroids.len() < k {
        let total: f64 = closest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut pick = n - 1;
            for (i, d) in closest.iter().enumerate() {
                if target < *d {
                    pick = i;
                    break;
                }
                target -= d;
            }
            pick
        } else {
            rng.random_range(0..n)
        };
        let c = rows[next].to_dense(dims);
        for i in 0..n {
            let d = sq_dist(&rows[i], row_norms[i], &c, row_norms[next]);
            if d < closest[i] {
                closest[i] = d;
            }
        }
        centroids.push(c);
    }
    centroids
}

/// Nearest centroid per row (lowest index wins ties) and its squared distance.
fn assign(
    rows: &[SparseVector],
    row_norms: &[f64],
    centroids: &[Vec<f64>],
) -> Vec<(usize, f64)> {
    let centroid_norms: Vec<f64> = centroids.iter().map(|c| dense_norm(c)).collect();
    rows.par_iter()
        .zip(row_norms.par_iter())
        .map(|(row, &norm)| {
            let mut best = (0, f64::INFINITY);
            for (j, c) in centroids.iter().enumerate() {
                let d = sq_dist(row, norm, c, centroid_norms[j]);
                if d < best.1 {
                    best = (j, d);
                }
            }
            best
        })
        .collect()
}

fn lloyd(
    rows: &[SparseVector],
    row_norms: &[f64],
    dims: usize,
    mut centroids: Vec<Vec<f64>>,
    max_iter: usize,
    tol: f64,
) -> KMeansFit {
    let k = centroids.len();
    let mut labels: Vec<usize> = Vec::new();
    let mut n_iter = 0;

    for iter in 0..max_iter.max(1) {
        n_iter = iter + 1;
        let assigned = assign(rows, row_norms, &centroids);
        let mut new_labels: Vec<usize> = assigned.iter().map(|(l, _)| *l).collect();
        reseed_empty(&mut new_labels, &assigned, k);

        let updated = recompute(rows, &new_labels, k, dims, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>())
            .sum();
        centroids = updated;

        let stable = new_labels == labels;
        labels = new_labels;
        if stable || shift <= tol {
            break;
        }
    }

    // Final pass so labels and inertia agree with the returned centroids.
    let assigned = assign(rows, row_norms, &centroids);
    let mut final_labels: Vec<usize> = assigned.iter().map(|(l, _)| *l).collect();
    reseed_empty(&mut final_labels, &assigned, k);
    let inertia = inertia(rows, row_norms, &final_labels, &centroids);

    KMeansFit {
        labels: final_labels,
        centroids,
        inertia,
        n_iter,
    }
}

/// Move the farthest point of a multi-member cluster into each empty cluster.
fn reseed_empty(labels: &mut [usize], assigned: &[(usize, f64)], k: usize) {
    let mut counts = vec![0usize; k];
    for &l in labels.iter() {
        counts[l] += 1;
    }
    let mut taken = vec![false; labels.len()];
    for cluster in 0..k {
        if counts[cluster] > 0 {
            continue;
        }
        let farthest = (0..labels.len())
            .filter(|&i| !taken[i] && counts[labels[i]] > 1)
            .fold(None, |acc: Option<usize>, i| match acc {
                Some(b) if assigned[b].1 >= assigned[i].1 => Some(b),
                _ => Some(i),
            });
        if let Some(i) = farthest {
            counts[labels[i]] -= 1;
            labels[i] = cluster;
            counts[cluster] = 1;
            taken[i] = true;
        }
    }
}

fn recompute(
    rows: &[SparseVector],
    labels: &[usize],
    k: usize,
    dims: usize,
    previous: &[Vec<f64>],
) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0; dims]; k];
    let mut counts = vec![0usize; k];
    for (row, &l) in rows.iter().zip(labels) {
        counts[l] += 1;
        for (&c, &v) in row.indices.iter().zip(&row.values) {
            sums[l][c] += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .enumerate()
        .map(|(j, (sum, count))| {
            if count == 0 {
                previous[j].clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Sum of squared distances of each row to its assigned centroid.
pub fn inertia(
    rows: &[SparseVector],
    row_norms: &[f64],
    labels: &[usize],
    centroids: &[Vec<f64>],
) -> f64 {
    let centroid_norms: Vec<f64> = centroids.iter().map(|c| dense_norm(c)).collect();
    rows.iter()
        .zip(row_norms)
        .zip(labels)
        .map(|((row, &norm), &l)| sq_dist(row, norm, &centroids[l], centroid_norms[l]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(values: &[(usize, f64)]) -> SparseVector {
        SparseVector {
            indices: values.iter().map(|(c, _)| *c).collect(),
            values: values.iter().map(|(_, v)| *v).collect(),
        }
    }

    fn two_blobs() -> FeatureMatrix {
        let rows = vec![
            point(&[(0, 1.0)]),
            point(&[(0, 0.9), (1, 0.1)]),
            point(&[(0, 0.95), (1, 0.05)]),
            point(&[(2, 1.0)]),
            point(&[(2, 0.9), (1, 0.1)]),
        ];
        FeatureMatrix::from_rows(rows, vec!["a".into(), "b".into(), "c".into()])
    }

    #[test]
    fn separates_two_blobs() {
        let fit = kmeans(&two_blobs(), 2, &KMeansParams::default());
        assert_eq!(fit.labels.len(), 5);
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_ne!(fit.labels[0], fit.labels[3]);
    }

    #[test]
    fn same_seed_same_result() {
        let p = KMeansParams::default();
        let a = kmeans(&two_blobs(), 3, &p);
        let b = kmeans(&two_blobs(), 3, &p);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn k_clamped_to_rows() {
        let fit = kmeans(&two_blobs(), 50, &KMeansParams::default());
        assert_eq!(fit.k(), 5);
        assert!(fit.inertia.abs() < 1e-9);
    }

    #[test]
    fn inertia_decreases_with_k() {
        let p = KMeansParams::default();
        let k1 = kmeans(&two_blobs(), 1, &p).inertia;
        let k2 = kmeans(&two_blobs(), 2, &p).inertia;
        assert!(k2 < k1);
    }

    #[test]
    fn every_cluster_used_with_duplicate_points() {
        let rows = vec![point(&[(0, 1.0)]), point(&[(0, 1.0)]), point(&[(0, 1.0)])];
        let m = FeatureMatrix::from_rows(rows, vec!["a".into()]);
        let fit = kmeans(&m, 2, &KMeansParams::default());
        let mut used = fit.labels.clone();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1]);
    }

    #[test]
    fn empty_matrix() {
        let m = FeatureMatrix::from_rows(vec![], vec![]);
        let fit = kmeans(&m, 3, &KMeansParams::default());
        assert!(fit.labels.is_empty());
    }
}
