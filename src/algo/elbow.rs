//! Automatic cluster-count selection.
//!
//! Fits k-means for every candidate `k` and picks the count one step past the
//! largest single drop in inertia. The offset ([`ELBOW_OFFSET`]) is a
//! heuristic: it leans toward slightly more clusters than the raw elbow
//! index so that broad news days are not under-split.

use std::ops::RangeInclusive;

use rayon::prelude::*;
use tracing::debug;

use crate::algo::kmeans::{kmeans, KMeansParams};
use crate::algo::tfidf::FeatureMatrix;
use crate::error::{ClusterError, Result};

/// Smallest count the selector ever returns.
pub const MIN_AUTO_K: usize = 2;

/// Added to the index of the largest inertia decrease (indices start at k=2).
pub const ELBOW_OFFSET: usize = 3;

/// Candidate counts `2..=min(max_k, n / 2)`, or [`ClusterError::InsufficientData`]
/// when fewer than two candidates exist.
pub fn candidate_range(n: usize, max_k: usize) -> Result<RangeInclusive<usize>> {
    let upper = max_k.min(n / 2);
    if upper < MIN_AUTO_K + 1 {
        return Err(ClusterError::InsufficientData {
            needed: 2 * (MIN_AUTO_K + 1),
            found: n,
        });
    }
    Ok(MIN_AUTO_K..=upper)
}

/// Inertia for each `k` in `range`, every trial using the same seed.
pub fn inertia_curve(
    matrix: &FeatureMatrix,
    range: RangeInclusive<usize>,
    params: &KMeansParams,
) -> Vec<f64> {
    range
        .into_par_iter()
        .map(|k| kmeans(matrix, k, params).inertia)
        .collect()
}

/// Pick `k` from an inertia curve that starts at `k = 2`, clamped to `upper`.
pub fn elbow_from_inertias(inertias: &[f64], upper: usize) -> usize {
    if inertias.len() < 2 {
        return MIN_AUTO_K;
    }
    let mut best = 0;
    let mut best_drop = f64::NEG_INFINITY;
    for (i, w) in inertias.windows(2).enumerate() {
        let drop = w[0] - w[1];
        if drop > best_drop {
            best_drop = drop;
            best = i;
        }
    }
    (best + ELBOW_OFFSET).min(upper)
}

/// Estimate a cluster count for `matrix`, never more than `max_k`.
pub fn select_k(matrix: &FeatureMatrix, max_k: usize, params: &KMeansParams) -> usize {
    let range = match candidate_range(matrix.n_rows(), max_k) {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "too few records for elbow search, using k={MIN_AUTO_K}");
            return MIN_AUTO_K;
        }
    };
    let upper = *range.end();
    let inertias = inertia_curve(matrix, range, params);
    let k = elbow_from_inertias(&inertias, upper);
    debug!(?inertias, k, "elbow search finished");
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::tfidf::SparseVector;

    fn matrix(n: usize) -> FeatureMatrix {
        let rows = (0..n)
            .map(|i| SparseVector {
                indices: vec![i % 4],
                values: vec![1.0],
            })
            .collect();
        FeatureMatrix::from_rows(rows, (0..4).map(|i| format!("t{i}")).collect())
    }

    #[test]
    fn fewer_than_four_records_gives_two() {
        for n in 0..4 {
            assert_eq!(select_k(&matrix(n), 10, &KMeansParams::default()), 2);
        }
    }

    #[test]
    fn single_candidate_gives_two() {
        // n=5 → upper = 2, only k=2 is evaluable
        assert_eq!(select_k(&matrix(5), 10, &KMeansParams::default()), 2);
        assert!(matches!(
            candidate_range(5, 10),
            Err(ClusterError::InsufficientData { found: 5, .. })
        ));
    }

    #[test]
    fn small_max_k_gives_two() {
        assert_eq!(select_k(&matrix(40), 2, &KMeansParams::default()), 2);
    }

    #[test]
    fn elbow_offset_applied() {
        assert_eq!(elbow_from_inertias(&[10.0, 4.0, 3.0, 2.5], 10), 3);
        assert_eq!(elbow_from_inertias(&[10.0, 9.0, 2.0, 1.5], 10), 4);
    }

    #[test]
    fn elbow_clamped_to_upper() {
        assert_eq!(elbow_from_inertias(&[10.0, 9.0, 8.0, 1.0], 5), 5);
        assert_eq!(elbow_from_inertias(&[10.0, 9.0, 8.0, 1.0], 4), 4);
    }

    #[test]
    fn first_maximal_drop_wins() {
        assert_eq!(elbow_from_inertias(&[10.0, 7.0, 4.0, 3.0], 10), 3);
    }

    #[test]
    fn result_within_bounds_and_stable() {
        let m = matrix(24);
        let p = KMeansParams::default();
        let k = select_k(&m, 10, &p);
        assert!((2..=10).contains(&k));
        assert_eq!(k, select_k(&m, 10, &p));
    }
}
