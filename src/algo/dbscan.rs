use crate::algo::clustering::{condensed_index, cosine_distance_matrix, ClusterLabel};
use crate::algo::tfidf::FeatureMatrix;

/// Density grouping over cosine distance.
///
/// A row is a core point when at least `min_samples` rows (itself included)
/// lie within `eps`. Core points reachable through each other's
/// neighbourhoods share a cluster, numbered in order of discovery. Every
/// non-core row is noise; border rows are not attached to a neighbouring
/// cluster.
pub fn dbscan(matrix: &FeatureMatrix, eps: f64, min_samples: usize) -> Vec<ClusterLabel> {
    let n = matrix.n_rows();
    if n == 0 {
        return vec![];
    }
    let distances = cosine_distance_matrix(matrix.rows());
    let neighbours: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| {
                    i == j || {
                        let (a, b) = if i < j { (i, j) } else { (j, i) };
                        distances[condensed_index(a, b, n)] <= eps
                    }
                })
                .collect()
        })
        .collect();
    let core: Vec<bool> = neighbours.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut labels = vec![ClusterLabel::Noise; n];
    let mut visited = vec![false; n];
    let mut next_cluster = 0;

    for start in 0..n {
        if !core[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(p) = stack.pop() {
            labels[p] = ClusterLabel::Cluster(next_cluster);
            for &q in &neighbours[p] {
                if core[q] && !visited[q] {
                    visited[q] = true;
                    stack.push(q);
                }
            }
        }
        next_cluster += 1;
    }

    labels
}
