use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algo::dbscan::dbscan;
use crate::algo::kmeans::{kmeans, KMeansParams};
use crate::algo::tfidf::{FeatureMatrix, SparseVector};
use crate::error::{ClusterError, Result};

/// Clustering strategy family, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Centroid partitioning (k-means). Every record lands in one of `k` groups.
    #[default]
    Centroid,
    /// Density grouping over cosine distance, with explicit noise.
    Density,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::Density => "density",
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["centroid", "density"]
    }
}

impl FromStr for Algorithm {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "centroid" | "kmeans" | "k-means" => Ok(Self::Centroid),
            "density" | "dbscan" => Ok(Self::Density),
            other => Err(ClusterError::configuration(format!(
                "unknown algorithm '{other}'. Use: {}",
                Self::all_names().join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = ClusterError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Algorithm> for String {
    fn from(a: Algorithm) -> Self {
        a.as_str().to_string()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster id for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterLabel {
    Cluster(usize),
    /// Density strategy could not place the record.
    Noise,
}

impl ClusterLabel {
    pub fn id(&self) -> Option<usize> {
        match self {
            Self::Cluster(id) => Some(*id),
            Self::Noise => None,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, Self::Noise)
    }
}

/// A fully parameterised clustering run.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Centroid { k: usize, params: KMeansParams },
    Density { eps: f64, min_samples: usize },
}

impl Strategy {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Centroid { .. } => Algorithm::Centroid,
            Self::Density { .. } => Algorithm::Density,
        }
    }
}

/// Assign every row of `matrix` a cluster label.
pub fn cluster(matrix: &FeatureMatrix, strategy: &Strategy) -> Result<Vec<ClusterLabel>> {
    match *strategy {
        Strategy::Centroid { k, ref params } => {
            if k == 0 {
                return Err(ClusterError::configuration("cluster count must be at least 1"));
            }
            let fit = kmeans(matrix, k, params);
            debug!(k = fit.k(), inertia = fit.inertia, n_iter = fit.n_iter, "k-means fitted");
            Ok(fit.labels.into_iter().map(ClusterLabel::Cluster).collect())
        }
        Strategy::Density { eps, min_samples } => {
            if !(eps > 0.0) {
                return Err(ClusterError::configuration(format!(
                    "eps must be positive, got {eps}"
                )));
            }
            if min_samples == 0 {
                return Err(ClusterError::configuration("min_samples must be at least 1"));
            }
            let labels = dbscan(matrix, eps, min_samples);
            debug!(
                noise = labels.iter().filter(|l| l.is_noise()).count(),
                "density grouping finished"
            );
            Ok(labels)
        }
    }
}

/// Compute cosine distance matrix (condensed form) from sparse TF-IDF rows.
///
/// A zero row has similarity 0 with everything, hence distance 1.
pub fn cosine_distance_matrix(vectors: &[SparseVector]) -> Vec<f64> {
    let n = vectors.len();
    if n < 2 {
        return vec![];
    }

    let norms: Vec<f64> = vectors.iter().map(|v| v.norm_sq().sqrt()).collect();

    (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let norms = &norms;
            ((i + 1)..n).map(move |j| {
                let sim = if norms[i] > 0.0 && norms[j] > 0.0 {
                    vectors[i].dot(&vectors[j]) / (norms[i] * norms[j])
                } else {
                    0.0
                };
                1.0 - sim
            })
        })
        .collect()
}

/// Index into a condensed distance matrix for pair (i, j) where i < j.
pub fn condensed_index(i: usize, j: usize, n: usize) -> usize {
    debug_assert!(i < j);
    i * n - i * (i + 1) / 2 + j - i - 1
}
