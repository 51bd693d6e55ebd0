//! Clustering configuration.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! wants to change. [`ClusterConfig::validate`] rejects values the engine
//! cannot honour instead of coercing them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algo::clustering::{Algorithm, Strategy};
use crate::algo::compose::ComposeMode;
use crate::algo::kmeans::KMeansParams;
use crate::algo::tfidf::VectorizerConfig;
use crate::error::{ClusterError, Result};

/// Fixed cluster count or automatic (elbow) selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ClusterCountRepr", into = "ClusterCountRepr")]
pub enum ClusterCount {
    #[default]
    Auto,
    Fixed(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ClusterCountRepr {
    Number(usize),
    Name(String),
}

impl TryFrom<ClusterCountRepr> for ClusterCount {
    type Error = ClusterError;

    fn try_from(r: ClusterCountRepr) -> Result<Self> {
        match r {
            ClusterCountRepr::Number(n) => Ok(ClusterCount::Fixed(n)),
            ClusterCountRepr::Name(s) => s.parse(),
        }
    }
}

impl From<ClusterCount> for ClusterCountRepr {
    fn from(c: ClusterCount) -> Self {
        match c {
            ClusterCount::Auto => ClusterCountRepr::Name("auto".into()),
            ClusterCount::Fixed(n) => ClusterCountRepr::Number(n),
        }
    }
}

impl FromStr for ClusterCount {
    type Err = ClusterError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ClusterCount::Auto);
        }
        s.parse::<usize>().map(ClusterCount::Fixed).map_err(|_| {
            ClusterError::configuration(format!(
                "cluster count must be 'auto' or a positive integer, got '{s}'"
            ))
        })
    }
}

impl fmt::Display for ClusterCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterCount::Auto => f.write_str("auto"),
            ClusterCount::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Options for one `cluster_articles` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterConfig {
    pub cluster_count: ClusterCount,
    pub algorithm: Algorithm,
    /// Include labels in the composed text.
    pub use_labels: bool,
    /// How many times the joined labels are repeated.
    pub label_weight: usize,
    pub max_vocab_size: usize,
    pub ngram_range: (usize, usize),
    pub min_doc_freq: usize,
    pub max_doc_freq_ratio: f64,
    /// Upper bound for automatic selection.
    pub max_auto_clusters: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Density neighbourhood radius in cosine distance.
    pub eps: f64,
    /// Records (self included) needed within `eps` to seed a dense group.
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let vectorizer = VectorizerConfig::default();
        let kmeans = KMeansParams::default();
        Self {
            cluster_count: ClusterCount::Auto,
            algorithm: Algorithm::Centroid,
            use_labels: false,
            label_weight: 2,
            max_vocab_size: vectorizer.max_features,
            ngram_range: vectorizer.ngram_range,
            min_doc_freq: vectorizer.min_df,
            max_doc_freq_ratio: vectorizer.max_df_ratio,
            max_auto_clusters: 10,
            seed: kmeans.seed,
            n_init: kmeans.n_init,
            max_iter: kmeans.max_iter,
            eps: 0.5,
            min_samples: 2,
        }
    }
}

impl ClusterConfig {
    /// Parse a JSON object; unspecified keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ClusterError::configuration(format!("invalid config: {e}")))
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value)
            .map_err(|e| ClusterError::configuration(format!("invalid config: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClusterError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if let ClusterCount::Fixed(0) = self.cluster_count {
            return Err(ClusterError::configuration("cluster_count must be at least 1"));
        }
        if self.label_weight == 0 {
            return Err(ClusterError::configuration("label_weight must be at least 1"));
        }
        if self.max_vocab_size == 0 {
            return Err(ClusterError::configuration("max_vocab_size must be at least 1"));
        }
        let (lo, hi) = self.ngram_range;
        if lo == 0 || lo > hi {
            return Err(ClusterError::configuration(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({lo}, {hi})"
            )));
        }
        if self.min_doc_freq == 0 {
            return Err(ClusterError::configuration("min_doc_freq must be at least 1"));
        }
        if !(self.max_doc_freq_ratio > 0.0 && self.max_doc_freq_ratio <= 1.0) {
            return Err(ClusterError::configuration(format!(
                "max_doc_freq_ratio must be in (0, 1], got {}",
                self.max_doc_freq_ratio
            )));
        }
        if self.n_init == 0 || self.max_iter == 0 {
            return Err(ClusterError::configuration("n_init and max_iter must be at least 1"));
        }
        if !(self.eps > 0.0) {
            return Err(ClusterError::configuration(format!(
                "eps must be positive, got {}",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(ClusterError::configuration("min_samples must be at least 1"));
        }
        Ok(())
    }

    pub fn compose_mode(&self) -> ComposeMode {
        ComposeMode::from_use_labels(self.use_labels)
    }

    pub fn vectorizer(&self) -> VectorizerConfig {
        VectorizerConfig {
            max_features: self.max_vocab_size,
            ngram_range: self.ngram_range,
            min_df: self.min_doc_freq,
            max_df_ratio: self.max_doc_freq_ratio,
        }
    }

    pub fn kmeans_params(&self) -> KMeansParams {
        KMeansParams {
            n_init: self.n_init,
            max_iter: self.max_iter,
            seed: self.seed,
            ..KMeansParams::default()
        }
    }

    /// Strategy for a resolved cluster count `k` (ignored by density).
    pub fn strategy(&self, k: usize) -> Strategy {
        match self.algorithm {
            Algorithm::Centroid => Strategy::Centroid {
                k,
                params: self.kmeans_params(),
            },
            Algorithm::Density => Strategy::Density {
                eps: self.eps,
                min_samples: self.min_samples,
            },
        }
    }
}
