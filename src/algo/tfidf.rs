use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algo::tokenizer;
use crate::error::{ClusterError, Result};

/// Vocabulary and weighting parameters for [`vectorize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Keep at most this many terms (highest corpus frequency first).
    pub max_features: usize,
    /// Inclusive word n-gram orders.
    pub ngram_range: (usize, usize),
    /// Drop terms found in fewer documents than this.
    pub min_df: usize,
    /// Drop terms found in more than this fraction of documents.
    pub max_df_ratio: f64,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_range: (1, 2),
            min_df: 1,
            max_df_ratio: 0.8,
        }
    }
}

/// A sparse row: parallel column indices (ascending) and weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn norm_sq(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    /// Dot product of two sparse rows (merge over sorted indices).
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&c, v)| v * dense[c])
            .sum()
    }

    pub fn to_dense(&self, n_cols: usize) -> Vec<f64> {
        let mut dense = vec![0.0; n_cols];
        for (&c, &v) in self.indices.iter().zip(&self.values) {
            dense[c] = v;
        }
        dense
    }
}

/// TF-IDF features for one clustering invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix {
    rows: Vec<SparseVector>,
    /// column index -> term, alphabetical
    vocabulary: Vec<String>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<SparseVector>, vocabulary: Vec<String>) -> Self {
        Self { rows, vocabulary }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn rows(&self) -> &[SparseVector] {
        &self.rows
    }

    pub fn row(&self, i: usize) -> &SparseVector {
        &self.rows[i]
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Column of a term, if it survived pruning.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
    }
}

/// Build an L2-normalized TF-IDF matrix over word n-grams.
///
/// IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`. Fails with
/// [`ClusterError::EmptyVocabulary`] when no term survives tokenization and
/// the document-frequency bounds.
pub fn vectorize<S: AsRef<str> + Sync>(
    texts: &[S],
    config: &VectorizerConfig,
) -> Result<FeatureMatrix> {
    let n_docs = texts.len();
    if n_docs == 0 {
        return Err(ClusterError::empty_vocabulary("no documents"));
    }

    let doc_terms: Vec<HashMap<String, u32>> = texts
        .par_iter()
        .map(|t| {
            let mut counts: HashMap<String, u32> = HashMap::new();
            for term in tokenizer::terms(t.as_ref(), config.ngram_range) {
                *counts.entry(term).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    if doc_terms.iter().all(|d| d.is_empty()) {
        return Err(ClusterError::empty_vocabulary(
            "documents are empty or contain only stop words",
        ));
    }

    let max_doc_count = config.max_df_ratio * n_docs as f64;
    if max_doc_count < config.min_df as f64 {
        return Err(ClusterError::empty_vocabulary(format!(
            "max_doc_freq_ratio {} over {n_docs} documents admits fewer documents than min_doc_freq {}",
            config.max_df_ratio, config.min_df
        )));
    }

    // term -> (document frequency, corpus term count)
    let mut stats: HashMap<&str, (u32, u64)> = HashMap::new();
    for doc in &doc_terms {
        for (term, &count) in doc {
            let entry = stats.entry(term.as_str()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += count as u64;
        }
    }

    let mut kept: Vec<(&str, u32, u64)> = stats
        .into_iter()
        .filter(|(_, (df, _))| *df as usize >= config.min_df && *df as f64 <= max_doc_count)
        .map(|(t, (df, tf))| (t, df, tf))
        .collect();

    if kept.is_empty() {
        return Err(ClusterError::empty_vocabulary(
            "no terms remain after document-frequency pruning",
        ));
    }

    kept.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));
    kept.truncate(config.max_features);
    kept.sort_by(|a, b| a.0.cmp(b.0));

    let n = n_docs as f64;
    let idf: Vec<f64> = kept
        .iter()
        .map(|(_, df, _)| ((1.0 + n) / (1.0 + *df as f64)).ln() + 1.0)
        .collect();
    let column: HashMap<&str, usize> = kept
        .iter()
        .enumerate()
        .map(|(i, (t, _, _))| (*t, i))
        .collect();

    let rows: Vec<SparseVector> = doc_terms
        .iter()
        .map(|doc| {
            let mut entries: Vec<(usize, f64)> = doc
                .iter()
                .filter_map(|(term, &count)| {
                    column
                        .get(term.as_str())
                        .map(|&c| (c, count as f64 * idf[c]))
                })
                .collect();
            entries.sort_by_key(|(c, _)| *c);

            let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            let (indices, values) = entries
                .into_iter()
                .map(|(c, w)| (c, if norm > 0.0 { w / norm } else { w }))
                .unzip();
            SparseVector { indices, values }
        })
        .collect();

    let vocabulary = kept.into_iter().map(|(t, _, _)| t.to_string()).collect();
    Ok(FeatureMatrix { rows, vocabulary })
}
