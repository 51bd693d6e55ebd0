//! Error taxonomy for the clustering engine.
//!
//! [`ClusterError::Configuration`] and [`ClusterError::InvalidInput`] reach
//! callers. The remaining variants are produced by individual components and
//! recovered by [`crate::algo::pipeline::cluster_articles`].

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Unknown algorithm name, non-positive weight, ratio out of range, ...
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An input row that cannot be read as a record.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Nothing left to vectorize after normalization and frequency filtering.
    #[error("empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Too few records to evaluate more than one candidate cluster count.
    #[error("insufficient data: need at least {needed} records, found {found}")]
    InsufficientData { needed: usize, found: usize },
}

impl ClusterError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        ClusterError::Configuration(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        ClusterError::InvalidInput(msg.into())
    }

    pub fn empty_vocabulary<S: Into<String>>(msg: S) -> Self {
        ClusterError::EmptyVocabulary(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
