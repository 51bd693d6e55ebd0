use std::fmt::Write as _;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::algo::aggregate::{aggregate, ClusterGroup, ClusterStats};
use crate::algo::clustering::{cluster, Algorithm, ClusterLabel};
use crate::algo::compose::compose;
use crate::algo::elbow::select_k;
use crate::algo::label_groups::group_by_labels;
use crate::algo::record::Record;
use crate::algo::tfidf::vectorize;
use crate::config::{ClusterConfig, ClusterCount};
use crate::error::{ClusterError, Result};

/// Name of the single group used when nothing could be vectorized.
pub const FALLBACK_NAME: &str = "Cluster 1";

/// Default number of labels shown per group in reports.
pub const REPORT_TOP_LABELS: usize = 3;

/// Outcome of one text clustering run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Clustering {
    pub groups: Vec<ClusterGroup>,
    pub stats: ClusterStats,
    /// Cluster count handed to the centroid strategy (0 for density or empty input).
    pub k: usize,
    pub algorithm: Algorithm,
    /// Set when the vocabulary was empty and every record went to one group.
    pub fallback: bool,
}

impl Clustering {
    pub fn top_labels(&self, cluster_name: &str, n: usize) -> Vec<String> {
        self.stats.top_labels(cluster_name, n)
    }

    pub fn group(&self, cluster_name: &str) -> Option<&ClusterGroup> {
        self.groups.iter().find(|g| g.name == cluster_name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Plain-text listing of every group with its dominant labels.
    pub fn report(&self) -> String {
        if self.groups.is_empty() {
            return "No clusters found.\n".to_string();
        }
        let mut out = String::new();
        let _ = writeln!(out, "Found {} clusters:", self.groups.len());
        let _ = writeln!(out, "{}", "=".repeat(60));
        for group in &self.groups {
            let top = self.top_labels(&group.name, REPORT_TOP_LABELS);
            let labels = if top.is_empty() {
                String::new()
            } else {
                format!(" (Categories: {})", top.join(", "))
            };
            let _ = writeln!(out, "\n{} ({} articles){labels}:", group.name, group.len());
            let _ = writeln!(out, "{}", "-".repeat(40));
            for (i, title) in group.members.iter().enumerate() {
                let _ = writeln!(out, "{}. {title}", i + 1);
            }
        }
        out
    }
}

/// Cluster records by their composed text features.
///
/// Configuration problems are returned as errors. An empty vocabulary is not:
/// every record then lands in a single [`FALLBACK_NAME`] group.
pub fn cluster_articles(records: &[Record], config: &ClusterConfig) -> Result<Clustering> {
    config.validate()?;
    if records.is_empty() {
        return Ok(Clustering {
            algorithm: config.algorithm,
            ..Default::default()
        });
    }

    let mode = config.compose_mode();
    let texts: Vec<String> = records
        .par_iter()
        .map(|r| compose(r, mode, config.label_weight))
        .collect();

    let matrix = match vectorize(&texts, &config.vectorizer()) {
        Ok(m) => m,
        Err(ClusterError::EmptyVocabulary(reason)) => {
            warn!(%reason, records = records.len(), "empty vocabulary, using a single group");
            return Ok(single_group(records, config.algorithm));
        }
        Err(e) => return Err(e),
    };
    debug!(
        rows = matrix.n_rows(),
        terms = matrix.n_cols(),
        "feature matrix built"
    );

    let n = records.len();
    let k = match (config.algorithm, config.cluster_count) {
        (Algorithm::Density, _) => 0,
        (Algorithm::Centroid, ClusterCount::Fixed(k)) => k.min(n),
        (Algorithm::Centroid, ClusterCount::Auto) => {
            select_k(&matrix, config.max_auto_clusters, &config.kmeans_params()).min(n)
        }
    };

    let assignment = cluster(&matrix, &config.strategy(k))?;
    let (groups, stats) = aggregate(records, &assignment);
    debug!(groups = groups.len(), k, algorithm = %config.algorithm, "clustering finished");

    Ok(Clustering {
        groups,
        stats,
        k,
        algorithm: config.algorithm,
        fallback: false,
    })
}

/// Label-only grouping; see [`group_by_labels`].
pub fn cluster_by_labels(records: &[Record]) -> Vec<ClusterGroup> {
    group_by_labels(records)
}

fn single_group(records: &[Record], algorithm: Algorithm) -> Clustering {
    let group = ClusterGroup {
        name: FALLBACK_NAME.to_string(),
        members: records.iter().map(|r| r.title.clone()).collect(),
    };
    let assignment = vec![ClusterLabel::Cluster(0); records.len()];
    let (_, stats) = aggregate(records, &assignment);
    Clustering {
        groups: vec![group],
        stats,
        k: 1,
        algorithm,
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::aggregate::NOISE_NAME;

    fn scenario() -> Vec<Record> {
        vec![
            Record::new("A", "x").with_labels(vec!["tech"]),
            Record::new("B", "x").with_labels(vec!["tech"]),
            Record::new("C", "y").with_labels(vec!["sports"]),
        ]
    }

    fn headlines() -> Vec<Record> {
        vec![
            Record::new("Oil prices surge after OPEC cut", "Crude oil markets rally as OPEC trims output"),
            Record::new("OPEC output cut lifts crude oil", "Oil prices climb on supply worries"),
            Record::new("Brent crude oil hits yearly high", "Oil markets react to OPEC supply cut"),
            Record::new("Champions league final tickets", "Football fans queue for league final"),
            Record::new("League final football preview", "Football league champions meet in final"),
            Record::new("Football champions league draw", "League final draw for football clubs"),
            Record::new("New smartphone chip unveiled", "Chipmaker reveals faster smartphone processor"),
            Record::new("Smartphone processor benchmark", "Chip benchmark shows smartphone gains"),
        ]
    }

    fn titles(c: &Clustering) -> Vec<String> {
        let mut all: Vec<String> = c.groups.iter().flat_map(|g| g.members.clone()).collect();
        all.sort();
        all
    }

    #[test]
    fn shared_label_records_cluster_together() {
        let config = ClusterConfig {
            cluster_count: ClusterCount::Fixed(2),
            use_labels: true,
            label_weight: 2,
            ..Default::default()
        };
        let c = cluster_articles(&scenario(), &config).unwrap();
        assert_eq!(c.groups.len(), 2);
        assert_eq!(c.groups[0].members, vec!["A", "B"]);
        assert_eq!(c.groups[1].members, vec!["C"]);
        assert_eq!(titles(&c), vec!["A", "B", "C"]);
        assert_eq!(c.top_labels(&c.groups[0].name, 3), vec!["tech"]);
    }

    #[test]
    fn partitions_and_orders_by_size() {
        let config = ClusterConfig {
            cluster_count: ClusterCount::Fixed(3),
            ..Default::default()
        };
        let records = headlines();
        let c = cluster_articles(&records, &config).unwrap();
        let mut expected: Vec<String> = records.iter().map(|r| r.title.clone()).collect();
        expected.sort();
        assert_eq!(titles(&c), expected);
        for w in c.groups.windows(2) {
            assert!(w[0].len() >= w[1].len());
        }
    }

    #[test]
    fn deterministic_across_runs() {
        let config = ClusterConfig::default();
        let a = cluster_articles(&headlines(), &config).unwrap();
        let b = cluster_articles(&headlines(), &config).unwrap();
        assert_eq!(a.groups, b.groups);
        assert_eq!(a.k, b.k);
    }

    #[test]
    fn auto_with_few_records_uses_two() {
        let c = cluster_articles(&scenario(), &ClusterConfig {
            use_labels: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(c.k, 2);
    }

    #[test]
    fn fixed_count_clamped_to_records() {
        let config = ClusterConfig {
            cluster_count: ClusterCount::Fixed(10),
            use_labels: true,
            ..Default::default()
        };
        let c = cluster_articles(&scenario(), &config).unwrap();
        assert_eq!(c.k, 3);
        assert_eq!(c.groups.len(), 3);
    }

    #[test]
    fn empty_text_falls_back_to_single_group() {
        let records = vec![Record::new("", ""), Record::new("!!!", "..."), Record::new("the", "a")];
        let c = cluster_articles(&records, &ClusterConfig::default()).unwrap();
        assert!(c.fallback);
        assert_eq!(c.groups.len(), 1);
        assert_eq!(c.groups[0].name, FALLBACK_NAME);
        assert_eq!(c.groups[0].members.len(), 3);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        let c = cluster_articles(&[], &ClusterConfig::default()).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn configuration_errors_surface() {
        let config = ClusterConfig {
            label_weight: 0,
            ..Default::default()
        };
        assert!(matches!(
            cluster_articles(&scenario(), &config),
            Err(ClusterError::Configuration(_))
        ));
    }

    #[test]
    fn density_puts_outliers_in_miscellaneous() {
        let mut records = headlines();
        records.push(Record::new("Volcano erupts", "Lava flows near village"));
        let config = ClusterConfig {
            algorithm: Algorithm::Density,
            ..Default::default()
        };
        let c = cluster_articles(&records, &config).unwrap();
        let misc = c.group(NOISE_NAME).expect("noise group");
        assert!(misc.members.contains(&"Volcano erupts".to_string()));
        assert_eq!(titles(&c).len(), records.len());
    }

    #[test]
    fn label_only_path() {
        let groups = cluster_by_labels(&scenario());
        assert_eq!(groups[0].name, "Category: tech");
        assert_eq!(groups[1].name, "Category: sports");
    }

    #[test]
    fn report_lists_groups_and_labels() {
        let config = ClusterConfig {
            cluster_count: ClusterCount::Fixed(2),
            use_labels: true,
            ..Default::default()
        };
        let report = cluster_articles(&scenario(), &config).unwrap().report();
        assert!(report.starts_with("Found 2 clusters:"));
        assert!(report.contains("(2 articles) (Categories: tech):"));
        assert!(report.contains("1. A"));
    }
}
