use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::algo::clustering::ClusterLabel;
use crate::algo::record::Record;

/// Reserved name for records the density strategy left unassigned.
pub const NOISE_NAME: &str = "Miscellaneous";

/// A named group of record titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl ClusterGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Stable sort, largest group first. Equal sizes keep their current order.
pub fn sort_by_size(groups: &mut [ClusterGroup]) {
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
}

/// Label frequencies, remembering first-seen order for tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelCounts {
    entries: Vec<(String, usize)>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LabelCounts {
    pub fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), 1));
            }
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.index.get(label).map_or(0, |&i| self.entries[i].1)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `n` labels by descending count, first-seen order among equals.
    pub fn most_common(&self, n: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> =
            self.entries.iter().map(|(l, c)| (l.as_str(), *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

/// Per-cluster label frequencies for one clustering run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterStats {
    by_cluster: HashMap<String, LabelCounts>,
}

impl ClusterStats {
    pub fn counts(&self, cluster_name: &str) -> Option<&LabelCounts> {
        self.by_cluster.get(cluster_name)
    }

    /// The `n` most frequent labels in `cluster_name`; empty for unknown names.
    pub fn top_labels(&self, cluster_name: &str, n: usize) -> Vec<String> {
        self.by_cluster
            .get(cluster_name)
            .map(|c| {
                c.most_common(n)
                    .into_iter()
                    .map(|(l, _)| l.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_cluster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cluster.is_empty()
    }
}

/// Map cluster labels back onto record titles.
///
/// Numeric ids are renumbered `1..=N` in ascending id order and named
/// `"Cluster {n}"`; noise becomes [`NOISE_NAME`]. Groups are returned largest
/// first, ties in order of first appearance.
pub fn aggregate(records: &[Record], assignment: &[ClusterLabel]) -> (Vec<ClusterGroup>, ClusterStats) {
    let mut ids: Vec<usize> = assignment.iter().filter_map(ClusterLabel::id).collect();
    ids.sort_unstable();
    ids.dedup();
    let rank: HashMap<usize, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i + 1)).collect();

    let mut groups: Vec<ClusterGroup> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut stats = ClusterStats::default();

    for (record, label) in records.iter().zip(assignment) {
        let name = match label {
            ClusterLabel::Cluster(id) => format!("Cluster {}", rank[id]),
            ClusterLabel::Noise => NOISE_NAME.to_string(),
        };
        let slot = *position.entry(name.clone()).or_insert_with(|| {
            groups.push(ClusterGroup::new(name.clone()));
            groups.len() - 1
        });
        groups[slot].members.push(record.title.clone());

        let counts = stats.by_cluster.entry(name).or_default();
        for l in record.labels.iter() {
            counts.add(l);
        }
    }

    sort_by_size(&mut groups);
    (groups, stats)
}
