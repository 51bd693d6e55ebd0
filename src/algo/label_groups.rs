use std::collections::HashMap;

use tracing::warn;

use crate::algo::aggregate::{sort_by_size, ClusterGroup};
use crate::algo::record::Record;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Group records by exact label-set equality, skipping text features.
///
/// Label order and duplicates do not matter. Records without labels share
/// the [`UNCATEGORIZED`] group. Returns nothing when no record is labelled.
pub fn group_by_labels(records: &[Record]) -> Vec<ClusterGroup> {
    if records.iter().all(|r| r.labels.is_empty()) {
        warn!(records = records.len(), "no labels found in records");
        return vec![];
    }

    let mut groups: Vec<ClusterGroup> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();

    for record in records {
        let set = record.labels.sorted_set();
        let name = if set.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            format!("Category: {}", set.join(", "))
        };
        let slot = *position.entry(name.clone()).or_insert_with(|| {
            groups.push(ClusterGroup::new(name));
            groups.len() - 1
        });
        groups[slot].members.push(record.title.clone());
    }

    sort_by_size(&mut groups);
    groups
}
