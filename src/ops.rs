//! Shared operation wrappers for all interfaces (CLI, plugin).
//!
//! Each `op_*` function is a pure, synchronous wrapper around one or more
//! `algo` modules. Input and output are `serde_json::Value`, with no
//! dependency on clap or nu-plugin.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::algo::categories::{exclude_categories, CategorizedItem};
use crate::algo::ingest;
use crate::algo::normalize::normalize;
use crate::algo::pipeline::{cluster_articles, cluster_by_labels, Clustering};
use crate::algo::record::Record;
use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Read one JSON row as a [`Record`]. A bare string is taken as the title.
pub fn record_from_json(row: &Value) -> Result<Record> {
    match row {
        Value::String(title) => Ok(Record::new(title.as_str(), "")),
        other => {
            Record::deserialize(other).map_err(|e| ClusterError::invalid_input(e.to_string()))
        }
    }
}

pub fn records_from_json(rows: &[Value]) -> Result<Vec<Record>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            record_from_json(row)
                .map_err(|e| ClusterError::invalid_input(format!("row {i}: {e}")))
        })
        .collect()
}

/// Read one JSON row as a [`CategorizedItem`]. A bare string is taken as the title.
pub fn categorized_from_json(row: &Value) -> Result<CategorizedItem> {
    match row {
        Value::String(title) => Ok(CategorizedItem::from_fields(None, None, title.as_str(), "")),
        other => CategorizedItem::deserialize(other)
            .map_err(|e| ClusterError::invalid_input(e.to_string())),
    }
}

fn clustering_to_json(c: &Clustering, top_n: usize) -> Value {
    let clusters: Vec<Value> = c
        .groups
        .iter()
        .map(|g| {
            json!({
                "name": g.name,
                "size": g.len(),
                "members": g.members,
                "top_labels": c.top_labels(&g.name, top_n),
            })
        })
        .collect();
    json!({
        "num_clusters": c.groups.len(),
        "k": c.k,
        "algorithm": c.algorithm.as_str(),
        "fallback": c.fallback,
        "clusters": clusters,
    })
}

// ── Operations ───────────────────────────────────────────────────────────────

pub fn op_cluster(rows: &[Value], config: &ClusterConfig, top_n: usize) -> Result<Value> {
    let records = records_from_json(rows)?;
    let clustering = cluster_articles(&records, config)?;
    Ok(clustering_to_json(&clustering, top_n))
}

/// Clustering rendered as the plain-text report.
pub fn op_cluster_report(rows: &[Value], config: &ClusterConfig) -> Result<String> {
    let records = records_from_json(rows)?;
    Ok(cluster_articles(&records, config)?.report())
}

pub fn op_top_labels(
    rows: &[Value],
    config: &ClusterConfig,
    cluster: &str,
    n: usize,
) -> Result<Value> {
    let records = records_from_json(rows)?;
    let clustering = cluster_articles(&records, config)?;
    Ok(json!({
        "cluster": cluster,
        "labels": clustering.top_labels(cluster, n),
    }))
}

pub fn op_group_labels(rows: &[Value]) -> Result<Value> {
    let records = records_from_json(rows)?;
    let groups: Vec<Value> = cluster_by_labels(&records)
        .into_iter()
        .map(|g| json!({"name": g.name, "size": g.len(), "members": g.members}))
        .collect();
    Ok(Value::Array(groups))
}

/// Drop duplicate titles and too-short rows, keeping the original JSON rows.
pub fn op_prepare(rows: &[Value], min_text_len: usize) -> Result<Value> {
    let records = records_from_json(rows)?;
    let kept: Vec<Value> = ingest::prepare(&records, min_text_len)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect();
    Ok(Value::Array(kept))
}

/// Drop rows whose category matches an excluded substring, keeping the original JSON rows.
pub fn op_exclude_categories<S: AsRef<str>>(rows: &[Value], excluded: &[S]) -> Result<Value> {
    let items = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            categorized_from_json(row)
                .map(|item| (item, row))
                .map_err(|e| ClusterError::invalid_input(format!("row {i}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    let kept: Vec<Value> = exclude_categories(items, excluded, |(item, _)| item)
        .into_iter()
        .map(|(_, row)| row.clone())
        .collect();
    Ok(Value::Array(kept))
}

pub fn op_normalize(text: &str) -> Value {
    json!({"original": text, "normalized": normalize(text)})
}
