use nu_plugin::EvaluatedCall;
use nu_protocol::{LabeledError, PipelineData, Record as NuRecord, Span, Value};

use crate::algo::aggregate::ClusterGroup;
use crate::algo::categories::CategorizedItem;
use crate::algo::record::{Labels, Record};
use crate::error::ClusterError;

/// Normalize any PipelineData into a Vec<Value> of rows.
///
/// Tables and lists pass through, a single value becomes a one-row list and
/// Nothing becomes empty. Non-record rows are kept as-is; [`to_record`] treats
/// a bare string as a title.
pub fn input_rows(input: PipelineData) -> Vec<Value> {
    match input {
        PipelineData::Value(Value::List { vals, .. }, _) => vals,
        PipelineData::Value(Value::Nothing { .. }, _) => vec![],
        PipelineData::Value(value, _) => vec![value],
        other => other.into_iter().collect(),
    }
}

/// Text of one column, "" when missing or not coercible.
fn text_field(row: &Value, field: &str) -> String {
    optional_text(row, field).unwrap_or_default()
}

fn optional_text(row: &Value, field: &str) -> Option<String> {
    row.get_data_by_key(field).and_then(|v| v.coerce_string().ok())
}

/// Labels of one column. Non-string list entries are skipped.
fn labels_field(row: &Value, field: &str) -> Labels {
    match row.get_data_by_key(field) {
        Some(Value::List { vals, .. }) => Labels::from(
            vals.iter()
                .filter_map(|v| v.as_str().ok().map(String::from))
                .collect::<Vec<_>>(),
        ),
        Some(Value::String { val, .. }) => Labels::from(val.as_str()),
        _ => Labels::Empty,
    }
}

/// Convert one nushell row into a [`Record`].
pub fn to_record(row: &Value) -> Record {
    if let Value::String { val, .. } = row {
        return Record::new(val.as_str(), "");
    }
    Record::from_fields(
        text_field(row, "title"),
        text_field(row, "description"),
        labels_field(row, "labels"),
        labels_field(row, "categories"),
    )
}

pub fn to_records(rows: &[Value]) -> Vec<Record> {
    rows.iter().map(to_record).collect()
}

/// Convert one nushell row into a [`CategorizedItem`].
pub fn to_categorized(row: &Value) -> CategorizedItem {
    if let Value::String { val, .. } = row {
        return CategorizedItem::from_fields(None, None, val.as_str(), "");
    }
    let summary = optional_text(row, "summary").or_else(|| optional_text(row, "description"));
    CategorizedItem::from_fields(
        optional_text(row, "category"),
        optional_text(row, "determined_category"),
        text_field(row, "title"),
        summary.unwrap_or_default(),
    )
}

pub fn strings(items: &[String], span: Span) -> Value {
    Value::list(items.iter().map(|s| Value::string(s, span)).collect(), span)
}

/// `{name, size, members}` for one group.
pub fn group_record(group: &ClusterGroup, span: Span) -> NuRecord {
    let mut r = NuRecord::new();
    r.push("name", Value::string(&group.name, span));
    r.push("size", Value::int(group.len() as i64, span));
    r.push("members", strings(&group.members, span));
    r
}

pub fn labeled(err: ClusterError, span: Span) -> LabeledError {
    let label = match &err {
        ClusterError::Configuration(_) => "invalid option",
        _ => "clustering failed",
    };
    LabeledError::new(err.to_string()).with_label(label, span)
}

fn non_negative(name: &str, n: i64, span: Span) -> Result<u64, LabeledError> {
    u64::try_from(n).map_err(|_| {
        LabeledError::new(format!("--{name} must not be negative"))
            .with_label("negative value", span)
    })
}

/// Read a non-negative integer flag.
pub fn u64_flag(call: &EvaluatedCall, name: &str) -> Result<Option<u64>, LabeledError> {
    call.get_flag::<i64>(name)?
        .map(|n| non_negative(name, n, call.head))
        .transpose()
}

pub fn usize_flag(call: &EvaluatedCall, name: &str) -> Result<Option<usize>, LabeledError> {
    Ok(u64_flag(call, name)?.map(|n| n as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: Vec<(&str, Value)>) -> Value {
        let span = Span::test_data();
        let mut r = NuRecord::new();
        for (k, v) in fields {
            r.push(k, v);
        }
        Value::record(r, span)
    }

    fn list(items: Vec<Value>) -> Value {
        Value::list(items, Span::test_data())
    }

    fn s(text: &str) -> Value {
        Value::string(text, Span::test_data())
    }

    #[test]
    fn null_labels_fall_back_to_categories() {
        let span = Span::test_data();
        let r = to_record(&row(vec![
            ("title", s("Chip output rises")),
            ("labels", Value::nothing(span)),
            ("categories", list(vec![s("tech")])),
        ]));
        assert_eq!(r.labels, Labels::from(vec!["tech"]));
    }

    #[test]
    fn labels_win_over_categories() {
        let r = to_record(&row(vec![
            ("title", s("Chip output rises")),
            ("labels", list(vec![s("chips")])),
            ("categories", list(vec![s("tech")])),
        ]));
        assert_eq!(r.labels, Labels::from(vec!["chips"]));
    }

    #[test]
    fn non_string_labels_are_skipped() {
        let span = Span::test_data();
        let r = to_record(&row(vec![
            ("title", s("Chip output rises")),
            ("labels", list(vec![s("tech"), Value::int(5, span)])),
        ]));
        assert_eq!(r.labels, Labels::from(vec!["tech"]));
    }

    #[test]
    fn bare_string_is_a_title() {
        let r = to_record(&s("Chip output rises"));
        assert_eq!(r.title, "Chip output rises");
        assert!(r.labels.is_empty());
    }

    #[test]
    fn blank_category_uses_determined_category() {
        let item = to_categorized(&row(vec![
            ("title", s("Cup final tonight")),
            ("category", s("  ")),
            ("determined_category", s("Sport")),
        ]));
        assert_eq!(item.category, "Sport");
    }

    #[test]
    fn negative_values_are_rejected() {
        let err = non_negative("seed", -1, Span::test_data()).unwrap_err();
        assert_eq!(err.msg, "--seed must not be negative");
        assert_eq!(non_negative("seed", 42, Span::test_data()).unwrap(), 42);
    }
}
