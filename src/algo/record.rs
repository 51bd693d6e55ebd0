use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Topic labels attached to a record.
///
/// Upstream feeds deliver labels as a bare string, a list of strings, or not at
/// all. They are resolved into this type once, at deserialization, so nothing
/// downstream has to care which shape arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Labels {
    #[default]
    Empty,
    Single(String),
    Many(Vec<String>),
}

impl Labels {
    /// Each label in input order. Duplicates are preserved.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Labels::Empty => &[],
            Labels::Single(s) => std::slice::from_ref(s),
            Labels::Many(v) => v,
        };
        slice.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Labels::Empty)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Labels joined with single spaces, as fed to the feature composer.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    /// Sorted, de-duplicated label set.
    pub fn sorted_set(&self) -> Vec<&str> {
        let mut set: Vec<&str> = self.iter().collect();
        set.sort_unstable();
        set.dedup();
        set
    }
}

impl From<&str> for Labels {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            Labels::Empty
        } else {
            Labels::Single(s.to_string())
        }
    }
}

impl From<String> for Labels {
    fn from(s: String) -> Self {
        Labels::from(s.as_str())
    }
}

impl From<Vec<String>> for Labels {
    fn from(v: Vec<String>) -> Self {
        let kept: Vec<String> = v
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if kept.is_empty() {
            Labels::Empty
        } else {
            Labels::Many(kept)
        }
    }
}

impl From<Vec<&str>> for Labels {
    fn from(v: Vec<&str>) -> Self {
        Labels::from(v.into_iter().map(String::from).collect::<Vec<_>>())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelsRepr {
    One(String),
    Many(Vec<LabelEntry>),
    Other(IgnoredAny),
}

/// Non-string list entries are skipped rather than rejected.
#[derive(Deserialize)]
#[serde(untagged)]
enum LabelEntry {
    Text(String),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for Labels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<LabelsRepr>::deserialize(deserializer)? {
            Some(LabelsRepr::One(s)) => Labels::from(s),
            Some(LabelsRepr::Many(entries)) => Labels::from(
                entries
                    .into_iter()
                    .filter_map(|e| match e {
                        LabelEntry::Text(s) => Some(s),
                        LabelEntry::Other(_) => None,
                    })
                    .collect::<Vec<_>>(),
            ),
            None | Some(LabelsRepr::Other(_)) => Labels::Empty,
        })
    }
}

impl Serialize for Labels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Labels::Empty => serializer.serialize_none(),
            Labels::Single(s) => serializer.serialize_str(s),
            Labels::Many(v) => v.serialize(serializer),
        }
    }
}

/// One input news item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordRepr")]
pub struct Record {
    pub title: String,
    pub description: String,
    pub labels: Labels,
}

impl Record {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            labels: Labels::Empty,
        }
    }

    pub fn with_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.labels = labels.into();
        self
    }

    /// Build a record from raw feed fields.
    ///
    /// `labels` is used when it holds at least one label, otherwise
    /// `categories`. Every input boundary goes through here.
    pub fn from_fields(
        title: impl Into<String>,
        description: impl Into<String>,
        labels: Labels,
        categories: Labels,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            labels: if labels.is_empty() { categories } else { labels },
        }
    }
}

#[derive(Deserialize)]
struct RecordRepr {
    #[serde(default, deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    description: String,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    categories: Labels,
}

impl From<RecordRepr> for Record {
    fn from(r: RecordRepr) -> Self {
        Record::from_fields(r.title, r.description, r.labels, r.categories)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
