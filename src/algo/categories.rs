use serde::{Deserialize, Serialize};

/// Category substrings dropped from the final digest by default.
pub const DEFAULT_EXCLUDED: &[&str] = &["sport", "lottery", "music"];

/// One record after the external categorization step.
///
/// `category` falls back to `determined_category` when it is missing, null or
/// blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategorizedRepr")]
pub struct CategorizedItem {
    pub category: String,
    pub title: String,
    pub summary: String,
}

impl CategorizedItem {
    pub fn from_fields(
        category: Option<String>,
        determined_category: Option<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        let category = category
            .filter(|c| !c.trim().is_empty())
            .or(determined_category)
            .unwrap_or_default();
        Self {
            category,
            title: title.into(),
            summary: summary.into(),
        }
    }
}

#[derive(Deserialize)]
struct CategorizedRepr {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    determined_category: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "description")]
    summary: Option<String>,
}

impl From<CategorizedRepr> for CategorizedItem {
    fn from(r: CategorizedRepr) -> Self {
        CategorizedItem::from_fields(
            r.category,
            r.determined_category,
            r.title.unwrap_or_default(),
            r.summary.unwrap_or_default(),
        )
    }
}

/// True when `category` contains any of `excluded`, ignoring case.
pub fn is_excluded<S: AsRef<str>>(category: &str, excluded: &[S]) -> bool {
    let category = category.to_lowercase();
    excluded
        .iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .any(|e| !e.is_empty() && category.contains(&e))
}

/// Drop every item whose category matches one of the excluded substrings.
///
/// `category_of` picks the [`CategorizedItem`] out of the caller's row type,
/// so rows carrying extra fields survive the filter unchanged.
pub fn exclude_categories<T, S: AsRef<str>>(
    items: Vec<T>,
    excluded: &[S],
    category_of: impl Fn(&T) -> &CategorizedItem,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| !is_excluded(&category_of(item).category, excluded))
        .collect()
}
