use crate::algo::normalize::normalize;
use crate::algo::record::Record;

/// Which record fields feed the feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    /// `title title description labels×weight`
    TextAndLabels,
    /// `title title description`
    TextOnly,
}

impl ComposeMode {
    pub fn from_use_labels(use_labels: bool) -> Self {
        if use_labels {
            Self::TextAndLabels
        } else {
            Self::TextOnly
        }
    }
}

/// Build the weighted, normalized text used as clustering input.
///
/// The title is always doubled. In [`ComposeMode::TextAndLabels`] the joined
/// labels are repeated `label_weight` times (a weight of 0 is treated as 1).
pub fn compose(record: &Record, mode: ComposeMode, label_weight: usize) -> String {
    let title = record.title.as_str();
    let mut combined = format!("{title} {title} {}", record.description);

    if mode == ComposeMode::TextAndLabels && !record.labels.is_empty() {
        let label_text = record.labels.joined();
        for _ in 0..label_weight.max(1) {
            combined.push(' ');
            combined.push_str(&label_text);
        }
    }

    normalize(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new("Oil Prices Rise", "Brent up 3%.").with_labels(vec!["Energy", "Markets"])
    }

    #[test]
    fn text_only_doubles_title() {
        assert_eq!(
            compose(&record(), ComposeMode::TextOnly, 3),
            "oil prices rise oil prices rise brent up 3"
        );
    }

    #[test]
    fn labels_repeated_by_weight() {
        assert_eq!(
            compose(&record(), ComposeMode::TextAndLabels, 2),
            "oil prices rise oil prices rise brent up 3 energy markets energy markets"
        );
        assert_eq!(
            compose(&record(), ComposeMode::TextAndLabels, 1),
            "oil prices rise oil prices rise brent up 3 energy markets"
        );
    }

    #[test]
    fn single_string_label() {
        let r = Record::new("A", "x").with_labels("tech");
        assert_eq!(compose(&r, ComposeMode::TextAndLabels, 3), "a a x tech tech tech");
    }

    #[test]
    fn no_labels_matches_text_only() {
        let r = Record::new("Title", "Body");
        assert_eq!(
            compose(&r, ComposeMode::TextAndLabels, 2),
            compose(&r, ComposeMode::TextOnly, 2)
        );
    }

    #[test]
    fn empty_record_composes_to_empty() {
        assert_eq!(compose(&Record::default(), ComposeMode::TextOnly, 2), "");
    }
}
