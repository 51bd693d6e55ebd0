use std::collections::HashSet;

use tracing::debug;

use crate::algo::record::Record;

/// Shortest `"{title} {description}"` (in chars) worth clustering.
pub const DEFAULT_MIN_TEXT_LEN: usize = 20;

/// Indices, in input order, of the records worth clustering.
///
/// Keeps the first record per trimmed title and drops untitled records and
/// those whose `"{title} {description}"` is shorter than `min_text_len`
/// characters. Callers index back into their own rows so extra fields
/// survive. Language detection is left to the feed.
pub fn prepare(records: &[Record], min_text_len: usize) -> Vec<usize> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let title = record.title.trim();
        if title.is_empty() || seen.contains(title) {
            continue;
        }
        let combined_len = title.chars().count() + 1 + record.description.trim().chars().count();
        if combined_len < min_text_len {
            continue;
        }
        seen.insert(title);
        kept.push(i);
    }

    debug!(input = records.len(), kept = kept.len(), "records prepared");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_duplicates_blank_and_short() {
        let records = vec![
            Record::new("Markets rally on rate cut", "Stocks rise"),
            Record::new("  Markets rally on rate cut ", "Same story, other feed"),
            Record::new("", "No title but a long enough description"),
            Record::new("Short", "tiny"),
            Record::new("Storm hits coast", "Thousands without power"),
        ];
        assert_eq!(prepare(&records, DEFAULT_MIN_TEXT_LEN), vec![0, 4]);
    }

    #[test]
    fn short_record_does_not_block_later_duplicate() {
        let records = vec![
            Record::new("Quake", ""),
            Record::new("Quake", "Magnitude 6 tremor felt across the region"),
        ];
        assert_eq!(prepare(&records, DEFAULT_MIN_TEXT_LEN), vec![1]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let records = vec![Record::new("Été très chaud", "éclairs")];
        // 14 + 1 + 7 characters, but more bytes
        assert_eq!(prepare(&records, 22), vec![0]);
        assert!(prepare(&records, 23).is_empty());
    }

    #[test]
    fn zero_threshold_keeps_everything_titled() {
        let records = vec![Record::new("a", ""), Record::new("b", ""), Record::new(" ", "")];
        assert_eq!(prepare(&records, 0), vec![0, 1]);
    }
}
