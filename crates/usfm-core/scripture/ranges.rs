//! Merging of overlapping verse ranges

use super::verse_ref::{leading_number, VERSE_RANGE_SEPARATOR, VERSE_SEQUENCE_INDICATOR};

/// Merge two verse strings into one bridge or sequence
///
/// Verses are united and sorted; consecutive numbers join into a bridge and
/// gaps start a new sequence part.
///
/// # Example
///
/// ```rust
/// use usfm_core::scripture::merge_verse_ranges;
///
/// assert_eq!(merge_verse_ranges("1-2", "2-3"), "1-3");
/// assert_eq!(merge_verse_ranges("1", "5"), "1,5");
/// assert_eq!(merge_verse_ranges("1-2", "4,5"), "1-2,4-5");
/// ```
#[must_use]
pub fn merge_verse_ranges(verse1: &str, verse2: &str) -> String {
    let mut verses: Vec<(u32, String)> = Vec::new();
    for verse in verse_nums(verse1).into_iter().chain(verse_nums(verse2)) {
        if !verses.contains(&verse) {
            verses.push(verse);
        }
    }
    verses.sort_by_key(|(num, _)| *num);

    let mut merged = String::new();
    let mut start: Option<&(u32, String)> = None;
    let mut prev: Option<&(u32, String)> = None;
    for verse in &verses {
        match (start, prev) {
            (Some(first), Some(last)) if last.0.saturating_add(1) != verse.0 => {
                append_range(&mut merged, &first.1, &last.1);
                start = Some(verse);
            }
            (None, _) => start = Some(verse),
            _ => {}
        }
        prev = Some(verse);
    }
    if let (Some(first), Some(last)) = (start, prev) {
        append_range(&mut merged, &first.1, &last.1);
    }
    merged
}

/// Every verse number of a bridge or sequence, with its text
fn verse_nums(verse: &str) -> Vec<(u32, String)> {
    let mut nums = Vec::new();
    for part in verse.split(VERSE_SEQUENCE_INDICATOR) {
        let mut pieces = part.split(VERSE_RANGE_SEPARATOR);
        let start = pieces.next().unwrap_or_default();
        let start_num = leading_number(start);
        nums.push((start_num, start.to_string()));
        if let Some(end) = pieces.next() {
            let end_num = leading_number(end);
            for num in start_num.saturating_add(1)..end_num {
                nums.push((num, num.to_string()));
            }
            nums.push((end_num, end.to_string()));
        }
    }
    nums
}

/// Append `start` or `start-end`, separated from earlier parts
fn append_range(merged: &mut String, start: &str, end: &str) {
    if !merged.is_empty() {
        merged.push(VERSE_SEQUENCE_INDICATOR);
    }
    merged.push_str(start);
    if end != start {
        merged.push(VERSE_RANGE_SEPARATOR);
        merged.push_str(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_overlapping_bridges() {
        assert_eq!(merge_verse_ranges("1-2", "2-3"), "1-3");
        assert_eq!(merge_verse_ranges("2-3", "1-2"), "1-3");
        assert_eq!(merge_verse_ranges("1-5", "2-3"), "1-5");
    }

    #[test]
    fn gaps_become_sequences() {
        assert_eq!(merge_verse_ranges("1", "5"), "1,5");
        assert_eq!(merge_verse_ranges("1", "2"), "1-2");
        assert_eq!(merge_verse_ranges("1-2", "4-6"), "1-2,4-6");
    }

    #[test]
    fn keeps_segments_of_bridge_ends() {
        assert_eq!(merge_verse_ranges("1-2a", "3"), "1-3");
        assert_eq!(merge_verse_ranges("1-2a", "2a-3"), "1-3");
    }
}
