//! Book, chapter and verse references
//!
//! The verse part is kept as written so bridges (`1-3`), sequences (`1,3`)
//! and segments (`7a`) survive. Numeric views are derived from it.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::scripture::VerseRef;
//!
//! let verse: VerseRef = "MAT 1:2-4".parse()?;
//! assert_eq!(verse.book(), "MAT");
//! assert_eq!(verse.verse_num(), 2);
//! assert!(verse.has_multiple());
//! let all: Vec<String> = verse.all_verses().iter().map(ToString::to_string).collect();
//! assert_eq!(all, ["MAT 1:2", "MAT 1:3", "MAT 1:4"]);
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

use super::canon::{book_id_to_number, book_number_to_id};
use super::versification::Versification;
use crate::utils::errors::{CoreError, Result};
use core::cmp::Ordering;
use core::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Separates the parts of a verse sequence (`1,3`)
pub const VERSE_SEQUENCE_INDICATOR: char = ',';

/// Separates the ends of a verse bridge (`1-3`)
pub const VERSE_RANGE_SEPARATOR: char = '-';

/// Result of validating a reference against a versification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerseRefValidStatus {
    /// Reference exists in the versification
    Valid,
    /// Chapter or verse beyond the last one
    OutOfRange,
    /// The same verse occurs twice in a bridge or sequence
    VerseRepeated,
    /// Verses of a bridge or sequence run backwards
    VerseOutOfOrder,
}

/// Reference to a verse, bridge or verse sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerseRef {
    /// 1-based book number, 0 when unset
    pub book_num: u16,
    /// Chapter number, 0 before the first chapter
    pub chapter_num: u32,
    /// Verse as written
    verse: String,
}

impl VerseRef {
    /// Create a reference
    #[must_use]
    pub fn new(book_num: u16, chapter_num: u32, verse: impl Into<String>) -> Self {
        Self {
            book_num,
            chapter_num,
            verse: verse.into(),
        }
    }

    /// Create a reference from a book id
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidReference`] for an unknown book id.
    pub fn from_book_id(book: &str, chapter_num: u32, verse: impl Into<String>) -> Result<Self> {
        let book_num = book_id_to_number(book);
        if book_num == 0 {
            return Err(CoreError::invalid_reference(book, "unknown book id"));
        }
        Ok(Self::new(book_num, chapter_num, verse))
    }

    /// Book id, empty when unset
    #[must_use]
    pub fn book(&self) -> &'static str {
        book_number_to_id(self.book_num)
    }

    /// Verse as written
    #[must_use]
    pub fn verse(&self) -> &str {
        &self.verse
    }

    /// First verse number
    #[must_use]
    pub fn verse_num(&self) -> u32 {
        leading_number(&self.verse)
    }

    /// Replace the verse text
    pub fn set_verse(&mut self, verse: impl Into<String>) {
        self.verse = verse.into();
    }

    /// Replace the verse with a plain number
    pub fn set_verse_num(&mut self, verse_num: u32) {
        self.verse = verse_num.to_string();
    }

    /// Set the chapter from its leading digits
    pub fn set_chapter(&mut self, chapter: &str) {
        self.chapter_num = leading_number(chapter);
    }

    /// Whether no book has been set
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.book_num == 0
    }

    /// Segment letters of a single verse (`a` in `7a`)
    #[must_use]
    pub fn segment(&self) -> Option<&str> {
        if self.has_multiple() {
            return None;
        }
        let digits = self.verse.len() - self.verse.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let segment = &self.verse[digits..];
        (!segment.is_empty()).then_some(segment)
    }

    /// Whether the verse is a bridge or a sequence
    #[must_use]
    pub fn has_multiple(&self) -> bool {
        self.verse.contains([VERSE_SEQUENCE_INDICATOR, VERSE_RANGE_SEPARATOR])
    }

    /// One reference per verse of a bridge or sequence
    ///
    /// Bridge ends keep their segments; verses inside a bridge are plain
    /// numbers.
    #[must_use]
    pub fn all_verses(&self) -> Vec<Self> {
        let mut verses = Vec::new();
        for part in self.verse.split(VERSE_SEQUENCE_INDICATOR) {
            let mut pieces = part.split(VERSE_RANGE_SEPARATOR);
            let start = pieces.next().unwrap_or_default();
            verses.push(self.with_verse(start));
            if let Some(end) = pieces.next() {
                let start_num = leading_number(start);
                let end_num = leading_number(end);
                for verse_num in start_num.saturating_add(1)..end_num {
                    verses.push(self.with_verse(verse_num.to_string()));
                }
                verses.push(self.with_verse(end));
            }
        }
        verses
    }

    /// Whether two verse strings share a verse
    ///
    /// Two single verses never overlap; equality is checked separately.
    ///
    /// ```rust
    /// use usfm_core::scripture::VerseRef;
    ///
    /// assert!(VerseRef::are_overlapping_verse_ranges("1-2", "2-3"));
    /// assert!(VerseRef::are_overlapping_verse_ranges("1,3-4", "4"));
    /// assert!(!VerseRef::are_overlapping_verse_ranges("1-2", "3"));
    /// assert!(!VerseRef::are_overlapping_verse_ranges("2", "2"));
    /// ```
    #[must_use]
    pub fn are_overlapping_verse_ranges(verse1: &str, verse2: &str) -> bool {
        verse1.split(VERSE_SEQUENCE_INDICATOR).any(|part1| {
            verse2
                .split(VERSE_SEQUENCE_INDICATOR)
                .any(|part2| parts_overlap(part1, part2))
        })
    }

    /// Whether two references in the same chapter share a verse
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.book_num == other.book_num
            && self.chapter_num == other.chapter_num
            && Self::are_overlapping_verse_ranges(&self.verse, &other.verse)
    }

    /// Order by book, chapter, then verse by verse
    ///
    /// Segments only break ties when `compare_segments` is set.
    #[must_use]
    pub fn compare(&self, other: &Self, compare_segments: bool) -> Ordering {
        let ordering = self
            .book_num
            .cmp(&other.book_num)
            .then(self.chapter_num.cmp(&other.chapter_num));
        if ordering != Ordering::Equal {
            return ordering;
        }
        let verses = self.all_verses();
        let other_verses = other.all_verses();
        for (verse, other_verse) in verses.iter().zip(&other_verses) {
            let ordering = verse.compare_single(other_verse, compare_segments);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        verses.len().cmp(&other_verses.len())
    }

    /// Check this reference against a versification
    #[must_use]
    pub fn valid_status(&self, versification: &dyn Versification) -> VerseRefValidStatus {
        if self.chapter_num == 0 || self.chapter_num > versification.last_chapter(self.book_num) {
            return VerseRefValidStatus::OutOfRange;
        }
        let last_verse = versification.last_verse(self.book_num, self.chapter_num);
        let mut previous: Option<Self> = None;
        for verse in self.all_verses() {
            if verse.verse_num() > last_verse {
                return VerseRefValidStatus::OutOfRange;
            }
            if let Some(previous) = &previous {
                match verse.compare_single(previous, true) {
                    Ordering::Equal => return VerseRefValidStatus::VerseRepeated,
                    Ordering::Less => return VerseRefValidStatus::VerseOutOfOrder,
                    Ordering::Greater => {}
                }
            }
            previous = Some(verse);
        }
        VerseRefValidStatus::Valid
    }

    /// Copy with a different verse
    fn with_verse(&self, verse: impl Into<String>) -> Self {
        Self::new(self.book_num, self.chapter_num, verse)
    }

    /// Compare the first verse number and optionally the segment
    fn compare_single(&self, other: &Self, compare_segments: bool) -> Ordering {
        let ordering = self.verse_num().cmp(&other.verse_num());
        if ordering != Ordering::Equal || !compare_segments {
            return ordering;
        }
        single_segment(&self.verse).cmp(single_segment(&other.verse))
    }
}

impl FromStr for VerseRef {
    type Err = CoreError;

    /// Parse `BOOK chapter:verse`
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let (book, rest) = text
            .split_once(char::is_whitespace)
            .ok_or_else(|| CoreError::invalid_reference(s, "expected 'BOOK chapter:verse'"))?;
        let (chapter, verse) = rest
            .trim()
            .split_once(':')
            .ok_or_else(|| CoreError::invalid_reference(s, "missing ':' between chapter and verse"))?;
        let chapter_num: u32 = chapter
            .parse()
            .map_err(|_| CoreError::invalid_reference(s, "chapter is not a number"))?;
        if !verse.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(CoreError::invalid_reference(s, "verse must start with a number"));
        }
        let book_num = book_id_to_number(book);
        if book_num == 0 {
            return Err(CoreError::invalid_reference(s, format!("unknown book id '{book}'")));
        }
        Ok(Self::new(book_num, chapter_num, verse))
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verse = if self.verse.is_empty() { "0" } else { &self.verse };
        write!(f, "{} {}:{}", self.book(), self.chapter_num, verse)
    }
}

/// Number formed by the leading ASCII digits, 0 when there are none
pub(crate) fn leading_number(text: &str) -> u32 {
    text.chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u32, |acc, digit| acc.saturating_mul(10).saturating_add(digit))
}

/// Segment suffix of a single verse string
fn single_segment(verse: &str) -> &str {
    verse.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// Overlap check for one part of a sequence
fn parts_overlap(part1: &str, part2: &str) -> bool {
    let range1 = part_range(part1);
    let range2 = part_range(part2);
    if !range1.2 && !range2.2 {
        return false;
    }
    range1.0 <= range2.1 && range2.0 <= range1.1
}

/// Start, end and whether the part is a bridge
fn part_range(part: &str) -> (u32, u32, bool) {
    match part.split_once(VERSE_RANGE_SEPARATOR) {
        Some((start, end)) => (leading_number(start), leading_number(end), true),
        None => {
            let verse = leading_number(part);
            (verse, verse, false)
        }
    }
}
