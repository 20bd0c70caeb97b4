//! Versification schemes
//!
//! The [`Versification`] trait is the small lookup surface the parser and
//! error detector need: last chapter of a book, last verse of a chapter,
//! declared verse segments and mapping to and from the original
//! versification. [`VersificationTable`] implements it from `.vrs` text.
//!
//! # Format
//!
//! ```text
//! # comment
//! GEN 1:31 2:25 3:24
//! #! *MAT 5:13,a,b
//! GEN 31:55 = GEN 32:1
//! GEN 32:1-32 = GEN 32:2-33
//! ```
//!
//! Each book line lists `chapter:last_verse` pairs. A `*` line declares the
//! segments of one verse; an empty segment (`,-`) means the unsegmented verse
//! is allowed too. Lines containing `=` map verses of this versification to
//! the original one.

use super::canon::book_id_to_number;
use super::verse_ref::VerseRef;
use crate::utils::errors::{CoreError, Result};
use crate::utils::hashers::{create_hash_map, FastMap};
use log::debug;

/// Versification lookups
pub trait Versification: Send + Sync {
    /// Versification name
    fn name(&self) -> &str;

    /// Last chapter of a book, 0 when the book is unknown
    fn last_chapter(&self, book: u16) -> u32;

    /// Last verse of a chapter, 0 when the chapter is unknown
    fn last_verse(&self, book: u16, chapter: u32) -> u32;

    /// Declared segments of a verse, if it is segmented
    fn verse_segments(&self, book: u16, chapter: u32, verse: u32) -> Option<&[String]>;

    /// Map a reference to the original versification
    fn to_original(&self, verse_ref: &VerseRef) -> VerseRef {
        verse_ref.clone()
    }

    /// Map a reference from the original versification
    fn from_original(&self, verse_ref: &VerseRef) -> VerseRef {
        verse_ref.clone()
    }
}

/// Book, chapter and verse number triple
type VerseKey = (u16, u32, u32);

/// Versification loaded from a `.vrs` table
#[derive(Debug, Clone)]
pub struct VersificationTable {
    /// Scheme name
    name: String,
    /// Last verse of every chapter, indexed by chapter - 1
    books: FastMap<u16, Vec<u32>>,
    /// Declared segments per verse
    segments: FastMap<VerseKey, Vec<String>>,
    /// Verse mappings to the original versification
    to_original: FastMap<VerseKey, VerseKey>,
    /// Verse mappings from the original versification
    from_original: FastMap<VerseKey, VerseKey>,
}

impl VersificationTable {
    /// Create an empty table
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            books: create_hash_map(),
            segments: create_hash_map(),
            to_original: create_hash_map(),
            from_original: create_hash_map(),
        }
    }

    /// Parse `.vrs` text
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Versification`] with the 1-based line number for
    /// malformed chapter, segment or mapping entries.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let mut table = Self::new(name);
        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let mut line = raw_line.trim();
            if let Some(rest) = line.strip_prefix("#!") {
                line = rest.trim();
            } else if line.starts_with('#') {
                continue;
            }
            if line.is_empty() || line.starts_with('-') {
                continue;
            }

            if line.contains('=') {
                table.parse_mapping(line.trim_start_matches('&'), line_number)?;
            } else if let Some(segment_line) = line.strip_prefix('*') {
                table.parse_segments(segment_line, line_number)?;
            } else {
                table.parse_book(line, line_number)?;
            }
        }
        Ok(table)
    }

    /// Set the last verse of a chapter
    pub fn set_last_verse(&mut self, book: u16, chapter: u32, last_verse: u32) {
        let Ok(index) = usize::try_from(chapter) else {
            return;
        };
        if index == 0 {
            return;
        }
        let chapters = self.books.entry(book).or_default();
        if chapters.len() < index {
            chapters.resize(index, 0);
        }
        chapters[index - 1] = last_verse;
    }

    /// `BOOK c:v c:v ...`
    fn parse_book(&mut self, line: &str, line_number: usize) -> Result<()> {
        let mut parts = line.split_whitespace();
        let Some(book_id) = parts.next() else {
            return Ok(());
        };
        let book = book_id_to_number(book_id);
        if book == 0 {
            debug!("Skipping versification line {line_number}: unknown book '{book_id}'");
            return Ok(());
        }
        for part in parts {
            let (chapter, verse) = parse_chapter_verse(part).ok_or_else(|| {
                CoreError::versification(line_number, format!("invalid chapter:verse '{part}'"))
            })?;
            self.set_last_verse(book, chapter, verse);
        }
        Ok(())
    }

    /// `BOOK c:v,seg,seg`
    fn parse_segments(&mut self, line: &str, line_number: usize) -> Result<()> {
        let invalid = || CoreError::versification(line_number, format!("invalid segment line '{line}'"));
        let (book_id, rest) = line.trim().split_once(char::is_whitespace).ok_or_else(invalid)?;
        let book = book_id_to_number(book_id);
        if book == 0 {
            return Err(invalid());
        }
        let mut fields = rest.trim().split(',');
        let (chapter, verse) = fields
            .next()
            .and_then(parse_chapter_verse)
            .ok_or_else(invalid)?;
        let segments: Vec<String> = fields
            .map(|segment| {
                let segment = segment.trim();
                if segment == "-" {
                    String::new()
                } else {
                    segment.to_string()
                }
            })
            .collect();
        if segments.is_empty() {
            return Err(invalid());
        }
        self.segments.insert((book, chapter, verse), segments);
        Ok(())
    }

    /// `BOOK c:v[-v] = BOOK c:v[-v]`
    fn parse_mapping(&mut self, line: &str, line_number: usize) -> Result<()> {
        let invalid = || CoreError::versification(line_number, format!("invalid mapping '{line}'"));
        let (left, right) = line.split_once('=').ok_or_else(invalid)?;
        let (from_book, from_chapter, from_start, from_end) =
            parse_mapping_side(left).ok_or_else(invalid)?;
        let (to_book, to_chapter, to_start, to_end) =
            parse_mapping_side(right).ok_or_else(invalid)?;
        if from_end - from_start != to_end - to_start {
            return Err(CoreError::versification(
                line_number,
                "mapped verse ranges differ in length",
            ));
        }
        for offset in 0..=(from_end - from_start) {
            let from = (from_book, from_chapter, from_start + offset);
            let to = (to_book, to_chapter, to_start + offset);
            self.to_original.insert(from, to);
            self.from_original.insert(to, from);
        }
        Ok(())
    }

    /// Apply a mapping table to a single verse
    fn map(table: &FastMap<VerseKey, VerseKey>, verse_ref: &VerseRef) -> VerseRef {
        if verse_ref.has_multiple() {
            return verse_ref.clone();
        }
        let key = (verse_ref.book_num, verse_ref.chapter_num, verse_ref.verse_num());
        table.get(&key).map_or_else(
            || verse_ref.clone(),
            |&(book, chapter, verse)| {
                let mut mapped = VerseRef::new(book, chapter, verse.to_string());
                if let Some(segment) = verse_ref.segment() {
                    mapped.set_verse(format!("{verse}{segment}"));
                }
                mapped
            },
        )
    }
}

impl Versification for VersificationTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn last_chapter(&self, book: u16) -> u32 {
        self.books
            .get(&book)
            .map_or(0, |chapters| u32::try_from(chapters.len()).unwrap_or(u32::MAX))
    }

    fn last_verse(&self, book: u16, chapter: u32) -> u32 {
        let Ok(index) = usize::try_from(chapter) else {
            return 0;
        };
        if index == 0 {
            return 0;
        }
        self.books
            .get(&book)
            .and_then(|chapters| chapters.get(index - 1))
            .copied()
            .unwrap_or(0)
    }

    fn verse_segments(&self, book: u16, chapter: u32, verse: u32) -> Option<&[String]> {
        self.segments.get(&(book, chapter, verse)).map(Vec::as_slice)
    }

    fn to_original(&self, verse_ref: &VerseRef) -> VerseRef {
        Self::map(&self.to_original, verse_ref)
    }

    fn from_original(&self, verse_ref: &VerseRef) -> VerseRef {
        Self::map(&self.from_original, verse_ref)
    }
}

/// Parse `c:v`
fn parse_chapter_verse(text: &str) -> Option<(u32, u32)> {
    let (chapter, verse) = text.trim().split_once(':')?;
    Some((chapter.parse().ok()?, verse.parse().ok()?))
}

/// Parse `BOOK c:v` or `BOOK c:v-v` into book, chapter, first and last verse
fn parse_mapping_side(text: &str) -> Option<(u16, u32, u32, u32)> {
    let (book_id, rest) = text.trim().split_once(char::is_whitespace)?;
    let book = book_id_to_number(book_id);
    if book == 0 {
        return None;
    }
    let (chapter, verses) = rest.trim().split_once(':')?;
    let chapter = chapter.parse().ok()?;
    let (start, end) = match verses.split_once('-') {
        Some((start, end)) => (start.parse().ok()?, end.parse().ok()?),
        None => {
            let verse = verses.parse().ok()?;
            (verse, verse)
        }
    };
    (start <= end).then_some((book, chapter, start, end))
}
