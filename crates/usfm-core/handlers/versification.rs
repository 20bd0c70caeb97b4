//! Versification error detection
//!
//! [`UsfmVersificationErrorDetector`] compares the chapters and verses of a
//! document with a [`Versification`] and records what does not line up.
//! Checks run when a chapter starts (was the previous one complete?), at
//! every verse (is it valid?) and at the end of the document (was the last
//! chapter reached?). Only canonical books are checked.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::handlers::{UsfmVersificationErrorDetector, UsfmVersificationErrorType};
//! use usfm_core::parser::parse_usfm;
//! use usfm_core::scripture::VersificationTable;
//! use usfm_core::stylesheet::UsfmStylesheet;
//!
//! let versification = VersificationTable::parse("test", "MAT 1:3")?;
//! let mut detector = UsfmVersificationErrorDetector::new(&versification);
//! let usfm = "\\id MAT\n\\c 1\n\\p\n\\v 1 One\n\\v 2 Two\n";
//! parse_usfm(usfm, &UsfmStylesheet::default(), &mut detector);
//!
//! let errors = detector.errors();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].error_type(), UsfmVersificationErrorType::MissingVerse);
//! assert_eq!(errors[0].expected_verse_ref(), "MAT 1:3");
//! assert_eq!(errors[0].actual_verse_ref(), "MAT 1:2");
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

use crate::parser::{UsfmParserHandler, UsfmParserState};
use crate::scripture::canon::is_canonical;
use crate::scripture::{VerseRef, VerseRefValidStatus, Versification};
use core::cmp::Ordering;
use core::fmt;
use log::debug;

/// Kind of versification problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsfmVersificationErrorType {
    /// A chapter with verses is absent
    MissingChapter,
    /// A chapter stops before its last verse
    MissingVerse,
    /// A verse or chapter beyond the versification
    ExtraVerse,
    /// A bridge or sequence with repeated or backwards verses
    InvalidVerseRange,
    /// A segmented verse written without its segment
    MissingVerseSegment,
    /// A segment on a verse that has none declared
    ExtraVerseSegment,
}

impl UsfmVersificationErrorType {
    /// Stable name for reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingChapter => "missing-chapter",
            Self::MissingVerse => "missing-verse",
            Self::ExtraVerse => "extra-verse",
            Self::InvalidVerseRange => "invalid-verse-range",
            Self::MissingVerseSegment => "missing-verse-segment",
            Self::ExtraVerseSegment => "extra-verse-segment",
        }
    }
}

impl fmt::Display for UsfmVersificationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mismatch between a document and its versification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsfmVersificationError {
    /// What went wrong
    error_type: UsfmVersificationErrorType,
    /// Book number
    book_num: u16,
    /// Chapter the versification expects
    expected_chapter: u32,
    /// Verse the versification expects
    expected_verse: u32,
    /// Chapter found in the document
    actual_chapter: u32,
    /// Verse found in the document
    actual_verse: u32,
    /// Verse marker being checked, for verse-level errors
    verse_ref: Option<VerseRef>,
}

impl UsfmVersificationError {
    /// Classify a position, returning `None` when it is consistent
    ///
    /// Missing chapters take precedence over missing verses, which take
    /// precedence over segment and range problems of `verse_ref`.
    #[must_use]
    pub fn check(
        book_num: u16,
        expected: (u32, u32),
        actual: (u32, u32),
        verse_ref: Option<VerseRef>,
        versification: &dyn Versification,
    ) -> Option<Self> {
        let (expected_chapter, expected_verse) = expected;
        let (actual_chapter, actual_verse) = actual;
        let error_type = if expected_chapter > actual_chapter && expected_verse != 0 {
            UsfmVersificationErrorType::MissingChapter
        } else if expected_verse > actual_verse && expected_chapter == actual_chapter {
            UsfmVersificationErrorType::MissingVerse
        } else {
            verse_ref
                .as_ref()
                .and_then(|verse_ref| verse_error(verse_ref, versification))?
        };
        Some(Self {
            error_type,
            book_num,
            expected_chapter,
            expected_verse,
            actual_chapter,
            actual_verse,
            verse_ref,
        })
    }

    /// What went wrong
    #[must_use]
    pub const fn error_type(&self) -> UsfmVersificationErrorType {
        self.error_type
    }

    /// Book number
    #[must_use]
    pub const fn book_num(&self) -> u16 {
        self.book_num
    }

    /// Reference the versification expects, empty for extra verses
    #[must_use]
    pub fn expected_verse_ref(&self) -> String {
        let expected = VerseRef::new(
            self.book_num,
            self.expected_chapter,
            self.expected_verse.to_string(),
        );
        match self.error_type {
            UsfmVersificationErrorType::ExtraVerse => String::new(),
            UsfmVersificationErrorType::MissingVerseSegment => {
                format!("{} {}:{}a", expected.book(), expected.chapter_num, expected.verse())
            }
            UsfmVersificationErrorType::InvalidVerseRange => self
                .corrected_range()
                .unwrap_or_else(|| expected.to_string()),
            _ => expected.to_string(),
        }
    }

    /// Reference found in the document
    #[must_use]
    pub fn actual_verse_ref(&self) -> String {
        self.verse_ref.as_ref().map_or_else(
            || {
                VerseRef::new(self.book_num, self.actual_chapter, self.actual_verse.to_string())
                    .to_string()
            },
            ToString::to_string,
        )
    }

    /// Sorted, de-duplicated bridge covering the verses of an invalid range
    fn corrected_range(&self) -> Option<String> {
        let mut verses = self.verse_ref.as_ref()?.all_verses();
        verses.sort_by(|a, b| a.compare(b, true));
        verses.dedup_by(|a, b| a.compare(b, true) == Ordering::Equal);
        let first = verses.first()?;
        let last = verses.last()?;
        if first == last {
            return Some(first.to_string());
        }
        Some(format!(
            "{} {}:{}-{}",
            first.book(),
            first.chapter_num,
            first.verse(),
            last.verse()
        ))
    }
}

impl fmt::Display for UsfmVersificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected = self.expected_verse_ref();
        if expected.is_empty() {
            write!(f, "{}: {}", self.error_type, self.actual_verse_ref())
        } else {
            write!(
                f,
                "{}: expected {}, found {}",
                self.error_type,
                expected,
                self.actual_verse_ref()
            )
        }
    }
}

/// Segment and validity problems of a single verse marker
fn verse_error(
    verse_ref: &VerseRef,
    versification: &dyn Versification,
) -> Option<UsfmVersificationErrorType> {
    if !verse_ref.has_multiple() {
        let segments = versification.verse_segments(
            verse_ref.book_num,
            verse_ref.chapter_num,
            verse_ref.verse_num(),
        );
        match (verse_ref.segment(), segments) {
            (None, Some(segments)) if !segments.iter().any(String::is_empty) => {
                return Some(UsfmVersificationErrorType::MissingVerseSegment);
            }
            (Some(_), None) => return Some(UsfmVersificationErrorType::ExtraVerseSegment),
            (Some(segment), Some(segments)) if !segments.iter().any(|s| s == segment) => {
                return Some(UsfmVersificationErrorType::ExtraVerseSegment);
            }
            _ => {}
        }
    }
    match verse_ref.valid_status(versification) {
        VerseRefValidStatus::Valid => None,
        VerseRefValidStatus::OutOfRange => Some(UsfmVersificationErrorType::ExtraVerse),
        VerseRefValidStatus::VerseRepeated | VerseRefValidStatus::VerseOutOfOrder => {
            Some(UsfmVersificationErrorType::InvalidVerseRange)
        }
    }
}

/// Last verse number of a possibly bridged reference
fn last_verse_num(verse_ref: &VerseRef) -> u32 {
    verse_ref
        .all_verses()
        .last()
        .map_or(0, VerseRef::verse_num)
}

/// Parser handler collecting versification errors
pub struct UsfmVersificationErrorDetector<'v> {
    /// Scheme the document is checked against
    versification: &'v dyn Versification,
    /// Book being checked, 0 before `\id`
    current_book: u16,
    /// Chapter being checked, 0 before the first `\c`
    current_chapter: u32,
    /// Last verse marker seen in the chapter
    current_verse: VerseRef,
    /// Errors in document order
    errors: Vec<UsfmVersificationError>,
}

impl<'v> UsfmVersificationErrorDetector<'v> {
    /// Create a detector for a versification
    #[must_use]
    pub fn new(versification: &'v dyn Versification) -> Self {
        Self {
            versification,
            current_book: 0,
            current_chapter: 0,
            current_verse: VerseRef::default(),
            errors: Vec::new(),
        }
    }

    /// Errors found so far, in document order
    #[must_use]
    pub fn errors(&self) -> &[UsfmVersificationError] {
        &self.errors
    }

    /// Take the collected errors
    #[must_use]
    pub fn into_errors(self) -> Vec<UsfmVersificationError> {
        self.errors
    }

    /// Whether the current book takes part in checking
    fn checking(&self) -> bool {
        self.current_book > 0 && is_canonical(self.current_book)
    }

    fn record(&mut self, expected: (u32, u32), actual: (u32, u32), verse_ref: Option<VerseRef>) {
        if let Some(error) = UsfmVersificationError::check(
            self.current_book,
            expected,
            actual,
            verse_ref,
            self.versification,
        ) {
            debug!("Versification error: {error}");
            self.errors.push(error);
        }
    }
}

impl UsfmParserHandler for UsfmVersificationErrorDetector<'_> {
    fn end_usfm(&mut self, _state: &UsfmParserState<'_>) {
        if !self.checking() {
            return;
        }
        let last_chapter = self.versification.last_chapter(self.current_book);
        let last_verse = self.versification.last_verse(self.current_book, last_chapter);
        self.record(
            (last_chapter, last_verse),
            (self.current_chapter, last_verse_num(&self.current_verse)),
            None,
        );
    }

    fn start_book(&mut self, state: &UsfmParserState<'_>, _marker: &str, _code: &str) {
        self.current_book = state.verse_ref().book_num;
        self.current_chapter = 0;
        self.current_verse = VerseRef::default();
    }

    fn chapter(
        &mut self,
        state: &UsfmParserState<'_>,
        _number: &str,
        _marker: &str,
        _alt_number: Option<&str>,
        _pub_number: Option<&str>,
    ) {
        if self.checking() && self.current_chapter > 0 {
            let chapter = self.current_chapter;
            let last_verse = self.versification.last_verse(self.current_book, chapter);
            self.record(
                (chapter, last_verse),
                (chapter, last_verse_num(&self.current_verse)),
                None,
            );
        }
        self.current_chapter = state.verse_ref().chapter_num;
        self.current_verse = VerseRef::default();
    }

    fn verse(
        &mut self,
        state: &UsfmParserState<'_>,
        _number: &str,
        _marker: &str,
        _alt_number: Option<&str>,
        _pub_number: Option<&str>,
    ) {
        self.current_verse = state.verse_ref().clone();
        if self.checking() && self.current_chapter > 0 {
            let chapter = self.current_chapter;
            let verse = last_verse_num(&self.current_verse);
            self.record(
                (chapter, verse),
                (chapter, verse),
                Some(self.current_verse.clone()),
            );
        }
    }
}

impl fmt::Debug for UsfmVersificationErrorDetector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsfmVersificationErrorDetector")
            .field("versification", &self.versification.name())
            .field("current_book", &self.current_book)
            .field("current_chapter", &self.current_chapter)
            .field("errors", &self.errors)
            .finish()
    }
}
