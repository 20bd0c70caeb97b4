//! Scripture references: a verse plus a path to non-verse content
//!
//! A path element is `position:name`, where position is the 1-based index of
//! the element among its siblings and 0 means unknown. The section heading
//! right after MAT 1:1 is `MAT 1:1/1:s`; a table cell might be
//! `MAT 1:1/1:tr/1:tc1`. Introductory material before the first verse hangs
//! off verse 0 (`MAT 1:0/1:ip`).
//!
//! # Example
//!
//! ```rust
//! use usfm_core::scripture::ScriptureRef;
//!
//! let heading: ScriptureRef = "MAT 1:1/1:s".parse()?;
//! assert!(!heading.is_verse());
//! assert_eq!(heading.path()[0].name, "s");
//! assert_eq!(heading.to_relaxed().to_string(), "MAT 1:1/s");
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

use super::verse_ref::VerseRef;
use super::versification::Versification;
use crate::utils::errors::{CoreError, Result};
use core::cmp::Ordering;
use core::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One step of a scripture reference path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScriptureElement {
    /// 1-based position among siblings, 0 when unknown
    pub position: u32,
    /// Marker name
    pub name: String,
}

impl ScriptureElement {
    /// Create a path element
    #[must_use]
    pub fn new(position: u32, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }

    /// Same element with an unknown position
    #[must_use]
    pub fn to_relaxed(&self) -> Self {
        Self::new(0, self.name.clone())
    }

    /// Order by position, then name
    ///
    /// An unknown position matches any position.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.position != 0 && other.position != 0 {
            let ordering = self.position.cmp(&other.position);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for ScriptureElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.position == 0 {
            f.write_str(&self.name)
        } else {
            write!(f, "{}:{}", self.position, self.name)
        }
    }
}

/// Address of a span of scripture text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScriptureRef {
    /// Anchoring verse
    pub verse_ref: VerseRef,
    /// Path below the verse, outermost first
    path: Vec<ScriptureElement>,
}

impl ScriptureRef {
    /// Create a reference
    #[must_use]
    pub const fn new(verse_ref: VerseRef, path: Vec<ScriptureElement>) -> Self {
        Self { verse_ref, path }
    }

    /// Reference to a verse with no path
    #[must_use]
    pub const fn verse(verse_ref: VerseRef) -> Self {
        Self::new(verse_ref, Vec::new())
    }

    /// Path elements, outermost first
    #[must_use]
    pub fn path(&self) -> &[ScriptureElement] {
        &self.path
    }

    /// Book id
    #[must_use]
    pub fn book(&self) -> &'static str {
        self.verse_ref.book()
    }

    /// Chapter number
    #[must_use]
    pub const fn chapter_num(&self) -> u32 {
        self.verse_ref.chapter_num
    }

    /// First verse number
    #[must_use]
    pub fn verse_num(&self) -> u32 {
        self.verse_ref.verse_num()
    }

    /// Whether no book is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.verse_ref.is_default()
    }

    /// Whether this addresses verse text rather than a path below it
    #[must_use]
    pub fn is_verse(&self) -> bool {
        self.verse_ref.verse_num() != 0 && self.path.is_empty()
    }

    /// Same reference with every path position unknown
    #[must_use]
    pub fn to_relaxed(&self) -> Self {
        Self::new(
            self.verse_ref.clone(),
            self.path.iter().map(ScriptureElement::to_relaxed).collect(),
        )
    }

    /// Map the verse from one versification to another via the original
    #[must_use]
    pub fn change_versification(&self, from: &dyn Versification, to: &dyn Versification) -> Self {
        let original = from.to_original(&self.verse_ref);
        Self::new(to.from_original(&original), self.path.clone())
    }

    /// Order by verse, then path element by element, then path length
    #[must_use]
    pub fn compare(&self, other: &Self, compare_segments: bool) -> Ordering {
        let ordering = self.verse_ref.compare(&other.verse_ref, compare_segments);
        if ordering != Ordering::Equal {
            return ordering;
        }
        for (element, other_element) in self.path.iter().zip(&other.path) {
            let ordering = element.compare(other_element);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.path.len().cmp(&other.path.len())
    }
}

impl FromStr for ScriptureRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        let verse_ref: VerseRef = parts.next().unwrap_or_default().parse()?;
        let mut path = Vec::new();
        for part in parts {
            let element = match part.split_once(':') {
                Some((position, name)) => {
                    let position = position.parse().map_err(|_| {
                        CoreError::invalid_reference(s, format!("invalid path position in '{part}'"))
                    })?;
                    ScriptureElement::new(position, name)
                }
                None => ScriptureElement::new(0, part),
            };
            if element.name.is_empty() {
                return Err(CoreError::invalid_reference(s, "empty path element"));
            }
            path.push(element);
        }
        Ok(Self::new(verse_ref, path))
    }
}

impl fmt::Display for ScriptureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.verse_ref)?;
        for element in &self.path {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripture::versification::VersificationTable;

    fn sref(text: &str) -> ScriptureRef {
        text.parse().unwrap()
    }

    #[test]
    fn parse_and_display() {
        let r = sref("MAT 1:1/1:tr/2:tc1");
        assert_eq!(r.book(), "MAT");
        assert_eq!(r.path().len(), 2);
        assert_eq!(r.path()[1], ScriptureElement::new(2, "tc1"));
        assert_eq!(r.to_string(), "MAT 1:1/1:tr/2:tc1");
        assert_eq!(sref("MAT 1:0/ip").path()[0], ScriptureElement::new(0, "ip"));
    }

    #[test]
    fn parse_errors() {
        assert!("MAT 1:1/x:s".parse::<ScriptureRef>().is_err());
        assert!("MAT 1:1/".parse::<ScriptureRef>().is_err());
        assert!("1:1/1:s".parse::<ScriptureRef>().is_err());
    }

    #[test]
    fn is_verse() {
        assert!(sref("MAT 1:1").is_verse());
        assert!(!sref("MAT 1:0").is_verse());
        assert!(!sref("MAT 1:1/1:s").is_verse());
    }

    #[test]
    fn ordering_puts_verse_first() {
        assert_eq!(sref("MAT 1:1/2:s").compare(&sref("MAT 1:2"), true), Ordering::Less);
        assert_eq!(sref("MAT 1:1").compare(&sref("MAT 1:1/1:s"), true), Ordering::Less);
        assert_eq!(sref("MAT 1:1/1:s").compare(&sref("MAT 1:1/2:p"), true), Ordering::Less);
        assert_eq!(sref("MAT 1:1/1:s").compare(&sref("MAT 1:1/s"), true), Ordering::Equal);
        assert_eq!(sref("MAT 1:1/1:p").compare(&sref("MAT 1:1/1:s"), true), Ordering::Less);
    }

    #[test]
    fn relaxed_drops_positions() {
        assert_eq!(sref("MAT 1:1/1:tr/2:tc1").to_relaxed().to_string(), "MAT 1:1/tr/tc1");
    }

    #[test]
    fn change_versification() {
        let source = VersificationTable::parse("source", "GEN 32:1 = GEN 31:55\n").unwrap();
        let target = VersificationTable::parse("target", "").unwrap();
        let r = sref("GEN 32:1/1:s");
        assert_eq!(r.change_versification(&source, &target).to_string(), "GEN 31:55/1:s");
    }
}
