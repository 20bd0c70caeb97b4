//! Marker tag definitions loaded from USFM stylesheets
//!
//! A [`UsfmTag`] describes one marker: its structural role
//! ([`UsfmStyleType`]), the kind of text it carries ([`UsfmTextType`]),
//! a [`TextProperties`] flag set, its end marker and declared attributes.
//! Display metadata (fonts, margins, colors) is stored verbatim and never
//! interpreted by the toolkit.

use bitflags::bitflags;
use core::fmt;
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structural role of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UsfmStyleType {
    /// Marker is not defined by the stylesheet
    #[default]
    Unknown,
    /// Inline character style closed by an end marker
    Character,
    /// Footnote, endnote or cross reference
    Note,
    /// Block level marker
    Paragraph,
    /// End marker (`\xx*`)
    End,
    /// Milestone start (`\qt-s`)
    Milestone,
    /// Milestone end (`\qt-e`)
    MilestoneEnd,
}

impl UsfmStyleType {
    /// Parse the value of a `\StyleType` entry (case-insensitive)
    #[must_use]
    pub fn from_stylesheet(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "character" => Some(Self::Character),
            "paragraph" => Some(Self::Paragraph),
            "note" => Some(Self::Note),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }

    /// Get string representation for display
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Character => "character",
            Self::Note => "note",
            Self::Paragraph => "paragraph",
            Self::End => "end",
            Self::Milestone => "milestone",
            Self::MilestoneEnd => "milestoneend",
        }
    }
}

impl fmt::Display for UsfmStyleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of text a marker carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UsfmTextType {
    /// No `\TextType` entry
    #[default]
    NotSpecified,
    /// Titles and headings
    Title,
    /// Section headings
    Section,
    /// Scripture text
    VerseText,
    /// Footnote and cross reference text
    NoteText,
    /// Everything else (identification, chapter numbers)
    Other,
    /// Back translation
    BackTranslation,
    /// Translator notes
    TranslationNote,
}

impl UsfmTextType {
    /// Parse the value of a `\TextType` entry (case-insensitive)
    ///
    /// `versenumber` maps to [`Self::VerseText`] and `chapternumber` to
    /// [`Self::Other`]; the stylesheet loader adds the matching flags.
    #[must_use]
    pub fn from_stylesheet(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "title" => Some(Self::Title),
            "section" => Some(Self::Section),
            "versetext" | "versenumber" => Some(Self::VerseText),
            "notetext" => Some(Self::NoteText),
            "other" | "chapternumber" => Some(Self::Other),
            "backtranslation" => Some(Self::BackTranslation),
            "translationnote" => Some(Self::TranslationNote),
            _ => None,
        }
    }

    /// Whether text of this type counts as verse text
    #[must_use]
    pub const fn is_verse_text(self) -> bool {
        matches!(self, Self::VerseText | Self::NotSpecified)
    }
}

bitflags! {
    /// Text property flags declared by `\TextProperties`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct TextProperties: u32 {
        /// Verse number marker
        const VERSE = 1 << 0;
        /// Chapter number marker
        const CHAPTER = 1 << 1;
        /// Block level text
        const PARAGRAPH = 1 << 2;
        /// Printed in published output
        const PUBLISHABLE = 1 << 3;
        /// Vernacular text
        const VERNACULAR = 1 << 4;
        /// Poetry
        const POETIC = 1 << 5;
        /// Indentation level 1
        const LEVEL_1 = 1 << 6;
        /// Indentation level 2
        const LEVEL_2 = 1 << 7;
        /// Indentation level 3
        const LEVEL_3 = 1 << 8;
        /// Indentation level 4
        const LEVEL_4 = 1 << 9;
        /// Indentation level 5
        const LEVEL_5 = 1 << 10;
        /// Cross reference content
        const CROSS_REFERENCE = 1 << 11;
        /// Never published
        const NONPUBLISHABLE = 1 << 12;
        /// Not vernacular text
        const NONVERNACULAR = 1 << 13;
        /// Book identification marker
        const BOOK = 1 << 14;
        /// Note content
        const NOTE = 1 << 15;
    }
}

impl TextProperties {
    /// Parse a single `\TextProperties` keyword (case-insensitive)
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let flag = match keyword.to_ascii_lowercase().as_str() {
            "verse" => Self::VERSE,
            "chapter" => Self::CHAPTER,
            "paragraph" => Self::PARAGRAPH,
            "publishable" => Self::PUBLISHABLE,
            "vernacular" => Self::VERNACULAR,
            "poetic" => Self::POETIC,
            "level_1" => Self::LEVEL_1,
            "level_2" => Self::LEVEL_2,
            "level_3" => Self::LEVEL_3,
            "level_4" => Self::LEVEL_4,
            "level_5" => Self::LEVEL_5,
            "crossreference" => Self::CROSS_REFERENCE,
            "nonpublishable" => Self::NONPUBLISHABLE,
            "nonvernacular" => Self::NONVERNACULAR,
            "book" => Self::BOOK,
            "note" => Self::NOTE,
            _ => return None,
        };
        Some(flag)
    }
}

/// Paragraph justification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UsfmJustification {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Right aligned
    Right,
    /// Justified
    Both,
}

impl UsfmJustification {
    /// Parse the value of a `\Justification` entry (case-insensitive)
    #[must_use]
    pub fn from_stylesheet(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Attribute declared by a `\Attributes` entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsfmStyleAttribute {
    /// Attribute name
    pub name: String,
    /// Whether the attribute must be present
    pub required: bool,
}

impl UsfmStyleAttribute {
    /// Create a new attribute declaration
    #[must_use]
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }
}

/// Stylesheet definition of a single marker
///
/// # Example
///
/// ```rust
/// use usfm_core::stylesheet::{TextProperties, UsfmStyleType, UsfmStylesheet};
///
/// let stylesheet = UsfmStylesheet::default();
/// let tag = stylesheet.get_tag("v");
/// assert_eq!(tag.style_type, UsfmStyleType::Character);
/// assert!(tag.text_properties.contains(TextProperties::VERSE));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsfmTag {
    /// Marker name without backslash
    pub marker: String,
    /// Structural role
    pub style_type: UsfmStyleType,
    /// Kind of text carried
    pub text_type: UsfmTextType,
    /// Text property flags
    pub text_properties: TextProperties,
    /// Explicit end marker
    pub end_marker: Option<String>,
    /// Declared attributes in order
    pub attributes: Vec<UsfmStyleAttribute>,
    /// Attribute assumed for an unnamed attribute value
    pub default_attribute_name: Option<String>,

    /// Human readable name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Font family
    pub font_name: Option<String>,
    /// Font size in points
    pub font_size: i32,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Small caps
    pub small_caps: bool,
    /// Subscript
    pub subscript: bool,
    /// Superscript
    pub superscript: bool,
    /// Underline
    pub underline: bool,
    /// Regular weight, clears bold/italic/superscript
    pub regular: bool,
    /// RGB color
    pub color: i32,
    /// Justification
    pub justification: UsfmJustification,
    /// Line spacing
    pub line_spacing: i32,
    /// Space before in points
    pub space_before: i32,
    /// Space after in points
    pub space_after: i32,
    /// Left margin in thousandths of an inch
    pub left_margin: i32,
    /// Right margin in thousandths of an inch
    pub right_margin: i32,
    /// First line indent in thousandths of an inch
    pub first_line_indent: i32,
    /// Rank
    pub rank: i32,
    /// XML element name
    pub xml_tag: Option<String>,
    /// Encoding name
    pub encoding: Option<String>,
    /// Marker may not repeat
    pub not_repeatable: bool,
    /// Markers this marker may occur under
    pub occurs_under: BTreeSet<String>,
}

impl UsfmTag {
    /// Create an empty tag of unknown style
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            ..Self::default()
        }
    }

    /// Create an end tag for the given end marker
    #[must_use]
    pub fn end(marker: impl Into<String>) -> Self {
        Self {
            style_type: UsfmStyleType::End,
            ..Self::new(marker)
        }
    }

    /// Check if this tag was defined by a stylesheet
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.style_type != UsfmStyleType::Unknown
    }

    /// Check a text property flag
    #[must_use]
    pub const fn has(&self, flag: TextProperties) -> bool {
        self.text_properties.contains(flag)
    }
}

impl fmt::Display for UsfmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{}", self.marker)
    }
}
