//! Token definitions for USFM lexical analysis
//!
//! Tokens own their text: the tokenizer patches earlier tokens in place
//! (attributes found after the content they belong to, spaces appended by
//! normalization) and the rewrite engine synthesizes new ones.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::tokenizer::{UsfmToken, UsfmTokenType};
//!
//! let verse = UsfmToken::new(UsfmTokenType::Verse, "v", None, None, Some("1".to_string()));
//! assert_eq!(verse.to_usfm(), "\\v 1 ");
//! assert_eq!(UsfmToken::text("In the beginning").to_usfm(), "In the beginning");
//! ```

use super::attributes::{parse_attribute_value, ParsedAttributes};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Token type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UsfmTokenType {
    /// `\id` and other book markers, data is the book code
    Book,
    /// `\c`, data is the chapter number
    Chapter,
    /// `\v`, data is the verse number
    Verse,
    /// Plain text
    Text,
    /// Paragraph level marker
    Paragraph,
    /// Character style start marker
    Character,
    /// Note start marker, data is the caller
    Note,
    /// End marker (`\xx*`)
    End,
    /// Milestone start closed by `\*`
    Milestone,
    /// Milestone end closed by `\*`
    MilestoneEnd,
    /// `|attributes` of a character style
    Attribute,
    /// Marker not defined by the stylesheet
    Unknown,
}

impl UsfmTokenType {
    /// Get string representation for display
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Chapter => "chapter",
            Self::Verse => "verse",
            Self::Text => "text",
            Self::Paragraph => "paragraph",
            Self::Character => "character",
            Self::Note => "note",
            Self::End => "end",
            Self::Milestone => "milestone",
            Self::MilestoneEnd => "milestoneend",
            Self::Attribute => "attribute",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for UsfmTokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reading order of chapter and verse in right-to-left scripts
///
/// When set, detokenizing writes a direction mark between the parts of a
/// verse number (`1-2`, `3,5`) so bridges display in the intended order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RtlReferenceOrder {
    /// Verse numbers are written unchanged
    #[default]
    NotSet,
    /// Right-to-left mark (U+200F) between verse parts
    BookChapterVerse,
    /// Left-to-right mark (U+200E) between verse parts
    BookVerseChapter,
}

impl RtlReferenceOrder {
    /// Mark written between verse parts, if any
    #[must_use]
    pub const fn direction_mark(self) -> Option<char> {
        match self {
            Self::NotSet => None,
            Self::BookChapterVerse => Some('\u{200F}'),
            Self::BookVerseChapter => Some('\u{200E}'),
        }
    }
}

impl FromStr for RtlReferenceOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").to_ascii_lowercase().as_str() {
            "not_set" | "none" => Ok(Self::NotSet),
            "book_chapter_verse" => Ok(Self::BookChapterVerse),
            "book_verse_chapter" => Ok(Self::BookVerseChapter),
            _ => Err(format!("unknown reference order '{s}'")),
        }
    }
}

impl fmt::Display for RtlReferenceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotSet => "not-set",
            Self::BookChapterVerse => "book-chapter-verse",
            Self::BookVerseChapter => "book-verse-chapter",
        })
    }
}

/// Named attribute attached to a character style or milestone
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsfmAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute value without quotes
    pub value: String,
    /// Byte offset of the value within the raw attribute text
    pub offset: usize,
}

impl UsfmAttribute {
    /// Create a new attribute
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, offset: usize) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            offset,
        }
    }
}

impl fmt::Display for UsfmAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// A single USFM token
///
/// Equality ignores source positions so token lists produced from
/// differently formatted but equivalent text compare equal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UsfmToken {
    /// Token type
    pub token_type: UsfmTokenType,
    /// Marker as written, including a `+` nesting prefix
    pub marker: Option<String>,
    /// Text payload of text tokens
    pub text: Option<String>,
    /// End marker expected to close this token
    pub end_marker: Option<String>,
    /// Book code, chapter or verse number, note caller or raw attributes
    pub data: Option<String>,
    /// Column span of table cell ranges (0 when not a range)
    pub col_span: u32,
    /// 1-based source line, 0 for synthesized tokens
    pub line: usize,
    /// 1-based source column, 0 for synthesized tokens
    pub column: usize,
    /// Parsed attributes
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    attributes: Vec<UsfmAttribute>,
    /// Default attribute name of the marker
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    default_attribute_name: Option<String>,
    /// Whether the attributes were written as an unnamed default value
    #[cfg_attr(feature = "serde", serde(default))]
    is_default_attribute: bool,
}

impl UsfmToken {
    /// Create a marker token
    #[must_use]
    pub fn new(
        token_type: UsfmTokenType,
        marker: impl Into<String>,
        text: Option<String>,
        end_marker: Option<String>,
        data: Option<String>,
    ) -> Self {
        Self {
            token_type,
            marker: Some(marker.into()),
            text,
            end_marker,
            data,
            col_span: 0,
            line: 0,
            column: 0,
            attributes: Vec::new(),
            default_attribute_name: None,
            is_default_attribute: false,
        }
    }

    /// Create a text token
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            token_type: UsfmTokenType::Text,
            marker: None,
            text: Some(text.into()),
            end_marker: None,
            data: None,
            col_span: 0,
            line: 0,
            column: 0,
            attributes: Vec::new(),
            default_attribute_name: None,
            is_default_attribute: false,
        }
    }

    /// Set the source position
    #[must_use]
    pub const fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Marker without the `+` nesting prefix
    #[must_use]
    pub fn nestless_marker(&self) -> Option<&str> {
        self.marker.as_deref().map(|m| m.trim_start_matches('+'))
    }

    /// Marker with a `+` nesting prefix
    #[must_use]
    pub fn nested_marker(&self) -> Option<String> {
        self.nestless_marker().map(|m| format!("+{m}"))
    }

    /// Whether the marker was written with a `+` nesting prefix
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.marker.as_deref().is_some_and(|m| m.starts_with('+'))
    }

    /// Text payload, empty for marker tokens
    #[must_use]
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Parsed attributes
    #[must_use]
    pub fn attributes(&self) -> &[UsfmAttribute] {
        &self.attributes
    }

    /// Value of a named attribute
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Parse and attach raw attribute text (the part after `|`)
    ///
    /// `adjusted_text` is the content before the `|`; the USFM 2 figure
    /// form rewrites it to the caption. Returns `false` and leaves the token
    /// untouched when the text is not a valid attribute list.
    pub fn set_attributes(
        &mut self,
        attributes_value: &str,
        default_attribute_name: Option<&str>,
        adjusted_text: &mut String,
        preserve_whitespace: bool,
    ) -> bool {
        if attributes_value.is_empty() {
            return false;
        }

        if self.nestless_marker() == Some("fig") && attributes_value.matches('|').count() == 5 {
            let parts: Vec<&str> = attributes_value.split('|').collect();
            let mut attributes = Vec::with_capacity(6);
            push_trimmed(&mut attributes, "alt", adjusted_text);
            push_trimmed(&mut attributes, "src", parts[0]);
            push_trimmed(&mut attributes, "size", parts[1]);
            push_trimmed(&mut attributes, "loc", parts[2]);
            push_trimmed(&mut attributes, "copy", parts[3]);
            let whitespace = if preserve_whitespace {
                let trimmed = adjusted_text.trim_start().len();
                adjusted_text[..adjusted_text.len() - trimmed].to_string()
            } else {
                String::new()
            };
            *adjusted_text = format!("{whitespace}{}", parts[4]);
            push_trimmed(&mut attributes, "ref", parts[5]);
            self.attributes = attributes;
            self.default_attribute_name = None;
            self.is_default_attribute = false;
            return true;
        }

        let Some(parsed) = parse_attribute_value(attributes_value) else {
            return false;
        };
        match parsed {
            ParsedAttributes::Named(attributes) => {
                self.attributes = attributes;
                self.default_attribute_name = default_attribute_name.map(str::to_string);
                self.is_default_attribute = false;
                true
            }
            ParsedAttributes::Default(default_value) => {
                let Some(default_name) = default_attribute_name else {
                    return false;
                };
                self.attributes = vec![UsfmAttribute::new(default_name, default_value, 0)];
                self.default_attribute_name = Some(default_name.to_string());
                self.is_default_attribute = true;
                true
            }
        }
    }

    /// Replace the attributes directly
    pub fn set_attribute_list(
        &mut self,
        attributes: Vec<UsfmAttribute>,
        default_attribute_name: Option<String>,
    ) {
        self.attributes = attributes;
        self.default_attribute_name = default_attribute_name;
        self.is_default_attribute = false;
    }

    /// Copy parsed attributes from another token
    pub fn copy_attributes(&mut self, source: &Self) {
        self.attributes.clone_from(&source.attributes);
        self.default_attribute_name
            .clone_from(&source.default_attribute_name);
        self.is_default_attribute = source.is_default_attribute;
    }

    /// Render attributes as `|...`, or an empty string when there are none
    #[must_use]
    pub fn to_attribute_string(&self) -> String {
        if self.attributes.is_empty() {
            return String::new();
        }
        if self.is_default_attribute && self.attributes.len() == 1 {
            return format!("|{}", self.attributes[0].value);
        }
        let joined: Vec<String> = self.attributes.iter().map(ToString::to_string).collect();
        format!("|{}", joined.join(" "))
    }

    /// Render this token as USFM
    #[must_use]
    pub fn to_usfm(&self) -> String {
        match self.token_type {
            UsfmTokenType::Text => self.text_str().to_string(),
            UsfmTokenType::Attribute => self.to_attribute_string(),
            UsfmTokenType::End => format!("\\{}", self.marker.as_deref().unwrap_or_default()),
            UsfmTokenType::Milestone | UsfmTokenType::MilestoneEnd => {
                let attributes = self.to_attribute_string();
                let marker = self.marker.as_deref().unwrap_or_default();
                if attributes.is_empty() {
                    format!("\\{marker}\\*")
                } else {
                    format!("\\{marker} {attributes}\\*")
                }
            }
            _ => {
                let mut usfm = format!("\\{}", self.marker.as_deref().unwrap_or_default());
                if let Some(data) = self.data.as_deref().filter(|d| !d.is_empty()) {
                    usfm.push(' ');
                    usfm.push_str(data);
                }
                usfm.push(' ');
                usfm
            }
        }
    }
}

impl PartialEq for UsfmToken {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type
            && self.marker == other.marker
            && self.text == other.text
            && self.end_marker == other.end_marker
            && self.data == other.data
            && self.col_span == other.col_span
            && self.attributes == other.attributes
    }
}

impl Eq for UsfmToken {}

impl fmt::Display for UsfmToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_usfm())
    }
}

/// Append an attribute unless its trimmed value is empty
fn push_trimmed(attributes: &mut Vec<UsfmAttribute>, name: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        attributes.push(UsfmAttribute::new(name, value, 0));
    }
}
