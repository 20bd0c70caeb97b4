//! Parser state: the stack of open elements and the current verse
//!
//! All structural queries ([`UsfmParserState::para_tag`],
//! [`UsfmParserState::is_verse_text`], ...) are pure functions over the
//! stack, so handlers can inspect the state at any event without the parser
//! caching derived flags.

use crate::scripture::VerseRef;
use crate::stylesheet::{TextProperties, UsfmStylesheet, UsfmTag};
use crate::tokenizer::{UsfmAttribute, UsfmToken};
use std::borrow::Cow;

/// Kind of element on the parser stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsfmElementType {
    /// `\id` and other book markers
    Book,
    /// Paragraph
    Para,
    /// Character style
    Char,
    /// Table (implicit, opened by the first `\tr`)
    Table,
    /// Table row
    Row,
    /// Table cell
    Cell,
    /// Footnote, cross reference or other note
    Note,
    /// Study bible sidebar (`\esb`)
    Sidebar,
}

/// An open element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsfmParserElement {
    /// Kind of element
    pub element_type: UsfmElementType,
    /// Marker that opened it, `None` for tables
    pub marker: Option<String>,
    /// Attributes of the opening token
    pub attributes: Vec<UsfmAttribute>,
    /// Whether an explicit end marker closed it
    pub is_closed: bool,
}

impl UsfmParserElement {
    /// Create an element
    #[must_use]
    pub fn new(element_type: UsfmElementType, marker: Option<&str>) -> Self {
        Self {
            element_type,
            marker: marker.map(str::to_string),
            attributes: Vec::new(),
            is_closed: false,
        }
    }

    /// Attach attributes
    #[must_use]
    pub fn with_attributes(mut self, attributes: &[UsfmAttribute]) -> Self {
        self.attributes = attributes.to_vec();
        self
    }

    /// Opening marker, empty for tables
    #[must_use]
    pub fn marker_str(&self) -> &str {
        self.marker.as_deref().unwrap_or_default()
    }
}

/// State of a parse in progress
pub struct UsfmParserState<'a> {
    /// Marker definitions
    pub(crate) stylesheet: &'a UsfmStylesheet,
    /// Tokens being parsed
    pub(crate) tokens: Vec<UsfmToken>,
    /// Index of the current token, `None` before the first one
    pub(crate) index: Option<usize>,
    /// Open elements, outermost first
    pub(crate) stack: Vec<UsfmParserElement>,
    /// Current verse
    pub(crate) verse_ref: VerseRef,
    /// Characters from the start of the verse to the current token
    pub(crate) verse_offset: usize,
    /// Whether the current token belongs to an indivisible group
    pub(crate) special_token: bool,
    /// Number of tokens after the current one consumed with it
    pub(crate) special_token_count: usize,
}

impl<'a> UsfmParserState<'a> {
    /// Create state over a token list
    #[must_use]
    pub fn new(stylesheet: &'a UsfmStylesheet, tokens: Vec<UsfmToken>) -> Self {
        Self {
            stylesheet,
            tokens,
            index: None,
            stack: Vec::new(),
            verse_ref: VerseRef::default(),
            verse_offset: 0,
            special_token: false,
            special_token_count: 0,
        }
    }

    /// Marker definitions
    #[must_use]
    pub const fn stylesheet(&self) -> &'a UsfmStylesheet {
        self.stylesheet
    }

    /// All tokens
    #[must_use]
    pub fn tokens(&self) -> &[UsfmToken] {
        &self.tokens
    }

    /// Index of the current token
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Current token
    #[must_use]
    pub fn token(&self) -> Option<&UsfmToken> {
        self.index.and_then(|index| self.tokens.get(index))
    }

    /// Token before the current one
    #[must_use]
    pub fn prev_token(&self) -> Option<&UsfmToken> {
        self.index
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| self.tokens.get(index))
    }

    /// Open elements, outermost first
    #[must_use]
    pub fn stack(&self) -> &[UsfmParserElement] {
        &self.stack
    }

    /// Current verse
    #[must_use]
    pub const fn verse_ref(&self) -> &VerseRef {
        &self.verse_ref
    }

    /// Characters from the start of the verse to the current token
    #[must_use]
    pub const fn verse_offset(&self) -> usize {
        self.verse_offset
    }

    /// Whether the current token is part of an indivisible group
    #[must_use]
    pub const fn special_token(&self) -> bool {
        self.special_token
    }

    /// Tokens after the current one consumed together with it
    #[must_use]
    pub const fn special_token_count(&self) -> usize {
        self.special_token_count
    }

    /// Source line of the current token
    #[must_use]
    pub fn line(&self) -> usize {
        self.token().map_or(0, |token| token.line)
    }

    /// Source column of the current token
    #[must_use]
    pub fn column(&self) -> usize {
        self.token().map_or(0, |token| token.column)
    }

    /// Innermost paragraph-like tag
    ///
    /// Books, table rows and sidebars count as paragraphs.
    #[must_use]
    pub fn para_tag(&self) -> Option<Cow<'a, UsfmTag>> {
        self.stack
            .iter()
            .rev()
            .find(|element| {
                matches!(
                    element.element_type,
                    UsfmElementType::Para
                        | UsfmElementType::Book
                        | UsfmElementType::Row
                        | UsfmElementType::Sidebar
                )
            })
            .map(|element| self.stylesheet.get_tag(element.marker_str()))
    }

    /// Character tags on top of the stack, innermost first
    #[must_use]
    pub fn char_tags(&self) -> Vec<Cow<'a, UsfmTag>> {
        self.stack
            .iter()
            .rev()
            .take_while(|element| element.element_type == UsfmElementType::Char)
            .map(|element| self.stylesheet.get_tag(element.marker_str()))
            .collect()
    }

    /// Innermost character tag
    #[must_use]
    pub fn char_tag(&self) -> Option<Cow<'a, UsfmTag>> {
        self.stack
            .last()
            .filter(|element| element.element_type == UsfmElementType::Char)
            .map(|element| self.stylesheet.get_tag(element.marker_str()))
    }

    /// Innermost note tag
    #[must_use]
    pub fn note_tag(&self) -> Option<Cow<'a, UsfmTag>> {
        self.stack
            .iter()
            .rev()
            .find(|element| element.element_type == UsfmElementType::Note)
            .map(|element| self.stylesheet.get_tag(element.marker_str()))
    }

    /// Whether the current paragraph holds verse text
    ///
    /// Text with no paragraph at all (just `\c` and `\v`) is verse text.
    #[must_use]
    pub fn is_verse_para(&self) -> bool {
        self.para_tag()
            .map_or(true, |tag| tag.text_type.is_verse_text())
    }

    /// Whether text at this point is verse text
    #[must_use]
    pub fn is_verse_text(&self) -> bool {
        if self.verse_ref.verse_num() == 0 {
            return false;
        }
        if self.stack.iter().any(|element| {
            matches!(
                element.element_type,
                UsfmElementType::Sidebar | UsfmElementType::Note
            )
        }) {
            return false;
        }
        self.is_verse_para()
            && self
                .char_tags()
                .iter()
                .all(|tag| tag.text_type.is_verse_text())
    }

    /// Whether text at this point is publishable
    #[must_use]
    pub fn is_publishable(&self) -> bool {
        if self.special_token {
            return false;
        }
        if self
            .para_tag()
            .is_some_and(|tag| tag.has(TextProperties::NONPUBLISHABLE))
        {
            return false;
        }
        !self
            .char_tags()
            .iter()
            .any(|tag| tag.has(TextProperties::NONPUBLISHABLE))
    }

    /// Whether the current token is special text such as link targets
    #[must_use]
    pub const fn is_special_text(&self) -> bool {
        self.special_token
    }

    /// Whether the innermost character style is a figure
    #[must_use]
    pub fn is_figure(&self) -> bool {
        self.stack.last().is_some_and(|element| {
            element.element_type == UsfmElementType::Char && element.marker_str() == "fig"
        })
    }

    /// Innermost element
    pub(crate) fn peek(&self) -> Option<&UsfmParserElement> {
        self.stack.last()
    }

    /// Element type of the innermost element
    pub(crate) fn peek_type(&self) -> Option<UsfmElementType> {
        self.stack.last().map(|element| element.element_type)
    }

    /// Whether any open element has the given type
    pub(crate) fn has_open(&self, element_type: UsfmElementType) -> bool {
        self.stack
            .iter()
            .any(|element| element.element_type == element_type)
    }
}

impl core::fmt::Debug for UsfmParserState<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UsfmParserState")
            .field("index", &self.index)
            .field("stack", &self.stack)
            .field("verse_ref", &self.verse_ref)
            .field("verse_offset", &self.verse_offset)
            .field("special_token", &self.special_token)
            .finish_non_exhaustive()
    }
}
