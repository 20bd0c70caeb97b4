//! Event parser for USFM token streams
//!
//! Walks a token list once, maintaining [`UsfmParserState`] and reporting
//! structural events to a [`UsfmParserHandler`]. Each token is processed in
//! two phases: elements it implicitly closes are popped first, then the
//! token itself is handled. Multi-token constructs such as alternate
//! chapter numbers (`\ca 2\ca*`) or `\ref` links are read ahead and consumed
//! as a unit.
//!
//! The parser never fails. Unknown markers become paragraphs (or character
//! styles inside notes) and unmatched end markers are reported through
//! [`UsfmParserHandler::unmatched`]. Every element opened is closed and
//! reported before [`UsfmParserHandler::end_usfm`].
//!
//! # Example
//!
//! ```rust
//! use usfm_core::parser::{UsfmParser, UsfmParserHandler, UsfmParserState};
//! use usfm_core::stylesheet::UsfmStylesheet;
//!
//! #[derive(Default)]
//! struct TextCollector(String);
//!
//! impl UsfmParserHandler for TextCollector {
//!     fn text(&mut self, state: &UsfmParserState<'_>, text: &str) {
//!         if state.is_verse_text() {
//!             self.0.push_str(text);
//!         }
//!     }
//! }
//!
//! let stylesheet = UsfmStylesheet::default();
//! let usfm = "\\id MAT\n\\c 1\n\\s Heading\n\\p\n\\v 1 In the beginning\n";
//! let mut parser = UsfmParser::new(&stylesheet, usfm, TextCollector::default());
//! parser.process_tokens();
//! assert_eq!(parser.into_handler().0, "In the beginning");
//! ```

mod handler;
mod state;

pub use handler::{HandlerChain, UsfmParserHandler};
pub use state::{UsfmElementType, UsfmParserElement, UsfmParserState};

use crate::scripture::canon::book_id_to_number;
use crate::stylesheet::UsfmStylesheet;
use crate::tokenizer::{tokenize, UsfmToken, UsfmTokenType};
use crate::utils::text::NO_BREAK_SPACE;
use log::{debug, trace};

/// Marker of table rows
const ROW_MARKER: &str = "tr";

/// Markers opening and closing sidebars
const SIDEBAR_MARKER: &str = "esb";
const SIDEBAR_END_MARKER: &str = "esbe";

/// Event parser over a token list
pub struct UsfmParser<'a, H: UsfmParserHandler> {
    /// Current state
    state: UsfmParserState<'a>,
    /// Event sink
    handler: H,
    /// Tokens still to be skipped because they were consumed in advance
    skip: usize,
    /// Whether `start_usfm` has been reported
    started: bool,
    /// Whether `end_usfm` has been reported
    finished: bool,
}

impl<'a, H: UsfmParserHandler> UsfmParser<'a, H> {
    /// Tokenize `usfm` and create a parser over it
    #[must_use]
    pub fn new(stylesheet: &'a UsfmStylesheet, usfm: &str, handler: H) -> Self {
        Self::with_options(stylesheet, usfm, handler, false)
    }

    /// Create a parser, optionally preserving whitespace while tokenizing
    #[must_use]
    pub fn with_options(
        stylesheet: &'a UsfmStylesheet,
        usfm: &str,
        handler: H,
        preserve_whitespace: bool,
    ) -> Self {
        let tokens = tokenize(stylesheet, usfm, preserve_whitespace);
        Self::from_tokens(stylesheet, tokens, handler)
    }

    /// Create a parser over existing tokens
    #[must_use]
    pub fn from_tokens(stylesheet: &'a UsfmStylesheet, tokens: Vec<UsfmToken>, handler: H) -> Self {
        Self {
            state: UsfmParserState::new(stylesheet, tokens),
            handler,
            skip: 0,
            started: false,
            finished: false,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &UsfmParserState<'a> {
        &self.state
    }

    /// Event sink
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// Event sink, mutably
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the parser and return the event sink
    #[must_use]
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Process every remaining token
    pub fn process_tokens(&mut self) {
        while self.process_token() {}
    }

    /// Process one token
    ///
    /// Returns `false` once the end of the token list has been reached and
    /// reported.
    pub fn process_token(&mut self) -> bool {
        if self.finished {
            return false;
        }
        if !self.started {
            self.started = true;
            self.handler.start_usfm(&self.state);
        }

        let index = self.state.index.map_or(0, |index| index + 1);
        if index >= self.state.tokens.len() {
            self.close_all();
            self.handler.end_usfm(&self.state);
            self.finished = true;
            return false;
        }

        self.state.index = Some(index);
        let prev_len = self
            .state
            .prev_token()
            .map_or(0, |prev| prev.to_usfm().chars().count());
        self.state.verse_offset += prev_len;
        self.state.special_token_count = 0;

        if self.skip > 0 {
            self.skip -= 1;
            self.state.special_token = true;
            return true;
        }
        self.state.special_token = false;

        let token = self.state.tokens[index].clone();
        trace!(
            "Token {} {:?} at {}:{}",
            token.token_type,
            token.marker.as_deref().or(token.text.as_deref()),
            token.line,
            token.column
        );

        let token_type = if token.token_type == UsfmTokenType::Unknown {
            debug!(
                "Unknown marker \\{} at {}:{}",
                token.marker.as_deref().unwrap_or_default(),
                token.line,
                token.column
            );
            self.unknown_token_type()
        } else {
            token.token_type
        };

        if let Some(marker) = token.marker.as_deref().filter(|m| !m.is_empty()) {
            self.handler.got_marker(&self.state, marker);
        }

        self.close_for(&token, token_type);
        self.handle(&token, token_type);
        true
    }

    /// Close the elements a token implicitly ends
    fn close_for(&mut self, token: &UsfmToken, token_type: UsfmTokenType) {
        let marker = token.marker.as_deref().unwrap_or_default();
        match token_type {
            UsfmTokenType::Book | UsfmTokenType::Chapter => self.close_all(),
            UsfmTokenType::Paragraph => {
                if marker == ROW_MARKER {
                    self.close_while(|element_type| {
                        !matches!(
                            element_type,
                            UsfmElementType::Table | UsfmElementType::Sidebar
                        )
                    });
                } else if marker == SIDEBAR_MARKER {
                    self.close_all();
                } else {
                    self.close_while(|element_type| element_type != UsfmElementType::Sidebar);
                }
            }
            UsfmTokenType::Character => {
                if self.is_cell(token, token_type) {
                    self.close_while(|element_type| element_type != UsfmElementType::Row);
                } else if self.ref_lookahead(token).is_some() {
                    // Links do not close anything
                } else if !token.is_nested() {
                    self.close_while(|element_type| element_type == UsfmElementType::Char);
                }
            }
            UsfmTokenType::Verse => {
                if self.state.is_verse_para() {
                    self.close_note(false);
                } else {
                    self.close_all();
                }
            }
            UsfmTokenType::Note => self.close_note(false),
            UsfmTokenType::End => self.close_end(marker),
            _ => {}
        }
    }

    /// Close the element an end marker refers to
    fn close_end(&mut self, marker: &str) {
        let closes_note = self.state.stack.iter().any(|element| {
            element.element_type == UsfmElementType::Note
                && marker.strip_suffix('*') == element.marker.as_deref()
        });
        if closes_note {
            self.close_note(true);
            return;
        }

        while self.state.peek_type() == Some(UsfmElementType::Char) {
            let len = self.state.stack.len();
            let plus_prefix =
                len >= 2 && self.state.stack[len - 2].element_type == UsfmElementType::Char;
            let matched = self.state.peek().is_some_and(|element| {
                let expected = element.marker_str();
                let rest = if plus_prefix {
                    marker.strip_prefix('+')
                } else {
                    Some(marker)
                };
                rest.and_then(|rest| rest.strip_suffix('*')) == Some(expected)
            });
            self.close_element(matched);
            if matched {
                return;
            }
        }

        let token = self.state.token();
        debug!(
            "Unmatched end marker \\{marker} at {}:{}",
            token.map_or(0, |t| t.line),
            token.map_or(0, |t| t.column)
        );
        self.handler.unmatched(&self.state, marker);
    }

    /// Handle the token itself
    fn handle(&mut self, token: &UsfmToken, token_type: UsfmTokenType) {
        let marker = token.marker.as_deref().unwrap_or_default();
        let data = token.data.as_deref().unwrap_or_default();
        match token_type {
            UsfmTokenType::Book => self.handle_book(marker, data),
            UsfmTokenType::Chapter => self.handle_chapter(marker, data),
            UsfmTokenType::Verse => self.handle_verse(marker, data),
            UsfmTokenType::Paragraph => self.handle_paragraph(token, marker),
            UsfmTokenType::Character => self.handle_character(token, token_type, marker),
            UsfmTokenType::Note => {
                let category = self.category_lookahead();
                self.state
                    .stack
                    .push(UsfmParserElement::new(UsfmElementType::Note, Some(marker)));
                self.state.special_token_count = self.skip;
                self.handler
                    .start_note(&self.state, marker, data, category.as_deref());
            }
            UsfmTokenType::Text => self.handle_text(token),
            UsfmTokenType::Milestone | UsfmTokenType::MilestoneEnd => {
                self.handler.milestone(
                    &self.state,
                    marker,
                    token_type == UsfmTokenType::Milestone,
                    token.attributes(),
                );
            }
            UsfmTokenType::End | UsfmTokenType::Attribute | UsfmTokenType::Unknown => {}
        }
    }

    /// `\id` and other book markers
    fn handle_book(&mut self, marker: &str, data: &str) {
        self.state
            .stack
            .push(UsfmParserElement::new(UsfmElementType::Book, Some(marker)));
        let code = data.to_uppercase();
        let verse_ref = &mut self.state.verse_ref;
        if verse_ref.book_num == 0 {
            verse_ref.book_num = book_id_to_number(&code);
        }
        verse_ref.chapter_num = 1;
        verse_ref.set_verse_num(0);
        self.state.verse_offset = 0;
        self.handler.start_book(&self.state, marker, &code);
    }

    /// `\c` with optional `\ca N\ca*` and `\cp X`
    fn handle_chapter(&mut self, marker: &str, data: &str) {
        let mut alt_chapter = None;
        let mut pub_chapter = None;
        if let Some(alt) = self.delimited_lookahead("ca", 0) {
            alt_chapter = Some(alt);
            self.skip += 3;
            let blank = self
                .lookahead(self.skip + 1)
                .and_then(|t| t.text.as_deref())
                .is_some_and(|text| text.trim().is_empty());
            if blank {
                self.skip += 1;
            }
        }
        let has_pub = self.lookahead(self.skip + 1).and_then(|t| t.marker.as_deref()) == Some("cp");
        if has_pub {
            if let Some(text) = self.lookahead(self.skip + 2).and_then(|t| t.text.as_deref()) {
                pub_chapter = Some(text.trim().to_string());
                self.skip += 2;
            }
        }

        self.state.verse_ref.set_chapter(data);
        self.state.verse_ref.set_verse_num(0);
        // Chapter 1 keeps counting from the introduction
        if self.state.verse_ref.chapter_num != 1 {
            self.state.verse_offset = 0;
        }
        self.state.special_token_count = self.skip;
        self.handler.chapter(
            &self.state,
            data,
            marker,
            alt_chapter.as_deref(),
            pub_chapter.as_deref(),
        );
    }

    /// `\v` with optional `\va N\va*` and `\vp X\vp*`
    fn handle_verse(&mut self, marker: &str, data: &str) {
        let alt_verse = self.delimited_lookahead("va", 0);
        if alt_verse.is_some() {
            self.skip += 3;
        }
        let pub_verse = self.delimited_lookahead("vp", self.skip);
        if pub_verse.is_some() {
            self.skip += 3;
        }

        self.state.verse_ref.set_verse(data);
        self.state.verse_offset = 0;
        self.state.special_token_count = self.skip;
        self.handler.verse(
            &self.state,
            data,
            marker,
            alt_verse.as_deref(),
            pub_verse.as_deref(),
        );
    }

    /// Paragraphs, table rows and sidebars
    fn handle_paragraph(&mut self, token: &UsfmToken, marker: &str) {
        match marker {
            ROW_MARKER => {
                if !self.state.has_open(UsfmElementType::Table) {
                    self.state
                        .stack
                        .push(UsfmParserElement::new(UsfmElementType::Table, None));
                    self.handler.start_table(&self.state);
                }
                self.state
                    .stack
                    .push(UsfmParserElement::new(UsfmElementType::Row, Some(marker)));
                self.handler.start_row(&self.state, marker);
            }
            SIDEBAR_MARKER => {
                self.state
                    .stack
                    .push(UsfmParserElement::new(UsfmElementType::Sidebar, Some(marker)));
                let category = self.category_lookahead();
                self.state.special_token_count = self.skip;
                self.handler
                    .start_sidebar(&self.state, marker, category.as_deref());
            }
            SIDEBAR_END_MARKER => {
                if self.state.has_open(UsfmElementType::Sidebar) {
                    self.close_while(|element_type| element_type != UsfmElementType::Sidebar);
                    self.close_element(true);
                } else {
                    debug!("Unmatched \\esbe at {}:{}", token.line, token.column);
                    self.handler.unmatched(&self.state, marker);
                }
            }
            _ => {
                self.state.stack.push(
                    UsfmParserElement::new(UsfmElementType::Para, Some(marker))
                        .with_attributes(token.attributes()),
                );
                self.handler.start_para(
                    &self.state,
                    marker,
                    token.token_type == UsfmTokenType::Unknown,
                    token.attributes(),
                );
            }
        }
    }

    /// Character styles, table cells and links
    fn handle_character(&mut self, token: &UsfmToken, token_type: UsfmTokenType, marker: &str) {
        if self.is_cell(token, token_type) {
            let align = match marker.as_bytes().get(2) {
                Some(b'c') => "center",
                Some(b'r') => "end",
                _ => "start",
            };
            let base_marker = UsfmStylesheet::cell_range(marker).map_or(marker, |(base, _)| base);
            self.state
                .stack
                .push(UsfmParserElement::new(UsfmElementType::Cell, Some(base_marker)));
            self.handler
                .start_cell(&self.state, base_marker, align, token.col_span);
            return;
        }

        if let Some((display, target, skip)) = self.ref_lookahead(token) {
            self.state.special_token = true;
            self.skip += skip;
            self.state.special_token_count = self.skip;
            self.handler
                .reference(&self.state, marker, &display, &target);
            return;
        }

        let (actual_marker, invalid) = match marker.strip_prefix('+') {
            Some(stripped) if self.state.char_tag().is_some() => (stripped, false),
            Some(_) => (marker, true),
            None => (marker, false),
        };
        self.state.stack.push(
            UsfmParserElement::new(UsfmElementType::Char, Some(actual_marker))
                .with_attributes(token.attributes()),
        );
        self.handler.start_char(
            &self.state,
            actual_marker,
            token.token_type == UsfmTokenType::Unknown || invalid,
            token.attributes(),
        );
    }

    /// Text, with `~` as no-break space and `//` as optional breaks
    fn handle_text(&mut self, token: &UsfmToken) {
        let mut text = token.text_str();
        let strip_space = self.lookahead(1).map_or(true, |next| {
            matches!(
                next.token_type,
                UsfmTokenType::Paragraph | UsfmTokenType::Book | UsfmTokenType::Chapter
            )
        });
        if strip_space {
            text = text.strip_suffix(' ').unwrap_or(text);
        }
        let text = text.replace('~', &NO_BREAK_SPACE.to_string());
        for (position, piece) in text.split("//").enumerate() {
            if position > 0 {
                self.handler.opt_break(&self.state);
            }
            self.handler.text(&self.state, piece);
        }
    }

    /// Treat unknown markers as character styles inside notes
    fn unknown_token_type(&self) -> UsfmTokenType {
        if self.state.has_open(UsfmElementType::Note) {
            UsfmTokenType::Character
        } else {
            UsfmTokenType::Paragraph
        }
    }

    /// Token `offset` positions after the current one
    fn lookahead(&self, offset: usize) -> Option<&UsfmToken> {
        self.state
            .index
            .and_then(|index| self.state.tokens.get(index + offset))
    }

    /// Text of `\marker text\marker*` starting right after `offset`
    fn delimited_lookahead(&self, marker: &str, offset: usize) -> Option<String> {
        let opens = self.lookahead(offset + 1)?.marker.as_deref() == Some(marker);
        let text = self.lookahead(offset + 2)?.text.as_deref()?;
        let end = self.lookahead(offset + 3)?;
        let closes = end.marker.as_deref().and_then(|m| m.strip_suffix('*')) == Some(marker);
        (opens && closes).then(|| text.trim().to_string())
    }

    /// `\cat X\cat*` after the current token
    fn category_lookahead(&mut self) -> Option<String> {
        let category = self.delimited_lookahead("cat", 0)?;
        self.skip += 3;
        Some(category)
    }

    /// Display text, target and token count of a `\ref` link
    ///
    /// Accepts `\ref display|target\ref*` with the target kept in the text
    /// or parsed into the `loc` attribute.
    fn ref_lookahead(&self, token: &UsfmToken) -> Option<(String, String, usize)> {
        if token.marker.as_deref() != Some("ref") {
            return None;
        }
        let end_marker = token.end_marker.as_deref()?;
        let text = self.lookahead(1)?;
        if text.token_type != UsfmTokenType::Text {
            return None;
        }
        let ends_at = |offset: usize| {
            self.lookahead(offset).is_some_and(|t| {
                t.token_type == UsfmTokenType::End && t.marker.as_deref() == Some(end_marker)
            })
        };

        if let Some((display, target)) = text.text_str().split_once('|') {
            return ends_at(2).then(|| (display.to_string(), target.to_string(), 2));
        }
        let attribute = self.lookahead(2)?;
        if attribute.token_type == UsfmTokenType::Attribute && ends_at(3) {
            let target = token.get_attribute("loc")?;
            return Some((text.text_str().to_string(), target.to_string(), 3));
        }
        None
    }

    /// Whether a character token is a table cell inside a row
    fn is_cell(&self, token: &UsfmToken, token_type: UsfmTokenType) -> bool {
        token_type == UsfmTokenType::Character
            && token
                .marker
                .as_deref()
                .is_some_and(|m| m.starts_with("th") || m.starts_with("tc"))
            && self.state.has_open(UsfmElementType::Row)
    }

    /// Close every open element
    fn close_all(&mut self) {
        while !self.state.stack.is_empty() {
            self.close_element(false);
        }
    }

    /// Close elements while the innermost one satisfies `predicate`
    fn close_while(&mut self, predicate: impl Fn(UsfmElementType) -> bool) {
        while self.state.peek_type().is_some_and(&predicate) {
            self.close_element(false);
        }
    }

    /// Close everything up to and including the innermost note
    fn close_note(&mut self, closed: bool) {
        if !self.state.has_open(UsfmElementType::Note) {
            return;
        }
        self.close_while(|element_type| element_type != UsfmElementType::Note);
        self.close_element(closed);
    }

    /// Pop the innermost element and report it
    fn close_element(&mut self, closed: bool) {
        let Some(mut element) = self.state.stack.pop() else {
            return;
        };
        element.is_closed = closed;
        let marker = element.marker_str();
        let state = &self.state;
        match element.element_type {
            UsfmElementType::Book => self.handler.end_book(state, marker),
            UsfmElementType::Para => self.handler.end_para(state, marker),
            UsfmElementType::Char => {
                self.handler
                    .end_char(state, marker, &element.attributes, closed);
            }
            UsfmElementType::Note => self.handler.end_note(state, marker, closed),
            UsfmElementType::Table => self.handler.end_table(state),
            UsfmElementType::Row => self.handler.end_row(state, marker),
            UsfmElementType::Cell => self.handler.end_cell(state, marker),
            UsfmElementType::Sidebar => self.handler.end_sidebar(state, marker, closed),
        }
    }
}

impl<H: UsfmParserHandler + core::fmt::Debug> core::fmt::Debug for UsfmParser<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UsfmParser")
            .field("state", &self.state)
            .field("handler", &self.handler)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

/// Tokenize and parse `usfm`, reporting events to `handler`
pub fn parse_usfm<H: UsfmParserHandler + ?Sized>(
    usfm: &str,
    stylesheet: &UsfmStylesheet,
    handler: &mut H,
) {
    UsfmParser::new(stylesheet, usfm, handler).process_tokens();
}
