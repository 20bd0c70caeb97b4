//! Scripture reference tracking layered on parser events
//!
//! [`ScriptureRefTracker`] turns raw parser events into addressed text
//! spans. Handlers own a tracker, forward the events they receive and act on
//! the returned [`ScriptureTextEvent`]s:
//!
//! - verse text is addressed by one [`ScriptureRef`] per verse of a bridge
//! - non-verse text (headings, introductions, table cells) is addressed by
//!   the preceding verse plus a path such as `MAT 1:1/1:s`
//! - notes and figures are embeds addressed as `MAT 1:1/1:f`
//!
//! # Example
//!
//! ```rust
//! use usfm_core::handlers::{ScriptureRefTracker, ScriptureTextEvent};
//! use usfm_core::parser::{parse_usfm, UsfmParserHandler, UsfmParserState};
//! use usfm_core::stylesheet::UsfmStylesheet;
//!
//! #[derive(Default)]
//! struct VerseStarts {
//!     tracker: ScriptureRefTracker,
//!     refs: Vec<String>,
//! }
//!
//! impl UsfmParserHandler for VerseStarts {
//!     fn verse(&mut self, state: &UsfmParserState<'_>, number: &str, marker: &str, _: Option<&str>, _: Option<&str>) {
//!         for event in self.tracker.verse(state, number, marker) {
//!             if let ScriptureTextEvent::StartVerse(refs) = event {
//!                 self.refs.extend(refs.iter().map(ToString::to_string));
//!             }
//!         }
//!     }
//! }
//!
//! let stylesheet = UsfmStylesheet::default();
//! let mut handler = VerseStarts::default();
//! parse_usfm("\\id MAT\n\\c 1\n\\p\n\\v 1 One\n\\v 2-3 Two\n", &stylesheet, &mut handler);
//! assert_eq!(handler.refs, ["MAT 1:1", "MAT 1:2", "MAT 1:3"]);
//! ```

use crate::parser::UsfmParserState;
use crate::scripture::{merge_verse_ranges, ScriptureElement, ScriptureRef, VerseRef};
use log::trace;

/// Markers whose content is addressed as an embed
const EMBED_STYLES: [&str; 4] = ["f", "fe", "x", "fig"];

/// Kind of text currently being tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScriptureTextType {
    /// Outside any addressed span
    #[default]
    None,
    /// Headings, introductions, cells and other non-verse paragraphs
    NonVerse,
    /// Verse text
    Verse,
    /// Notes and figures
    Embed,
}

/// Start or end of an addressed text span
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptureTextEvent {
    /// Verse text starts; one reference per verse of a bridge
    StartVerse(Vec<ScriptureRef>),
    /// Verse text ends
    EndVerse(Vec<ScriptureRef>),
    /// Non-verse text starts
    StartNonVerse(ScriptureRef),
    /// Non-verse text ends
    EndNonVerse(ScriptureRef),
    /// Note or figure starts
    StartEmbed(ScriptureRef),
    /// Note or figure ends
    EndEmbed(ScriptureRef),
}

impl ScriptureTextEvent {
    /// Whether the event opens a span
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(
            self,
            Self::StartVerse(_) | Self::StartNonVerse(_) | Self::StartEmbed(_)
        )
    }

    /// References of the span
    #[must_use]
    pub fn refs(&self) -> &[ScriptureRef] {
        match self {
            Self::StartVerse(refs) | Self::EndVerse(refs) => refs,
            Self::StartNonVerse(scripture_ref)
            | Self::EndNonVerse(scripture_ref)
            | Self::StartEmbed(scripture_ref)
            | Self::EndEmbed(scripture_ref) => core::slice::from_ref(scripture_ref),
        }
    }
}

/// Whether a marker is a note or figure style
fn is_embed_style(marker: &str) -> bool {
    EMBED_STYLES.contains(&marker.trim_end_matches('*'))
}

/// Whether a marker is reserved for private use
fn is_private_use_marker(marker: &str) -> bool {
    marker.starts_with('z')
}

/// Tracks the current scripture reference across parser events
///
/// Every method mirrors the [`UsfmParserHandler`](crate::parser::UsfmParserHandler)
/// method of the same name and returns the span events it causes, in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptureRefTracker {
    /// Verse (or merged bridge) being addressed
    cur_verse_ref: VerseRef,
    /// Path elements, outermost first
    cur_elements: Vec<ScriptureElement>,
    /// Open span kinds, innermost last
    cur_text_type: Vec<ScriptureTextType>,
    /// Whether the current verse repeats the previous one
    duplicate_verse: bool,
}

impl ScriptureRefTracker {
    /// Create a tracker outside any span
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open span kind
    #[must_use]
    pub fn current_text_type(&self) -> ScriptureTextType {
        self.cur_text_type
            .last()
            .copied()
            .unwrap_or(ScriptureTextType::None)
    }

    /// Verse currently addressed
    #[must_use]
    pub const fn current_verse_ref(&self) -> &VerseRef {
        &self.cur_verse_ref
    }

    /// Whether content is being skipped as a repeated verse
    #[must_use]
    pub const fn is_duplicate_verse(&self) -> bool {
        self.duplicate_verse
    }

    /// Document ends
    pub fn end_usfm(&mut self) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.end_verse_text(&mut events);
        events
    }

    /// Book starts
    ///
    /// A book that follows a chapter no longer has an open book element,
    /// so the previous book's verse text is ended here.
    pub fn start_book(&mut self) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.end_verse_text(&mut events);
        events
    }

    /// Book ends; verse text never spans books
    pub fn end_book(&mut self) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.end_verse_text(&mut events);
        events
    }

    /// Chapter marker
    pub fn chapter(&mut self, state: &UsfmParserState<'_>, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.end_verse_text(&mut events);
        self.update_verse_ref(state.verse_ref().clone(), marker);
        events
    }

    /// Verse marker
    ///
    /// A repeat of the current verse ends its text once and suppresses the
    /// repeat. A bridge overlapping the current verse extends it.
    pub fn verse(
        &mut self,
        state: &UsfmParserState<'_>,
        number: &str,
        marker: &str,
    ) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if *state.verse_ref() == self.cur_verse_ref {
            if !self.duplicate_verse && self.cur_verse_ref.verse_num() > 0 {
                trace!("Ignoring repeated verse {}", self.cur_verse_ref);
                events.push(ScriptureTextEvent::EndVerse(self.create_verse_refs()));
                self.duplicate_verse = true;
            }
        } else if VerseRef::are_overlapping_verse_ranges(number, self.cur_verse_ref.verse()) {
            let mut verse_ref = self.cur_verse_ref.clone();
            verse_ref.set_verse(merge_verse_ranges(number, self.cur_verse_ref.verse()));
            self.update_verse_ref(verse_ref, marker);
        } else {
            if self.current_text_type() == ScriptureTextType::NonVerse {
                self.end_non_verse_text(&mut events);
            } else {
                self.end_verse_text(&mut events);
            }
            self.update_verse_ref(state.verse_ref().clone(), marker);
            self.start_verse_text(&mut events);
        }
        events
    }

    /// Paragraph starts
    pub fn start_para(&mut self, state: &UsfmParserState<'_>, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if is_private_use_marker(marker) {
            return events;
        }
        if self.cur_verse_ref.is_default() {
            self.update_verse_ref(state.verse_ref().clone(), marker);
        }
        if !state.is_verse_text() {
            self.start_parent_element(marker);
            self.start_non_verse_text(&mut events);
        }
        events
    }

    /// Paragraph ends
    ///
    /// A verse paragraph closing with nothing open becomes an empty
    /// non-verse span so it stays addressable.
    pub fn end_para(&mut self, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if is_private_use_marker(marker) {
            return events;
        }
        match self.current_text_type() {
            ScriptureTextType::NonVerse => {
                self.end_parent_element();
                self.end_non_verse_text(&mut events);
            }
            ScriptureTextType::None => {
                self.start_parent_element(marker);
                self.start_non_verse_text(&mut events);
                self.end_parent_element();
                self.end_non_verse_text(&mut events);
            }
            ScriptureTextType::Verse | ScriptureTextType::Embed => {}
        }
        events
    }

    /// Table row starts
    pub fn start_row(&mut self, marker: &str) {
        if self.outside_verse() {
            self.start_parent_element(marker);
        }
    }

    /// Table row ends
    pub fn end_row(&mut self) {
        if self.outside_verse() {
            self.end_parent_element();
        }
    }

    /// Table cell starts
    pub fn start_cell(&mut self, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if self.outside_verse() {
            self.start_parent_element(marker);
            self.start_non_verse_text(&mut events);
        }
        events
    }

    /// Table cell ends
    pub fn end_cell(&mut self) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if self.current_text_type() == ScriptureTextType::NonVerse {
            self.end_parent_element();
            self.end_non_verse_text(&mut events);
        }
        events
    }

    /// Sidebar starts
    pub fn start_sidebar(&mut self, marker: &str) {
        self.start_parent_element(marker);
    }

    /// Sidebar ends
    pub fn end_sidebar(&mut self) {
        self.end_parent_element();
    }

    /// Text; blank text never opens a span
    pub fn text(&mut self, state: &UsfmParserState<'_>, text: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if !text.trim().is_empty() {
            self.check_convert_verse_para_to_non_verse(state, &mut events);
        }
        events
    }

    /// Optional break
    pub fn opt_break(&mut self, state: &UsfmParserState<'_>) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.check_convert_verse_para_to_non_verse(state, &mut events);
        events
    }

    /// Character style starts; figures open an embed
    pub fn start_char(&mut self, state: &UsfmParserState<'_>, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if is_private_use_marker(marker) {
            return events;
        }
        self.check_convert_verse_para_to_non_verse(state, &mut events);
        if is_embed_style(marker) {
            self.start_embed_text(state, marker, &mut events);
        }
        events
    }

    /// Character style ends
    pub fn end_char(&mut self, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        if !is_private_use_marker(marker) && is_embed_style(marker) {
            self.end_embed_text(&mut events);
        }
        events
    }

    /// Note starts
    pub fn start_note(&mut self, state: &UsfmParserState<'_>, marker: &str) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.start_embed_text(state, marker, &mut events);
        events
    }

    /// Note ends
    pub fn end_note(&mut self) -> Vec<ScriptureTextEvent> {
        let mut events = Vec::new();
        self.end_embed_text(&mut events);
        events
    }

    /// Whether rows and cells are outside verse text
    fn outside_verse(&self) -> bool {
        matches!(
            self.current_text_type(),
            ScriptureTextType::NonVerse | ScriptureTextType::None
        )
    }

    fn start_verse_text(&mut self, events: &mut Vec<ScriptureTextEvent>) {
        self.duplicate_verse = false;
        self.cur_text_type.push(ScriptureTextType::Verse);
        events.push(ScriptureTextEvent::StartVerse(self.create_verse_refs()));
    }

    fn end_verse_text(&mut self, events: &mut Vec<ScriptureTextEvent>) {
        if self.cur_verse_ref.verse_num() == 0
            || self.current_text_type() != ScriptureTextType::Verse
        {
            return;
        }
        if !self.duplicate_verse {
            events.push(ScriptureTextEvent::EndVerse(self.create_verse_refs()));
        }
        self.cur_text_type.pop();
        self.duplicate_verse = false;
    }

    fn start_non_verse_text(&mut self, events: &mut Vec<ScriptureTextEvent>) {
        self.cur_text_type.push(ScriptureTextType::NonVerse);
        events.push(ScriptureTextEvent::StartNonVerse(self.create_non_verse_ref()));
    }

    fn end_non_verse_text(&mut self, events: &mut Vec<ScriptureTextEvent>) {
        self.end_embed_elements();
        events.push(ScriptureTextEvent::EndNonVerse(self.create_non_verse_ref()));
        self.cur_text_type.pop();
    }

    fn start_embed_text(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        events: &mut Vec<ScriptureTextEvent>,
    ) {
        if self.cur_verse_ref.is_default() {
            self.update_verse_ref(state.verse_ref().clone(), marker);
        }
        if self.duplicate_verse {
            return;
        }
        self.check_convert_verse_para_to_non_verse(state, events);
        self.next_element(marker);
        self.cur_text_type.push(ScriptureTextType::Embed);
        events.push(ScriptureTextEvent::StartEmbed(self.create_non_verse_ref()));
    }

    fn end_embed_text(&mut self, events: &mut Vec<ScriptureTextEvent>) {
        if !self.duplicate_verse && self.current_text_type() == ScriptureTextType::Embed {
            events.push(ScriptureTextEvent::EndEmbed(self.create_non_verse_ref()));
            self.cur_text_type.pop();
        }
    }

    /// Move to a new verse, resetting the path unless the verses overlap
    fn update_verse_ref(&mut self, verse_ref: VerseRef, marker: &str) {
        if !verse_ref.overlaps(&self.cur_verse_ref) {
            self.cur_elements.clear();
            self.cur_elements.push(ScriptureElement::new(0, marker));
        }
        self.cur_verse_ref = verse_ref;
    }

    /// Replace the innermost element with its next sibling
    fn next_element(&mut self, marker: &str) {
        let position = self.cur_elements.pop().map_or(0, |element| element.position);
        self.cur_elements
            .push(ScriptureElement::new(position + 1, marker));
    }

    fn start_parent_element(&mut self, marker: &str) {
        self.next_element(marker);
        self.cur_elements.push(ScriptureElement::new(0, marker));
    }

    fn end_parent_element(&mut self) {
        self.cur_elements.pop();
    }

    fn end_embed_elements(&mut self) {
        if self
            .cur_elements
            .last()
            .is_some_and(|element| is_embed_style(&element.name))
        {
            self.cur_elements.pop();
        }
    }

    fn create_verse_refs(&self) -> Vec<ScriptureRef> {
        if self.cur_verse_ref.has_multiple() {
            self.cur_verse_ref
                .all_verses()
                .into_iter()
                .map(ScriptureRef::verse)
                .collect()
        } else {
            vec![ScriptureRef::verse(self.cur_verse_ref.clone())]
        }
    }

    /// Last verse of a bridge plus the positioned path elements
    fn create_non_verse_ref(&self) -> ScriptureRef {
        let verse_ref = if self.cur_verse_ref.has_multiple() {
            self.cur_verse_ref
                .all_verses()
                .pop()
                .unwrap_or_else(|| self.cur_verse_ref.clone())
        } else {
            self.cur_verse_ref.clone()
        };
        let path = self
            .cur_elements
            .iter()
            .filter(|element| element.position > 0)
            .cloned()
            .collect();
        ScriptureRef::new(verse_ref, path)
    }

    /// Text before verse 1 in a verse paragraph is non-verse text
    fn check_convert_verse_para_to_non_verse(
        &mut self,
        state: &UsfmParserState<'_>,
        events: &mut Vec<ScriptureTextEvent>,
    ) {
        if self.current_text_type() != ScriptureTextType::None
            || self.cur_verse_ref.verse_num() != 0
            || !state.is_verse_para()
        {
            return;
        }
        let Some(para_tag) = state.para_tag() else {
            return;
        };
        if para_tag.marker != "tr" && !is_private_use_marker(&para_tag.marker) {
            self.start_parent_element(&para_tag.marker);
            self.start_non_verse_text(events);
        }
    }
}
