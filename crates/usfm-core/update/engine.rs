//! Rewrite engine
//!
//! [`UpdateUsfmParserHandler`] rebuilds a document token by token while a
//! [`ScriptureRefTracker`] reports where each addressable unit starts and
//! ends. Every unit collects its tokens into an [`UsfmUpdateBlock`]. When
//! the unit closes, the engine decides between the existing text and the
//! text of the rows that matched the unit, runs the block handlers and
//! writes the result to the enclosing unit or to the output.
//!
//! Units nest: a heading inside verse text is its own unit whose tokens are
//! merged back into the verse block at the heading marker. Notes and figures
//! are collected whole into one embed element of the enclosing unit.

use super::block::{UsfmUpdateBlock, UsfmUpdateBlockElement, UsfmUpdateBlockElementType};
use super::handler::{
    UpdateBlockHandlerRegistry, UsfmUpdateBlockErrorHandler, UsfmUpdateBlockHandlerError,
};
use super::options::{UpdateUsfmMarkerBehavior, UpdateUsfmOptions, UpdateUsfmTextBehavior};
use super::row::UpdateUsfmRow;
use crate::handlers::{ScriptureRefTracker, ScriptureTextEvent};
use crate::parser::{UsfmParser, UsfmParserHandler, UsfmParserState};
use crate::scripture::ScriptureRef;
use crate::stylesheet::UsfmStylesheet;
use crate::tokenizer::{UsfmAttribute, UsfmToken, UsfmTokenType, UsfmTokenizer};
use crate::utils::errors::Result;
use core::cmp::Ordering;
use core::fmt;
use log::{debug, info, trace};

/// Kind of an open block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    /// Text of the `\id` line
    Book,
    /// Verse, non-verse or cell unit
    Unit,
}

/// A block being collected
#[derive(Debug)]
struct BlockFrame {
    /// What the block is for
    kind: FrameKind,
    /// Collected tokens
    block: UsfmUpdateBlock,
    /// Row text tokens waiting to be used
    pending: Vec<UsfmToken>,
    /// Whether the unit sits in a preserved paragraph style
    preserved: bool,
}

impl BlockFrame {
    /// Create a frame
    fn new(kind: FrameKind, refs: Vec<ScriptureRef>) -> Self {
        Self {
            kind,
            block: UsfmUpdateBlock::new(refs),
            pending: Vec::new(),
            preserved: false,
        }
    }
}

/// Tokens of the note or figure being collected
#[derive(Debug, Default)]
struct EmbedCollector {
    /// Collected tokens
    tokens: Vec<UsfmToken>,
    /// Open embeds, 0 when not collecting
    depth: usize,
}

/// Parser handler that rewrites a document with replacement rows
///
/// # Example
///
/// ```rust
/// use usfm_core::stylesheet::UsfmStylesheet;
/// use usfm_core::update::{
///     UpdateUsfmOptions, UpdateUsfmParserHandler, UpdateUsfmRow, UpdateUsfmTextBehavior,
/// };
///
/// let rows = vec![UpdateUsfmRow::new(vec!["MAT 1:1".parse()?], "Hello")];
/// let options = UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew);
/// let usfm = UpdateUsfmParserHandler::new(rows, options)
///     .update("\\id MAT\n\\c 1\n\\p\n\\v 1 Original text\n", &UsfmStylesheet::default())?;
/// assert_eq!(usfm, "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 Hello\r\n");
/// # Ok::<(), usfm_core::utils::errors::CoreError>(())
/// ```
pub struct UpdateUsfmParserHandler {
    /// Replacement rows in reference order
    rows: Vec<UpdateUsfmRow>,
    /// Rewrite configuration
    options: UpdateUsfmOptions,
    /// Handlers run on every closed unit
    handlers: UpdateBlockHandlerRegistry,
    /// Decides whether handler failures are swallowed
    on_error: UsfmUpdateBlockErrorHandler,
    /// Unit boundaries
    tracker: ScriptureRefTracker,
    /// Output tokens
    tokens: Vec<UsfmToken>,
    /// Open blocks, innermost last
    frames: Vec<BlockFrame>,
    /// Note or figure being collected
    embed: EmbedCollector,
    /// Next row to match
    row_index: usize,
    /// Next source token to collect
    token_index: usize,
    /// Units closed
    unit_count: usize,
    /// Units that received row text
    replaced_count: usize,
    /// First escalated handler failure
    error: Option<UsfmUpdateBlockHandlerError>,
}

impl UpdateUsfmParserHandler {
    /// Create an engine for sorted rows
    #[must_use]
    pub fn new(rows: Vec<UpdateUsfmRow>, options: UpdateUsfmOptions) -> Self {
        Self {
            rows,
            options,
            handlers: UpdateBlockHandlerRegistry::new(),
            on_error: Box::new(|_| false),
            tracker: ScriptureRefTracker::new(),
            tokens: Vec::new(),
            frames: Vec::new(),
            embed: EmbedCollector::default(),
            row_index: 0,
            token_index: 0,
            unit_count: 0,
            replaced_count: 0,
            error: None,
        }
    }

    /// Run these block handlers on every unit
    #[must_use]
    pub fn with_handlers(mut self, handlers: UpdateBlockHandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Route handler failures through `on_error`; `true` swallows them
    #[must_use]
    pub fn with_error_handler(
        mut self,
        on_error: impl Fn(&UsfmUpdateBlockHandlerError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Box::new(on_error);
        self
    }

    /// Rewrite configuration
    #[must_use]
    pub const fn options(&self) -> &UpdateUsfmOptions {
        &self.options
    }

    /// Output tokens collected so far
    #[must_use]
    pub fn tokens(&self) -> &[UsfmToken] {
        &self.tokens
    }

    /// First handler failure that was not swallowed
    #[must_use]
    pub const fn error(&self) -> Option<&UsfmUpdateBlockHandlerError> {
        self.error.as_ref()
    }

    /// Render the output, with remarks after the identification lines
    #[must_use]
    pub fn get_usfm(&self, stylesheet: &UsfmStylesheet) -> String {
        let mut tokens = self.tokens.clone();
        if !self.options.remarks.is_empty() {
            let index = remark_insert_index(&tokens);
            let remarks = self.options.remarks.iter().flat_map(|remark| {
                [
                    UsfmToken::new(UsfmTokenType::Paragraph, "rem", None, None, None),
                    UsfmToken::text(remark.clone()),
                ]
            });
            tokens.splice(index..index, remarks);
        }
        UsfmTokenizer::new(stylesheet).detokenize(&tokens, false)
    }

    /// Render the output unless a handler failure was escalated
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UpdateBlockHandler`](crate::utils::errors::CoreError::UpdateBlockHandler)
    /// for the first escalated failure.
    pub fn into_usfm(self, stylesheet: &UsfmStylesheet) -> Result<String> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        Ok(self.get_usfm(stylesheet))
    }

    /// Parse `usfm` and return the rewritten text
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UpdateBlockHandler`](crate::utils::errors::CoreError::UpdateBlockHandler)
    /// when a handler failure is escalated.
    pub fn update(self, usfm: &str, stylesheet: &UsfmStylesheet) -> Result<String> {
        let mut parser = UsfmParser::new(stylesheet, usfm, self);
        parser.process_tokens();
        parser.into_handler().into_usfm(stylesheet)
    }

    /// Move source tokens up to the current one into the open block
    fn collect(&mut self, state: &UsfmParserState<'_>) {
        let Some(index) = state.index() else {
            return;
        };
        let tokens = state.tokens();
        let end = (index + state.special_token_count()).min(tokens.len().saturating_sub(1));
        while self.token_index <= end && self.token_index < tokens.len() {
            let token = tokens[self.token_index].clone();
            self.token_index += 1;
            if self.embed.depth > 0 {
                self.embed.tokens.push(token);
            } else if let Some(frame) = self.frames.last_mut() {
                frame.block.add_token(token);
            } else {
                self.tokens.push(token);
            }
        }
    }

    fn process_events(&mut self, state: &UsfmParserState<'_>, events: Vec<ScriptureTextEvent>) {
        for event in events {
            match event {
                ScriptureTextEvent::StartVerse(refs) => self.start_unit(state, refs),
                ScriptureTextEvent::StartNonVerse(scripture_ref) => {
                    self.start_unit(state, vec![scripture_ref]);
                }
                ScriptureTextEvent::EndVerse(refs) => self.end_unit(state, refs),
                ScriptureTextEvent::EndNonVerse(scripture_ref) => {
                    self.end_unit(state, vec![scripture_ref]);
                }
                ScriptureTextEvent::StartEmbed(_) => self.embed.depth += 1,
                ScriptureTextEvent::EndEmbed(_) => self.end_embed(),
            }
        }
    }

    /// Close spans, collect the marker itself, then open spans
    fn process_around_marker(
        &mut self,
        state: &UsfmParserState<'_>,
        events: Vec<ScriptureTextEvent>,
    ) {
        let (starts, ends): (Vec<_>, Vec<_>) =
            events.into_iter().partition(ScriptureTextEvent::is_start);
        self.process_events(state, ends);
        self.collect(state);
        self.process_events(state, starts);
    }

    fn start_unit(&mut self, state: &UsfmParserState<'_>, refs: Vec<ScriptureRef>) {
        let matched = self.advance_rows(&refs);
        let mut frame = BlockFrame::new(FrameKind::Unit, refs);
        frame.preserved = state
            .para_tag()
            .is_some_and(|tag| self.options.is_preserved_paragraph(&tag.marker));
        for row in matched.iter().map(|&index| &self.rows[index]) {
            frame.pending.push(UsfmToken::text(format!("{} ", row.text)));
            frame
                .block
                .metadata_mut()
                .extend(row.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        trace!(
            "Unit {} opened with {} row(s)",
            refs_string(frame.block.refs()),
            matched.len()
        );
        self.frames.push(frame);
    }

    fn end_unit(&mut self, state: &UsfmParserState<'_>, refs: Vec<ScriptureRef>) {
        if self.frames.last().map(|frame| frame.kind) != Some(FrameKind::Unit) {
            debug!("Unit end without an open unit at {}", refs_string(&refs));
            return;
        }
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let BlockFrame {
            mut block,
            pending,
            preserved,
            ..
        } = frame;
        block.update_refs(refs);
        self.unit_count += 1;

        let mut peeled = Vec::new();
        while block
            .elements()
            .last()
            .is_some_and(|element| element.element_type == UsfmUpdateBlockElementType::Paragraph)
        {
            peeled.extend(block.pop());
        }
        peeled.reverse();

        if !preserved {
            self.apply_text_behavior(state.stylesheet(), &mut block, pending);
        }
        let block = self.run_handlers(block);

        let mut tokens = block.get_tokens();
        tokens.extend(
            peeled
                .iter()
                .flat_map(|element| element.get_tokens().iter().cloned()),
        );
        self.emit(tokens);
    }

    /// Choose between existing and row text
    fn apply_text_behavior(
        &mut self,
        stylesheet: &UsfmStylesheet,
        block: &mut UsfmUpdateBlock,
        pending: Vec<UsfmToken>,
    ) {
        let has_existing = block.elements().iter().any(|element| {
            element.element_type == UsfmUpdateBlockElementType::Text
                && !element.text().trim().is_empty()
        });
        let use_new = !pending.is_empty()
            && match self.options.text_behavior {
                UpdateUsfmTextBehavior::PreferExisting => !has_existing,
                UpdateUsfmTextBehavior::PreferNew | UpdateUsfmTextBehavior::StripExisting => true,
            };
        let strip = use_new || self.options.text_behavior == UpdateUsfmTextBehavior::StripExisting;

        if strip {
            let options = &self.options;
            for element in block.elements_mut() {
                let remove = match element.element_type {
                    UsfmUpdateBlockElementType::Text => true,
                    UsfmUpdateBlockElementType::Style => {
                        options.style_behavior == UpdateUsfmMarkerBehavior::Strip
                    }
                    UsfmUpdateBlockElementType::Embed => {
                        options.embed_behavior == UpdateUsfmMarkerBehavior::Strip
                    }
                    UsfmUpdateBlockElementType::Paragraph => {
                        options.paragraph_behavior == UpdateUsfmMarkerBehavior::Strip
                            && is_verse_paragraph(stylesheet, element)
                    }
                    UsfmUpdateBlockElementType::Other => false,
                };
                element.marked_for_removal |= remove;
            }
        }

        if use_new {
            let position = block
                .elements()
                .iter()
                .position(|element| {
                    matches!(
                        element.element_type,
                        UsfmUpdateBlockElementType::Text
                            | UsfmUpdateBlockElementType::Style
                            | UsfmUpdateBlockElementType::Embed
                    )
                })
                .unwrap_or(block.elements().len());
            block.elements_mut().insert(
                position,
                UsfmUpdateBlockElement::new(UsfmUpdateBlockElementType::Text, pending),
            );
            self.replaced_count += 1;
        }
    }

    /// Run the handler chain, keeping the block unchanged once a failure escalated
    fn run_handlers(&mut self, block: UsfmUpdateBlock) -> UsfmUpdateBlock {
        if self.handlers.is_empty() || self.error.is_some() {
            return block;
        }
        match self.handlers.process_block(block.clone(), &*self.on_error) {
            Ok(processed) => processed,
            Err(error) => {
                debug!("Update handler failure escalated: {error}");
                self.error = Some(error);
                block
            }
        }
    }

    /// Hand tokens of a closed block to the enclosing block or the output
    fn emit(&mut self, tokens: Vec<UsfmToken>) {
        if tokens.is_empty() {
            return;
        }
        let Some(frame) = self.frames.last_mut() else {
            self.tokens.extend(tokens);
            return;
        };
        let last_type = frame.block.elements().last().map(|e| e.element_type);
        if last_type == Some(UsfmUpdateBlockElementType::Paragraph) {
            frame.block.extend_last_element(tokens);
        } else {
            frame.block.elements_mut().push(UsfmUpdateBlockElement::new(
                UsfmUpdateBlockElementType::Other,
                tokens,
            ));
        }
    }

    fn end_embed(&mut self) {
        self.embed.depth = self.embed.depth.saturating_sub(1);
        if self.embed.depth > 0 {
            return;
        }
        let tokens = core::mem::take(&mut self.embed.tokens);
        match self.frames.last_mut() {
            Some(frame) => frame.block.add_embed(tokens, false),
            None => self.tokens.extend(tokens),
        }
    }

    /// Rows matching any of `refs`, consuming rows behind them
    fn advance_rows(&mut self, refs: &[ScriptureRef]) -> Vec<usize> {
        let mut matched = Vec::new();
        let mut source_index = 0;
        while self.row_index < self.rows.len() && source_index < refs.len() {
            let mut compare = Ordering::Equal;
            for row_ref in &self.rows[self.row_index].refs {
                while source_index < refs.len() {
                    compare = row_ref.compare(&refs[source_index], self.options.compare_segments);
                    if compare == Ordering::Greater {
                        source_index += 1;
                    } else {
                        break;
                    }
                }
                if compare == Ordering::Equal {
                    matched.push(self.row_index);
                    break;
                }
            }
            if compare != Ordering::Greater {
                self.row_index += 1;
            }
        }
        matched
    }

    fn start_book_frame(&mut self) {
        self.frames.push(BlockFrame::new(FrameKind::Book, Vec::new()));
    }

    fn end_book_frame(&mut self) {
        if self.frames.last().map(|frame| frame.kind) != Some(FrameKind::Book) {
            return;
        }
        let Some(BlockFrame { mut block, .. }) = self.frames.pop() else {
            return;
        };
        if let Some(id_text) = &self.options.id_text {
            for element in block.elements_mut() {
                if element.element_type == UsfmUpdateBlockElementType::Text {
                    element.marked_for_removal = true;
                }
            }
            block.elements_mut().insert(
                0,
                UsfmUpdateBlockElement::new(
                    UsfmUpdateBlockElementType::Text,
                    vec![UsfmToken::text(format!("{id_text} "))],
                ),
            );
        }
        self.emit(block.get_tokens());
    }

    /// Write out anything still open at the end of the document
    fn flush(&mut self) {
        if self.embed.depth > 0 {
            self.embed.depth = 1;
            self.end_embed();
        }
        while let Some(frame) = self.frames.pop() {
            let tokens = frame.block.get_tokens();
            self.emit(tokens);
        }
    }
}

impl UsfmParserHandler for UpdateUsfmParserHandler {
    fn end_usfm(&mut self, state: &UsfmParserState<'_>) {
        let events = self.tracker.end_usfm();
        self.process_events(state, events);
        self.flush();
        self.collect(state);
        info!(
            "Rewrote {} of {} units ({} rows)",
            self.replaced_count,
            self.unit_count,
            self.rows.len()
        );
    }

    fn start_book(&mut self, state: &UsfmParserState<'_>, _marker: &str, _code: &str) {
        let events = self.tracker.start_book();
        self.process_events(state, events);
        self.collect(state);
        self.start_book_frame();
    }

    fn end_book(&mut self, state: &UsfmParserState<'_>, _marker: &str) {
        let events = self.tracker.end_book();
        self.process_events(state, events);
        self.end_book_frame();
    }

    fn chapter(
        &mut self,
        state: &UsfmParserState<'_>,
        _number: &str,
        marker: &str,
        _alt_number: Option<&str>,
        _pub_number: Option<&str>,
    ) {
        let events = self.tracker.chapter(state, marker);
        self.process_around_marker(state, events);
    }

    fn verse(
        &mut self,
        state: &UsfmParserState<'_>,
        number: &str,
        marker: &str,
        _alt_number: Option<&str>,
        _pub_number: Option<&str>,
    ) {
        let events = self.tracker.verse(state, number, marker);
        self.process_around_marker(state, events);
    }

    fn start_para(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        _unknown: bool,
        _attributes: &[UsfmAttribute],
    ) {
        self.collect(state);
        let events = self.tracker.start_para(state, marker);
        self.process_events(state, events);
    }

    fn end_para(&mut self, state: &UsfmParserState<'_>, marker: &str) {
        let events = self.tracker.end_para(marker);
        self.process_events(state, events);
    }

    fn start_char(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        _unknown: bool,
        _attributes: &[UsfmAttribute],
    ) {
        let events = self.tracker.start_char(state, marker);
        self.process_events(state, events);
        self.collect(state);
    }

    fn end_char(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        _attributes: &[UsfmAttribute],
        closed: bool,
    ) {
        if closed {
            self.collect(state);
        }
        let events = self.tracker.end_char(marker);
        self.process_events(state, events);
    }

    fn start_note(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        _caller: &str,
        _category: Option<&str>,
    ) {
        let events = self.tracker.start_note(state, marker);
        self.process_events(state, events);
        self.collect(state);
    }

    fn end_note(&mut self, state: &UsfmParserState<'_>, _marker: &str, closed: bool) {
        if closed {
            self.collect(state);
        }
        let events = self.tracker.end_note();
        self.process_events(state, events);
    }

    fn start_row(&mut self, state: &UsfmParserState<'_>, marker: &str) {
        self.collect(state);
        self.tracker.start_row(marker);
    }

    fn end_row(&mut self, _state: &UsfmParserState<'_>, _marker: &str) {
        self.tracker.end_row();
    }

    fn start_cell(&mut self, state: &UsfmParserState<'_>, marker: &str, _align: &str, _colspan: u32) {
        self.collect(state);
        let events = self.tracker.start_cell(marker);
        self.process_events(state, events);
    }

    fn end_cell(&mut self, state: &UsfmParserState<'_>, _marker: &str) {
        let events = self.tracker.end_cell();
        self.process_events(state, events);
    }

    fn text(&mut self, state: &UsfmParserState<'_>, text: &str) {
        let events = self.tracker.text(state, text);
        self.process_events(state, events);
        self.collect(state);
    }

    fn opt_break(&mut self, state: &UsfmParserState<'_>) {
        let events = self.tracker.opt_break(state);
        self.process_events(state, events);
        self.collect(state);
    }

    fn unmatched(&mut self, state: &UsfmParserState<'_>, _marker: &str) {
        self.collect(state);
    }

    fn reference(&mut self, state: &UsfmParserState<'_>, _marker: &str, _display: &str, _target: &str) {
        self.collect(state);
    }

    fn start_sidebar(&mut self, state: &UsfmParserState<'_>, marker: &str, _category: Option<&str>) {
        self.collect(state);
        self.tracker.start_sidebar(marker);
    }

    fn end_sidebar(&mut self, state: &UsfmParserState<'_>, _marker: &str, closed: bool) {
        if closed {
            self.collect(state);
        }
        self.tracker.end_sidebar();
    }

    fn milestone(
        &mut self,
        state: &UsfmParserState<'_>,
        _marker: &str,
        _is_start: bool,
        _attributes: &[UsfmAttribute],
    ) {
        self.collect(state);
    }
}

impl fmt::Debug for UpdateUsfmParserHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUsfmParserHandler")
            .field("options", &self.options)
            .field("rows", &self.rows.len())
            .field("row_index", &self.row_index)
            .field("handlers", &self.handlers)
            .field("open_blocks", &self.frames.len())
            .field("tokens", &self.tokens.len())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Rewrite `usfm` with sorted replacement rows
///
/// # Errors
///
/// Never fails without block handlers; see
/// [`UpdateUsfmParserHandler::update`] for handler failures.
///
/// # Example
///
/// ```rust
/// use usfm_core::stylesheet::UsfmStylesheet;
/// use usfm_core::update::{update_usfm, UpdateUsfmOptions, UpdateUsfmRow};
///
/// let rows = vec![UpdateUsfmRow::new(vec!["MAT 1:2".parse()?], "Filled in")];
/// let usfm = update_usfm(
///     "\\id MAT\n\\c 1\n\\p\n\\v 1 Kept\n\\v 2\n",
///     &UsfmStylesheet::default(),
///     rows,
///     UpdateUsfmOptions::default(),
/// )?;
/// assert_eq!(usfm, "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 Kept\r\n\\v 2 Filled in\r\n");
/// # Ok::<(), usfm_core::utils::errors::CoreError>(())
/// ```
pub fn update_usfm(
    usfm: &str,
    stylesheet: &UsfmStylesheet,
    rows: Vec<UpdateUsfmRow>,
    options: UpdateUsfmOptions,
) -> Result<String> {
    UpdateUsfmParserHandler::new(rows, options).update(usfm, stylesheet)
}

/// Whether a paragraph element opens verse text
fn is_verse_paragraph(stylesheet: &UsfmStylesheet, element: &UsfmUpdateBlockElement) -> bool {
    element
        .tokens
        .first()
        .and_then(|token| token.marker.as_deref())
        .is_some_and(|marker| stylesheet.get_tag(marker).text_type.is_verse_text())
}

/// Position after the `\id`, `\ide` and `\rem` lines
fn remark_insert_index(tokens: &[UsfmToken]) -> usize {
    tokens
        .iter()
        .position(|token| match token.token_type {
            UsfmTokenType::Paragraph => !matches!(token.marker.as_deref(), Some("ide" | "rem")),
            UsfmTokenType::Chapter | UsfmTokenType::Verse | UsfmTokenType::Unknown => true,
            _ => false,
        })
        .unwrap_or(tokens.len())
}

fn refs_string(refs: &[ScriptureRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
