//! Parser event sink
//!
//! [`UsfmParserHandler`] receives one call per structural event. Every
//! method defaults to doing nothing so handlers implement only what they
//! need. Several handlers can observe the same parse through a tuple or a
//! [`HandlerChain`].
//!
//! # Example
//!
//! ```rust
//! use usfm_core::parser::{parse_usfm, UsfmParserHandler, UsfmParserState};
//! use usfm_core::stylesheet::UsfmStylesheet;
//!
//! #[derive(Default)]
//! struct VerseCounter(usize);
//!
//! impl UsfmParserHandler for VerseCounter {
//!     fn verse(&mut self, _: &UsfmParserState<'_>, _: &str, _: &str, _: Option<&str>, _: Option<&str>) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let stylesheet = UsfmStylesheet::default();
//! let mut counter = VerseCounter::default();
//! parse_usfm("\\id MAT\n\\c 1\n\\p\n\\v 1 One\n\\v 2 Two\n", &stylesheet, &mut counter);
//! assert_eq!(counter.0, 2);
//! ```

use super::state::UsfmParserState;
use crate::tokenizer::UsfmAttribute;

/// Receives parse events
///
/// `state` reflects the parser after the event's element was pushed (for
/// starts) or popped (for ends).
#[allow(unused_variables)]
pub trait UsfmParserHandler {
    /// Parsing begins
    fn start_usfm(&mut self, state: &UsfmParserState<'_>) {}

    /// Parsing ends; every element has been closed
    fn end_usfm(&mut self, state: &UsfmParserState<'_>) {}

    /// Any token with a marker, before it is processed
    fn got_marker(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Book starts
    fn start_book(&mut self, state: &UsfmParserState<'_>, marker: &str, code: &str) {}

    /// Book ends
    fn end_book(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Chapter marker with optional alternate and publishable numbers
    fn chapter(
        &mut self,
        state: &UsfmParserState<'_>,
        number: &str,
        marker: &str,
        alt_number: Option<&str>,
        pub_number: Option<&str>,
    ) {
    }

    /// Verse marker with optional alternate and publishable numbers
    fn verse(
        &mut self,
        state: &UsfmParserState<'_>,
        number: &str,
        marker: &str,
        alt_number: Option<&str>,
        pub_number: Option<&str>,
    ) {
    }

    /// Paragraph starts; `unknown` for markers missing from the stylesheet
    fn start_para(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        unknown: bool,
        attributes: &[UsfmAttribute],
    ) {
    }

    /// Paragraph ends
    fn end_para(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Character style starts
    fn start_char(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        unknown: bool,
        attributes: &[UsfmAttribute],
    ) {
    }

    /// Character style ends; `closed` when an end marker closed it
    fn end_char(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        attributes: &[UsfmAttribute],
        closed: bool,
    ) {
    }

    /// Note starts
    fn start_note(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        caller: &str,
        category: Option<&str>,
    ) {
    }

    /// Note ends; `closed` when an end marker closed it
    fn end_note(&mut self, state: &UsfmParserState<'_>, marker: &str, closed: bool) {}

    /// Table starts
    fn start_table(&mut self, state: &UsfmParserState<'_>) {}

    /// Table ends
    fn end_table(&mut self, state: &UsfmParserState<'_>) {}

    /// Table row starts
    fn start_row(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Table row ends
    fn end_row(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Table cell starts; `align` is `start`, `center` or `end`
    fn start_cell(&mut self, state: &UsfmParserState<'_>, marker: &str, align: &str, colspan: u32) {}

    /// Table cell ends
    fn end_cell(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// Text
    fn text(&mut self, state: &UsfmParserState<'_>, text: &str) {}

    /// End marker with nothing to close
    fn unmatched(&mut self, state: &UsfmParserState<'_>, marker: &str) {}

    /// `\ref display|target\ref*` link
    fn reference(&mut self, state: &UsfmParserState<'_>, marker: &str, display: &str, target: &str) {}

    /// Sidebar starts
    fn start_sidebar(&mut self, state: &UsfmParserState<'_>, marker: &str, category: Option<&str>) {}

    /// Sidebar ends; `closed` when `\esbe` closed it
    fn end_sidebar(&mut self, state: &UsfmParserState<'_>, marker: &str, closed: bool) {}

    /// Optional line break (`//`)
    fn opt_break(&mut self, state: &UsfmParserState<'_>) {}

    /// Milestone start or end
    fn milestone(
        &mut self,
        state: &UsfmParserState<'_>,
        marker: &str,
        is_start: bool,
        attributes: &[UsfmAttribute],
    ) {
    }
}

/// Invoke `$m!` with the signature of every handler method after `state`
macro_rules! for_each_handler_method {
    ($m:ident) => {
        $m! {
            start_usfm();
            end_usfm();
            got_marker(marker: &str);
            start_book(marker: &str, code: &str);
            end_book(marker: &str);
            chapter(number: &str, marker: &str, alt_number: Option<&str>, pub_number: Option<&str>);
            verse(number: &str, marker: &str, alt_number: Option<&str>, pub_number: Option<&str>);
            start_para(marker: &str, unknown: bool, attributes: &[UsfmAttribute]);
            end_para(marker: &str);
            start_char(marker: &str, unknown: bool, attributes: &[UsfmAttribute]);
            end_char(marker: &str, attributes: &[UsfmAttribute], closed: bool);
            start_note(marker: &str, caller: &str, category: Option<&str>);
            end_note(marker: &str, closed: bool);
            start_table();
            end_table();
            start_row(marker: &str);
            end_row(marker: &str);
            start_cell(marker: &str, align: &str, colspan: u32);
            end_cell(marker: &str);
            text(text: &str);
            unmatched(marker: &str);
            reference(marker: &str, display: &str, target: &str);
            start_sidebar(marker: &str, category: Option<&str>);
            end_sidebar(marker: &str, closed: bool);
            opt_break();
            milestone(marker: &str, is_start: bool, attributes: &[UsfmAttribute]);
        }
    };
}

/// Forward every method to `**self`
macro_rules! forward_to_target {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, state: &UsfmParserState<'_>, $($arg: $ty),*) {
                (**self).$name(state, $($arg),*);
            }
        )*
    };
}

/// Forward every method to both tuple fields in order
macro_rules! forward_to_pair {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, state: &UsfmParserState<'_>, $($arg: $ty),*) {
                self.0.$name(state, $($arg),*);
                self.1.$name(state, $($arg),*);
            }
        )*
    };
}

/// Forward every method to all three tuple fields in order
macro_rules! forward_to_triple {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, state: &UsfmParserState<'_>, $($arg: $ty),*) {
                self.0.$name(state, $($arg),*);
                self.1.$name(state, $($arg),*);
                self.2.$name(state, $($arg),*);
            }
        )*
    };
}

/// Forward every method to each chained handler in order
macro_rules! forward_to_chain {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, state: &UsfmParserState<'_>, $($arg: $ty),*) {
                for handler in &mut self.handlers {
                    handler.$name(state, $($arg),*);
                }
            }
        )*
    };
}

/// Handler that ignores every event
impl UsfmParserHandler for () {}

impl<H: UsfmParserHandler + ?Sized> UsfmParserHandler for &mut H {
    for_each_handler_method!(forward_to_target);
}

impl<H: UsfmParserHandler + ?Sized> UsfmParserHandler for Box<H> {
    for_each_handler_method!(forward_to_target);
}

impl<A: UsfmParserHandler, B: UsfmParserHandler> UsfmParserHandler for (A, B) {
    for_each_handler_method!(forward_to_pair);
}

impl<A: UsfmParserHandler, B: UsfmParserHandler, C: UsfmParserHandler> UsfmParserHandler
    for (A, B, C)
{
    for_each_handler_method!(forward_to_triple);
}

/// Drives any number of borrowed handlers, in insertion order
#[derive(Default)]
pub struct HandlerChain<'h> {
    /// Handlers receiving every event
    handlers: Vec<&'h mut dyn UsfmParserHandler>,
}

impl<'h> HandlerChain<'h> {
    /// Create an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler
    #[must_use]
    pub fn with(mut self, handler: &'h mut dyn UsfmParserHandler) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Append a handler
    pub fn push(&mut self, handler: &'h mut dyn UsfmParserHandler) {
        self.handlers.push(handler);
    }

    /// Number of handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the chain is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl UsfmParserHandler for HandlerChain<'_> {
    for_each_handler_method!(forward_to_chain);
}

impl core::fmt::Debug for HandlerChain<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
