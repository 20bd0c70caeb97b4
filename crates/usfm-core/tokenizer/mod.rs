//! USFM tokenizer module
//!
//! Converts USFM text into a flat list of [`UsfmToken`]s using a stylesheet
//! to classify markers, and renders token lists back to text.
//!
//! Tokenization never fails: undefined markers become
//! [`UsfmTokenType::Unknown`] tokens, unterminated milestones degrade to
//! text and attribute text that cannot be parsed is kept verbatim.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::stylesheet::UsfmStylesheet;
//! use usfm_core::tokenizer::{UsfmTokenType, UsfmTokenizer};
//!
//! let stylesheet = UsfmStylesheet::default();
//! let tokenizer = UsfmTokenizer::new(&stylesheet);
//! let tokens = tokenizer.tokenize("\\id MAT\n\\c 1\n\\p\n\\v 1 Text", false);
//!
//! assert_eq!(tokens[0].token_type, UsfmTokenType::Book);
//! assert_eq!(tokens[0].data.as_deref(), Some("MAT"));
//! assert_eq!(tokens[3].token_type, UsfmTokenType::Verse);
//! assert_eq!(
//!     tokenizer.detokenize(&tokens, false),
//!     "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 Text\r\n"
//! );
//! ```

pub mod attributes;
pub mod scanner;
pub mod tokens;

pub use attributes::{parse_attribute_value, ParsedAttributes};
pub use scanner::CharNavigator;
pub use tokens::{RtlReferenceOrder, UsfmAttribute, UsfmToken, UsfmTokenType};

use crate::stylesheet::{TextProperties, UsfmStyleType, UsfmStylesheet};
use crate::utils::text::is_nonsemantic_whitespace;
use regex::Regex;
use std::sync::OnceLock;
use scanner::{
    before_end_marker, char_at, get_next_word, milestone_ended, next_backslash_from,
    next_marker_index, regularize_spaces,
};

/// Stylesheet-driven USFM tokenizer
#[derive(Debug, Clone, Copy)]
pub struct UsfmTokenizer<'s> {
    /// Marker definitions used for classification
    stylesheet: &'s UsfmStylesheet,
    /// Direction marks written into verse numbers on detokenize
    rtl_reference_order: RtlReferenceOrder,
}

impl<'s> UsfmTokenizer<'s> {
    /// Create a tokenizer over a stylesheet
    #[must_use]
    pub const fn new(stylesheet: &'s UsfmStylesheet) -> Self {
        Self {
            stylesheet,
            rtl_reference_order: RtlReferenceOrder::NotSet,
        }
    }

    /// Write direction marks into verse numbers when detokenizing
    #[must_use]
    pub const fn with_rtl_reference_order(mut self, order: RtlReferenceOrder) -> Self {
        self.rtl_reference_order = order;
        self
    }

    /// Reading order used for verse numbers
    #[must_use]
    pub const fn rtl_reference_order(&self) -> RtlReferenceOrder {
        self.rtl_reference_order
    }

    /// Stylesheet used for classification
    #[must_use]
    pub const fn stylesheet(&self) -> &'s UsfmStylesheet {
        self.stylesheet
    }

    /// Tokenize USFM text
    ///
    /// Unless `preserve_whitespace` is set, text runs are regularized and
    /// spaces are added before structural markers so the result survives a
    /// [`detokenize`] round trip unchanged.
    #[must_use]
    pub fn tokenize(&self, usfm: &str, preserve_whitespace: bool) -> Vec<UsfmToken> {
        let mut tokens: Vec<UsfmToken> = Vec::new();
        let mut navigator = CharNavigator::new(usfm);

        let mut index = 0;
        while index < usfm.len() {
            let next_marker = next_marker_index(usfm, index);

            if !usfm[index..].starts_with('\\') {
                let raw = &usfm[index..next_marker];
                let mut text = if preserve_whitespace {
                    raw.to_string()
                } else {
                    regularize_spaces(raw)
                };

                let (line, column) = navigator.advance_to(index);
                let attribute_token =
                    self.handle_attributes(usfm, preserve_whitespace, &mut tokens, next_marker, &mut text);

                if !text.is_empty() {
                    tokens.push(UsfmToken::text(text).at(line, column));
                }
                if let Some(attribute_token) = attribute_token {
                    let bar = raw.find('|').map_or(index, |pos| index + pos);
                    let (line, column) = navigator.advance_to(bar);
                    tokens.push(attribute_token.at(line, column));
                }

                index = next_marker;
                continue;
            }

            let (line, column) = navigator.advance_to(index);
            index += 1;
            let marker_start = index;
            while let Some(c) = char_at(usfm, index) {
                if c == '\\' || c == '|' {
                    break;
                }
                if c == '*' {
                    index += 1;
                    if let Some(next) = char_at(usfm, index) {
                        if is_nonsemantic_whitespace(next) && !preserve_whitespace {
                            index += next.len_utf8();
                        }
                    }
                    break;
                }
                if is_nonsemantic_whitespace(c) {
                    if !preserve_whitespace {
                        index += c.len_utf8();
                    }
                    break;
                }
                index += c.len_utf8();
            }
            let marker = usfm[marker_start..index].trim_end_matches(is_nonsemantic_whitespace);

            if marker == "*" {
                let prev = tokens.iter().rev().find(|t| {
                    t.token_type != UsfmTokenType::Text || !t.text_str().trim().is_empty()
                });
                if prev.is_some_and(|t| {
                    matches!(
                        t.token_type,
                        UsfmTokenType::Milestone | UsfmTokenType::MilestoneEnd
                    )
                }) {
                    if tokens
                        .last()
                        .is_some_and(|t| t.token_type == UsfmTokenType::Text)
                    {
                        tokens.pop();
                    }
                    continue;
                }
            }

            if !marker.ends_with('*') && !preserve_whitespace {
                index = scanner::skip_nonsemantic_whitespace(usfm, index);
            }

            let mut tag = self.stylesheet.get_tag(marker.trim_start_matches('+'));
            if marker.starts_with('+')
                && !matches!(tag.style_type, UsfmStyleType::Character | UsfmStyleType::End)
            {
                tag = self.stylesheet.get_tag(marker);
            }

            let end_marker = if tag.style_type == UsfmStyleType::Milestone {
                tag.end_marker.clone()
            } else {
                Some(format!("{marker}*"))
            };

            let token = match tag.style_type {
                UsfmStyleType::Character => {
                    if tag.has(TextProperties::VERSE) {
                        let number = get_next_word(usfm, &mut index, preserve_whitespace);
                        UsfmToken::new(UsfmTokenType::Verse, marker, None, None, Some(number.to_string()))
                    } else {
                        let mut token =
                            UsfmToken::new(UsfmTokenType::Character, marker, None, end_marker, None);
                        token.col_span = UsfmStylesheet::cell_range(marker.trim_start_matches('+'))
                            .map_or(0, |(_, span)| span);
                        token
                    }
                }
                UsfmStyleType::Paragraph => {
                    if tag.has(TextProperties::CHAPTER) {
                        let number = get_next_word(usfm, &mut index, preserve_whitespace);
                        UsfmToken::new(UsfmTokenType::Chapter, marker, None, None, Some(number.to_string()))
                    } else if tag.has(TextProperties::BOOK) {
                        let code = get_next_word(usfm, &mut index, preserve_whitespace);
                        UsfmToken::new(UsfmTokenType::Book, marker, None, None, Some(code.to_string()))
                    } else {
                        UsfmToken::new(UsfmTokenType::Paragraph, marker, None, end_marker, None)
                    }
                }
                UsfmStyleType::Note => {
                    let caller = get_next_word(usfm, &mut index, preserve_whitespace);
                    UsfmToken::new(UsfmTokenType::Note, marker, None, end_marker, Some(caller.to_string()))
                }
                UsfmStyleType::End => UsfmToken::new(UsfmTokenType::End, marker, None, None, None),
                UsfmStyleType::Unknown => {
                    if marker.ends_with('*') {
                        UsfmToken::new(UsfmTokenType::End, marker, None, None, None)
                    } else if marker == "esb" || marker == "esbe" {
                        UsfmToken::new(UsfmTokenType::Paragraph, marker, None, end_marker, None)
                    } else {
                        log::debug!("Unknown marker \\{marker} at {line}:{column}");
                        UsfmToken::new(
                            UsfmTokenType::Unknown,
                            marker,
                            None,
                            Some(format!("{marker}*")),
                            None,
                        )
                    }
                }
                UsfmStyleType::Milestone | UsfmStyleType::MilestoneEnd => {
                    if !milestone_ended(usfm, index) {
                        let end_of_text = next_backslash_from(usfm, index).unwrap_or(usfm.len());
                        let rest = &usfm[index..end_of_text];
                        let separator = if rest.is_empty() || rest.starts_with([' ', '|']) {
                            ""
                        } else {
                            " "
                        };
                        log::debug!("Unterminated milestone \\{marker} at {line}:{column}");
                        index = end_of_text;
                        UsfmToken::text(format!("\\{marker}{separator}{rest}"))
                    } else if tag.style_type == UsfmStyleType::Milestone {
                        UsfmToken::new(UsfmTokenType::Milestone, marker, None, end_marker, None)
                    } else {
                        UsfmToken::new(UsfmTokenType::MilestoneEnd, marker, None, None, None)
                    }
                }
            };
            log::trace!("{line}:{column} {} {}", token.token_type, token.to_usfm().trim_end());
            tokens.push(token.at(line, column));
        }

        if !preserve_whitespace {
            normalize_breaks(&mut tokens);
        }
        tokens
    }

    /// Render tokens back to USFM text
    #[must_use]
    pub fn detokenize(&self, tokens: &[UsfmToken], tokens_have_whitespace: bool) -> String {
        render(tokens, tokens_have_whitespace, self.rtl_reference_order)
    }

    /// Attach `|attributes` at the end of a text run to their start token
    ///
    /// Returns the separate Attribute token to emit for character styles.
    fn handle_attributes(
        &self,
        usfm: &str,
        preserve_whitespace: bool,
        tokens: &mut [UsfmToken],
        next_marker: usize,
        text: &mut String,
    ) -> Option<UsfmToken> {
        let bar = text.find('|')?;
        let matching = find_matching_start_marker(usfm, tokens, next_marker)?;

        let marker = tokens[matching].nestless_marker()?.to_string();
        let tag = self.stylesheet.get_tag(&marker);
        if !matches!(
            tag.style_type,
            UsfmStyleType::Character | UsfmStyleType::Milestone | UsfmStyleType::MilestoneEnd
        ) {
            return None;
        }

        let mut adjusted = text[..bar].to_string();
        let attributes_value = text[bar + 1..].to_string();
        if !tokens[matching].set_attributes(
            &attributes_value,
            tag.default_attribute_name.as_deref(),
            &mut adjusted,
            preserve_whitespace,
        ) {
            log::debug!("Attributes of \\{marker} kept as text: {attributes_value}");
            return None;
        }
        *text = adjusted;

        if tag.style_type != UsfmStyleType::Character {
            return None;
        }
        let mut attribute_token = UsfmToken::new(
            UsfmTokenType::Attribute,
            tag.marker.clone(),
            None,
            None,
            Some(attributes_value),
        );
        attribute_token.copy_attributes(&tokens[matching]);
        Some(attribute_token)
    }
}

/// Tokenize USFM text with the given stylesheet
#[must_use]
pub fn tokenize(stylesheet: &UsfmStylesheet, usfm: &str, preserve_whitespace: bool) -> Vec<UsfmToken> {
    UsfmTokenizer::new(stylesheet).tokenize(usfm, preserve_whitespace)
}

/// Render tokens as USFM text
///
/// Structural markers start a new `\r\n` line unless `tokens_have_whitespace`
/// is set, in which case the whitespace in text tokens is trusted and only
/// duplicate boundary spaces are removed. The result always ends with
/// exactly one `\r\n`.
#[must_use]
pub fn detokenize(tokens: &[UsfmToken], tokens_have_whitespace: bool) -> String {
    render(tokens, tokens_have_whitespace, RtlReferenceOrder::NotSet)
}

fn render(
    tokens: &[UsfmToken],
    tokens_have_whitespace: bool,
    rtl_reference_order: RtlReferenceOrder,
) -> String {
    let mut usfm = String::new();
    let mut prev_blank = true;
    let mut has_prev = false;

    for token in tokens {
        let rendered = token.to_usfm();
        let mut token_usfm = rendered.clone();
        match token.token_type {
            UsfmTokenType::Book | UsfmTokenType::Chapter | UsfmTokenType::Paragraph => {
                if !usfm.is_empty() {
                    if usfm.ends_with(' ') && ((has_prev && !prev_blank) || !tokens_have_whitespace) {
                        usfm.pop();
                    }
                    if !tokens_have_whitespace {
                        usfm.push_str("\r\n");
                    }
                }
            }
            UsfmTokenType::Verse => {
                if !usfm.is_empty() && !usfm.ends_with(['[', '(']) {
                    if usfm.ends_with(' ') && ((has_prev && !prev_blank) || !tokens_have_whitespace) {
                        usfm.pop();
                    }
                    if !tokens_have_whitespace {
                        usfm.push_str("\r\n");
                    }
                }
                if tokens_have_whitespace {
                    token_usfm = token_usfm.trim().to_string();
                }
                if let Some(mark) = rtl_reference_order.direction_mark() {
                    token_usfm = insert_direction_marks(&token_usfm, mark);
                }
            }
            UsfmTokenType::Text => {
                if tokens_have_whitespace && usfm.ends_with(' ') {
                    if (token_usfm.starts_with(' ') && has_prev && !prev_blank)
                        || token_usfm.starts_with("\r\n")
                    {
                        usfm.pop();
                    } else {
                        token_usfm = token_usfm.trim_start_matches(' ').to_string();
                    }
                }
            }
            _ => {}
        }

        prev_blank = rendered.trim().is_empty();
        has_prev = true;
        usfm.push_str(&token_usfm);
    }

    if usfm.starts_with(' ') {
        usfm.remove(0);
    }
    if usfm.starts_with("\r\n") {
        usfm.drain(..2);
    } else if usfm.starts_with('\r') {
        usfm.remove(0);
    }

    if usfm.ends_with(' ') {
        usfm.pop();
    }
    if !usfm.is_empty() && !usfm.ends_with('\n') {
        usfm.push_str("\r\n");
    }
    if usfm.len() > 3 && usfm.ends_with(" \r\n") {
        usfm.replace_range(usfm.len() - 3..usfm.len() - 2, "");
    }
    usfm
}

/// Verse part, separator and the digit that follows, with any direction
/// marks already present around them
const RTL_VERSE_PATTERN: &str =
    r"[\x{200E}\x{200F}]*(\d+\w?)[\x{200E}\x{200F}]*([\p{P}\p{S}])[\x{200E}\x{200F}]*(\d)";

fn rtl_verse_regex() -> Option<&'static Regex> {
    static RTL_VERSE: OnceLock<Option<Regex>> = OnceLock::new();
    RTL_VERSE
        .get_or_init(|| Regex::new(RTL_VERSE_PATTERN).ok())
        .as_ref()
}

/// Put `mark` between each verse part and the separator after it
///
/// Existing marks around the separator are replaced. The digit after the
/// separator starts the next search so `1-2,3` marks both separators.
fn insert_direction_marks(verse: &str, mark: char) -> String {
    let Some(regex) = rtl_verse_regex() else {
        return verse.to_string();
    };
    let mut marked = String::with_capacity(verse.len() + 6);
    let mut last = 0;
    let mut start = 0;
    while let Some(captures) = regex.captures_at(verse, start) {
        let (Some(whole), Some(part), Some(separator), Some(next)) = (
            captures.get(0),
            captures.get(1),
            captures.get(2),
            captures.get(3),
        ) else {
            break;
        };
        marked.push_str(&verse[last..whole.start()]);
        marked.push_str(part.as_str());
        marked.push(mark);
        marked.push_str(separator.as_str());
        last = next.start();
        start = next.start();
    }
    marked.push_str(&verse[last..]);
    marked
}

/// Find the token an attribute run belongs to
///
/// The run must be followed by an end marker. A bare `\*` matches a
/// directly preceding milestone; otherwise the closest unclosed start
/// marker is found by scanning backwards with a nesting counter.
fn find_matching_start_marker(usfm: &str, tokens: &[UsfmToken], next_marker: usize) -> Option<usize> {
    let expected = before_end_marker(usfm, next_marker)?;

    if expected.is_empty() {
        if let Some(last) = tokens.last() {
            if matches!(
                last.token_type,
                UsfmTokenType::Milestone | UsfmTokenType::MilestoneEnd
            ) {
                return Some(tokens.len() - 1);
            }
        }
    }

    let mut nesting = 0usize;
    for (i, token) in tokens.iter().enumerate().rev() {
        match token.token_type {
            UsfmTokenType::End => nesting += 1,
            UsfmTokenType::Text | UsfmTokenType::Attribute => {}
            _ => {
                if nesting == 0 {
                    return Some(i);
                }
                nesting -= 1;
            }
        }
    }
    None
}

/// Ensure structural markers are preceded by a space
///
/// `\p test\p here` needs a space after `test` and `\em test\em*\p` needs
/// a space token after `\em*` so the rendered text tokenizes identically.
fn normalize_breaks(tokens: &mut Vec<UsfmToken>) {
    let mut i = 1;
    while i < tokens.len() {
        let needs_break = match tokens[i].token_type {
            UsfmTokenType::Book | UsfmTokenType::Chapter | UsfmTokenType::Paragraph => true,
            UsfmTokenType::Verse => {
                let prev = &tokens[i - 1];
                !(prev.token_type == UsfmTokenType::Text && prev.text_str().ends_with(['(', '[']))
            }
            _ => false,
        };

        if needs_break {
            match tokens[i - 1].token_type {
                UsfmTokenType::Text => {
                    if let Some(text) = tokens[i - 1].text.as_mut() {
                        if !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
                UsfmTokenType::End => {
                    tokens.insert(i, UsfmToken::text(" "));
                    i += 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests;
