//! Update blocks: the editable unit handed to block handlers
//!
//! A block covers one addressable unit (a verse, a heading, a table cell)
//! and holds its tokens grouped into typed elements. Handlers edit the
//! block by replacing element tokens or marking elements for removal;
//! removed elements contribute nothing to [`UsfmUpdateBlock::get_tokens`].
//!
//! # Example
//!
//! ```rust
//! use usfm_core::scripture::ScriptureRef;
//! use usfm_core::tokenizer::UsfmToken;
//! use usfm_core::update::{UsfmUpdateBlock, UsfmUpdateBlockElementType};
//!
//! let mut block = UsfmUpdateBlock::new(vec!["MAT 1:1".parse::<ScriptureRef>()?]);
//! block.add_text(vec![UsfmToken::text("In the beginning ")]);
//! assert_eq!(block.elements()[0].element_type, UsfmUpdateBlockElementType::Text);
//! assert_eq!(block.get_tokens().len(), 1);
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

use crate::scripture::ScriptureRef;
use crate::tokenizer::{UsfmToken, UsfmTokenType};
use crate::utils::hashers::{create_hash_map, FastMap};
use core::fmt;

/// Role of an element within a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsfmUpdateBlockElementType {
    /// Plain text
    Text,
    /// A paragraph marker and whatever was merged into it
    Paragraph,
    /// A whole note or figure
    Embed,
    /// Character style markers, their attributes and end markers
    Style,
    /// Verse markers, milestones and anything else kept verbatim
    Other,
}

impl UsfmUpdateBlockElementType {
    /// Element type a token is stored as
    #[must_use]
    pub const fn for_token(token_type: UsfmTokenType) -> Self {
        match token_type {
            UsfmTokenType::Text => Self::Text,
            UsfmTokenType::Paragraph => Self::Paragraph,
            UsfmTokenType::Character | UsfmTokenType::End | UsfmTokenType::Attribute => {
                Self::Style
            }
            _ => Self::Other,
        }
    }
}

impl fmt::Display for UsfmUpdateBlockElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Paragraph => "paragraph",
            Self::Embed => "embed",
            Self::Style => "style",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A run of tokens sharing one role
#[derive(Debug, Clone, PartialEq)]
pub struct UsfmUpdateBlockElement {
    /// Role of the tokens
    pub element_type: UsfmUpdateBlockElementType,
    /// Tokens in document order
    pub tokens: Vec<UsfmToken>,
    /// Whether the element is left out of the output
    pub marked_for_removal: bool,
}

impl UsfmUpdateBlockElement {
    /// Create an element
    #[must_use]
    pub const fn new(element_type: UsfmUpdateBlockElementType, tokens: Vec<UsfmToken>) -> Self {
        Self {
            element_type,
            tokens,
            marked_for_removal: false,
        }
    }

    /// Concatenated text of the element's text tokens
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .filter(|token| token.token_type == UsfmTokenType::Text)
            .map(UsfmToken::text_str)
            .collect()
    }

    /// Tokens that reach the output
    #[must_use]
    pub fn get_tokens(&self) -> &[UsfmToken] {
        if self.marked_for_removal {
            &[]
        } else {
            &self.tokens
        }
    }
}

/// Tokens of one addressable unit, grouped into elements
#[derive(Debug, Clone, PartialEq)]
pub struct UsfmUpdateBlock {
    /// References the block covers
    refs: Vec<ScriptureRef>,
    /// Elements in document order
    elements: Vec<UsfmUpdateBlockElement>,
    /// Metadata from the rows that matched the block
    metadata: FastMap<String, String>,
}

impl UsfmUpdateBlock {
    /// Create an empty block
    #[must_use]
    pub fn new(refs: Vec<ScriptureRef>) -> Self {
        Self {
            refs,
            elements: Vec::new(),
            metadata: create_hash_map(),
        }
    }

    /// References the block covers
    #[must_use]
    pub fn refs(&self) -> &[ScriptureRef] {
        &self.refs
    }

    /// Elements in document order
    #[must_use]
    pub fn elements(&self) -> &[UsfmUpdateBlockElement] {
        &self.elements
    }

    /// Elements, mutably
    pub fn elements_mut(&mut self) -> &mut Vec<UsfmUpdateBlockElement> {
        &mut self.elements
    }

    /// Row metadata
    #[must_use]
    pub const fn metadata(&self) -> &FastMap<String, String> {
        &self.metadata
    }

    /// Row metadata, mutably
    pub fn metadata_mut(&mut self) -> &mut FastMap<String, String> {
        &mut self.metadata
    }

    /// Replace the references, e.g. when a bridge grew while collecting
    pub fn update_refs(&mut self, refs: Vec<ScriptureRef>) {
        self.refs = refs;
    }

    /// Append a text element
    pub fn add_text(&mut self, tokens: Vec<UsfmToken>) {
        self.elements.push(UsfmUpdateBlockElement::new(
            UsfmUpdateBlockElementType::Text,
            tokens,
        ));
    }

    /// Append a single token as an element typed after it
    pub fn add_token(&mut self, token: UsfmToken) {
        let element_type = UsfmUpdateBlockElementType::for_token(token.token_type);
        self.elements
            .push(UsfmUpdateBlockElement::new(element_type, vec![token]));
    }

    /// Append a whole note or figure
    pub fn add_embed(&mut self, tokens: Vec<UsfmToken>, marked_for_removal: bool) {
        let mut element = UsfmUpdateBlockElement::new(UsfmUpdateBlockElementType::Embed, tokens);
        element.marked_for_removal = marked_for_removal;
        self.elements.push(element);
    }

    /// Append tokens to the last element, or start an `Other` element
    pub fn extend_last_element(&mut self, tokens: Vec<UsfmToken>) {
        match self.elements.last_mut() {
            Some(element) => element.tokens.extend(tokens),
            None => self.elements.push(UsfmUpdateBlockElement::new(
                UsfmUpdateBlockElementType::Other,
                tokens,
            )),
        }
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Option<UsfmUpdateBlockElement> {
        self.elements.pop()
    }

    /// Whether the block has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Tokens of every element not marked for removal
    #[must_use]
    pub fn get_tokens(&self) -> Vec<UsfmToken> {
        self.elements
            .iter()
            .flat_map(|element| element.get_tokens().iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> UsfmUpdateBlock {
        UsfmUpdateBlock::new(vec!["MAT 1:1".parse().unwrap()])
    }

    #[test]
    fn token_types_map_to_elements() {
        let mut block = block();
        block.add_token(UsfmToken::text("a"));
        block.add_token(UsfmToken::new(UsfmTokenType::Paragraph, "q1", None, None, None));
        block.add_token(UsfmToken::new(
            UsfmTokenType::Character,
            "w",
            None,
            Some("w*".to_string()),
            None,
        ));
        block.add_token(UsfmToken::new(UsfmTokenType::End, "w*", None, None, None));
        block.add_token(UsfmToken::new(UsfmTokenType::Verse, "v", None, None, Some("2".into())));
        let types: Vec<_> = block.elements().iter().map(|e| e.element_type).collect();
        assert_eq!(
            types,
            [
                UsfmUpdateBlockElementType::Text,
                UsfmUpdateBlockElementType::Paragraph,
                UsfmUpdateBlockElementType::Style,
                UsfmUpdateBlockElementType::Style,
                UsfmUpdateBlockElementType::Other,
            ]
        );
    }

    #[test]
    fn removed_elements_produce_no_tokens() {
        let mut block = block();
        block.add_text(vec![UsfmToken::text("old ")]);
        block.add_embed(vec![UsfmToken::text("note")], true);
        block.add_text(vec![UsfmToken::text("kept")]);
        block.elements_mut()[0].marked_for_removal = true;
        let tokens = block.get_tokens();
        assert_eq!(tokens, [UsfmToken::text("kept")]);
    }

    #[test]
    fn extend_and_pop() {
        let mut block = block();
        block.extend_last_element(vec![UsfmToken::text("x")]);
        assert_eq!(block.elements()[0].element_type, UsfmUpdateBlockElementType::Other);
        block.extend_last_element(vec![UsfmToken::text("y")]);
        assert_eq!(block.elements()[0].text(), "xy");
        assert!(block.pop().is_some());
        assert!(block.is_empty());
    }
}
