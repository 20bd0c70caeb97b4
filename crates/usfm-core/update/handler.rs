//! Block handlers run on every unit the rewrite engine closes
//!
//! A handler receives a copy of the block and returns the block to keep.
//! Handlers run in registration order; each sees the output of the one
//! before it. A failing handler produces a [`UsfmUpdateBlockHandlerError`]
//! which the engine routes through its error callback.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::update::{
//!     StripStyleMarkersHandler, TextTransformHandler, UpdateBlockHandlerRegistry,
//! };
//!
//! let mut registry = UpdateBlockHandlerRegistry::new();
//! registry.register(Box::new(StripStyleMarkersHandler))?;
//! registry.register(Box::new(TextTransformHandler::new("upper", |text| text.to_uppercase())))?;
//! assert_eq!(registry.names(), ["strip-style-markers", "upper"]);
//! assert!(registry.register(Box::new(StripStyleMarkersHandler)).is_err());
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

use super::block::{UsfmUpdateBlock, UsfmUpdateBlockElementType};
use crate::scripture::ScriptureRef;
use crate::tokenizer::{UsfmToken, UsfmTokenType};
use crate::utils::errors::{CoreError, Result};
use core::fmt;
use log::warn;

/// Transform applied to each closed unit
pub trait UsfmUpdateBlockHandler: Send + Sync {
    /// Unique name, used in error reports and for registration
    fn name(&self) -> &str;

    /// Process a block
    ///
    /// # Errors
    ///
    /// Any error aborts this handler for the block; the engine decides
    /// whether the rewrite continues.
    fn process_block(&self, block: UsfmUpdateBlock) -> Result<UsfmUpdateBlock>;
}

/// A handler failure, with the block it happened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsfmUpdateBlockHandlerError {
    /// Name of the failing handler
    pub handler: String,
    /// References of the block
    pub refs: Vec<ScriptureRef>,
    /// Error the handler returned
    pub source: CoreError,
}

impl UsfmUpdateBlockHandlerError {
    /// Create an error
    #[must_use]
    pub fn new(handler: impl Into<String>, refs: &[ScriptureRef], source: CoreError) -> Self {
        Self {
            handler: handler.into(),
            refs: refs.to_vec(),
            source,
        }
    }

    /// Comma separated references
    #[must_use]
    pub fn refs_string(&self) -> String {
        self.refs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for UsfmUpdateBlockHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "handler '{}' failed at {}: {}",
            self.handler,
            self.refs_string(),
            self.source
        )
    }
}

impl std::error::Error for UsfmUpdateBlockHandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<UsfmUpdateBlockHandlerError> for CoreError {
    fn from(err: UsfmUpdateBlockHandlerError) -> Self {
        Self::UpdateBlockHandler {
            refs: err.refs_string(),
            handler: err.handler,
            message: err.source.to_string(),
        }
    }
}

/// Decides whether a handler failure is swallowed (`true`) or escalated
pub type UsfmUpdateBlockErrorHandler =
    Box<dyn Fn(&UsfmUpdateBlockHandlerError) -> bool + Send + Sync>;

/// Ordered collection of block handlers with unique names
#[derive(Default)]
pub struct UpdateBlockHandlerRegistry {
    /// Handlers in execution order
    handlers: Vec<Box<dyn UsfmUpdateBlockHandler>>,
}

impl UpdateBlockHandlerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Registry`] if a handler with the same name is
    /// already registered.
    pub fn register(&mut self, handler: Box<dyn UsfmUpdateBlockHandler>) -> Result<()> {
        if self.get(handler.name()).is_some() {
            return Err(CoreError::Registry(format!(
                "handler '{}' already registered",
                handler.name()
            )));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Remove a handler by name
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn UsfmUpdateBlockHandler>> {
        let index = self.handlers.iter().position(|h| h.name() == name)?;
        Some(self.handlers.remove(index))
    }

    /// Look up a handler by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn UsfmUpdateBlockHandler> {
        self.handlers
            .iter()
            .find(|handler| handler.name() == name)
            .map(|handler| &**handler as &dyn UsfmUpdateBlockHandler)
    }

    /// Handler names in execution order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|handler| handler.name()).collect()
    }

    /// Handlers in execution order
    pub fn iter(&self) -> impl Iterator<Item = &dyn UsfmUpdateBlockHandler> + '_ {
        self.handlers
            .iter()
            .map(|handler| &**handler as &dyn UsfmUpdateBlockHandler)
    }

    /// Number of handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler on a block
    ///
    /// A failure the callback swallows leaves the block as it was before the
    /// failing handler and the remaining handlers still run. An escalated
    /// failure stops the chain and is returned.
    ///
    /// # Errors
    ///
    /// Returns the first failure `on_error` does not swallow.
    pub fn process_block(
        &self,
        block: UsfmUpdateBlock,
        on_error: &dyn Fn(&UsfmUpdateBlockHandlerError) -> bool,
    ) -> core::result::Result<UsfmUpdateBlock, UsfmUpdateBlockHandlerError> {
        let mut current = block;
        for handler in &self.handlers {
            match handler.process_block(current.clone()) {
                Ok(processed) => current = processed,
                Err(source) => {
                    let error =
                        UsfmUpdateBlockHandlerError::new(handler.name(), current.refs(), source);
                    if !on_error(&error) {
                        return Err(error);
                    }
                    warn!("Ignoring update handler failure: {error}");
                }
            }
        }
        Ok(current)
    }
}

impl fmt::Debug for UpdateBlockHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateBlockHandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

/// Marks every character style element for removal
#[derive(Debug, Clone, Copy, Default)]
pub struct StripStyleMarkersHandler;

impl UsfmUpdateBlockHandler for StripStyleMarkersHandler {
    fn name(&self) -> &str {
        "strip-style-markers"
    }

    fn process_block(&self, mut block: UsfmUpdateBlock) -> Result<UsfmUpdateBlock> {
        for element in block.elements_mut() {
            if element.element_type == UsfmUpdateBlockElementType::Style {
                element.marked_for_removal = true;
            }
        }
        Ok(block)
    }
}

/// Rewrites the text of every text element that is kept
pub struct TextTransformHandler {
    /// Registration name
    name: String,
    /// Applied to each text token
    transform: Box<dyn Fn(&str) -> String + Send + Sync>,
}

impl TextTransformHandler {
    /// Create a handler from a closure
    pub fn new(
        name: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            transform: Box::new(transform),
        }
    }
}

impl UsfmUpdateBlockHandler for TextTransformHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_block(&self, mut block: UsfmUpdateBlock) -> Result<UsfmUpdateBlock> {
        for element in block.elements_mut() {
            if element.element_type != UsfmUpdateBlockElementType::Text
                || element.marked_for_removal
            {
                continue;
            }
            for token in &mut element.tokens {
                if token.token_type == UsfmTokenType::Text {
                    *token = UsfmToken::text((self.transform)(token.text_str()));
                }
            }
        }
        Ok(block)
    }
}

impl fmt::Debug for TextTransformHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextTransformHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
