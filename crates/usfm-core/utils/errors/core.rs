//! Core error type for USFM toolkit operations
//!
//! Provides the main `CoreError` enum that wraps the failures that can
//! escape the library. Malformed USFM never surfaces here: the tokenizer
//! and parser degrade unknown or unbalanced markup instead of failing.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling (no `anyhow` in the library)
//! - Carry enough location context (line, reference) to find the offending input
//! - Include suggestions for common error scenarios

use core::fmt;
use thiserror::Error;

/// Main error type for USFM core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Stylesheet could not be loaded
    #[error("Stylesheet error at line {line}: {message}")]
    Stylesheet {
        /// 1-based line in the stylesheet text (0 when unknown)
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Verse or scripture reference could not be parsed
    #[error("Invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The offending reference text
        reference: String,
        /// Why it was rejected
        reason: String,
    },

    /// Versification table could not be parsed
    #[error("Versification error at line {line}: {message}")]
    Versification {
        /// 1-based line in the versification text
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// An update block handler failed and the failure was escalated
    #[error("Update block handler '{handler}' failed at {refs}: {message}")]
    UpdateBlockHandler {
        /// Name of the failing handler
        handler: String,
        /// Comma-separated references of the block being processed
        refs: String,
        /// Error reported by the handler
        message: String,
    },

    /// Update block handler registration problems
    #[error("Handler registry error: {0}")]
    Registry(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal consistency error (should not happen)
    #[error("Internal error: {0} (this is a bug, please report)")]
    Internal(String),
}

impl CoreError {
    /// Create stylesheet error from message
    pub fn stylesheet<T: fmt::Display>(line: usize, message: T) -> Self {
        Self::Stylesheet {
            line,
            message: message.to_string(),
        }
    }

    /// Create reference error for the given text
    pub fn invalid_reference<T: fmt::Display>(reference: &str, reason: T) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create versification table error
    pub fn versification<T: fmt::Display>(line: usize, message: T) -> Self {
        Self::Versification {
            line,
            message: message.to_string(),
        }
    }

    /// Create configuration error
    pub fn config<T: fmt::Display>(message: T) -> Self {
        Self::Config(message.to_string())
    }

    /// Create internal error (indicates a bug)
    pub fn internal<T: fmt::Display>(message: T) -> Self {
        Self::Internal(message.to_string())
    }

    /// Check if error is recoverable
    ///
    /// Handler failures are recoverable because the affected unit can be
    /// left unmodified. Load-time failures leave nothing to continue with.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::UpdateBlockHandler { .. } | Self::InvalidReference { .. } => true,
            Self::Stylesheet { .. }
            | Self::Versification { .. }
            | Self::Registry(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Internal(_) => false,
        }
    }

    /// Check if error indicates a bug in the library
    #[must_use]
    pub const fn is_internal_bug(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, CoreError>;
