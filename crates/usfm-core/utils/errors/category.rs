//! Error categorization and display utilities
//!
//! Groups `CoreError` variants for filtering and reporting, and attaches a
//! short suggestion to the errors users can act on.

use super::CoreError;
use core::fmt;

/// Error category for filtering and user interface organization
///
/// # Examples
///
/// ```rust
/// use usfm_core::utils::errors::{CoreError, ErrorCategory};
///
/// let error = CoreError::stylesheet(12, "Attributes cannot be empty");
/// assert_eq!(error.category(), ErrorCategory::Configuration);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Stylesheet, versification and option loading
    Configuration,

    /// Reference parsing
    Reference,

    /// Update block handler failures
    Handler,

    /// I/O and file system errors
    Io,

    /// Internal bugs
    Internal,
}

impl ErrorCategory {
    /// Get string representation for display
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Reference => "reference",
            Self::Handler => "handler",
            Self::Io => "io",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Get error category for filtering/grouping
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Stylesheet { .. }
            | Self::Versification { .. }
            | Self::Registry(_)
            | Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidReference { .. } => ErrorCategory::Reference,
            Self::UpdateBlockHandler { .. } => ErrorCategory::Handler,
            Self::Io(_) => ErrorCategory::Io,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Get suggested action for this error
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Stylesheet { .. } => {
                Some("Check that required attributes precede optional (?) attributes")
            }
            Self::InvalidReference { .. } => Some("Use references like 'MAT 1:1' or 'MAT 1:1/1:s'"),
            Self::Versification { .. } => Some("Use lines like 'GEN 1:31 2:25 3:24'"),
            Self::UpdateBlockHandler { .. } => {
                Some("Return true from the error callback to leave the unit unmodified")
            }
            Self::Internal(_) => Some("Please report this bug to the maintainers"),
            Self::Registry(_) | Self::Config(_) | Self::Io(_) => None,
        }
    }
}
