//! Error types for the USFM toolkit
//!
//! # Examples
//!
//! ```rust
//! use usfm_core::utils::errors::{CoreError, ErrorCategory};
//!
//! let err = CoreError::invalid_reference("MAT x:1", "chapter is not a number");
//! assert_eq!(err.category(), ErrorCategory::Reference);
//! assert!(err.is_recoverable());
//! assert!(err.suggestion().is_some());
//! ```

mod category;
mod core;

pub use self::core::{CoreError, Result};
pub use category::ErrorCategory;
