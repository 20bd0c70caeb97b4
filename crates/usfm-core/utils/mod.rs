//! Utility functions and shared types for USFM core
//!
//! Contains the error taxonomy, hashing helpers and whitespace rules used
//! across the stylesheet, tokenizer, parser and update modules.

pub mod errors;
pub mod hashers;
pub mod text;

pub use errors::{CoreError, ErrorCategory, Result};
pub use hashers::{create_hash_map, create_hash_map_with_capacity, create_hash_set, FastMap, FastSet};
pub use text::strip_bom;
