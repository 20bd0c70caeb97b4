//! # USFM-RS Core
//!
//! Tokenizer, event parser and rewriter for USFM (Unified Standard Format
//! Markers), the backslash markup used by Bible translation software.
//!
//! ## Features
//!
//! - **Stylesheet driven**: markers are classified from `usfm.sty` with
//!   project overrides merged on top
//! - **Lossless tokens**: tokenize and detokenize round-trip the document
//! - **Event parser**: nested books, paragraphs, styles, notes, tables,
//!   sidebars and milestones reported to a handler trait
//! - **Scripture references**: every span of text gets a unique address
//! - **Rewriting**: replacement text is spliced into an existing document
//!   with pluggable per-unit handlers
//! - **Versification checks**: missing, extra and malformed verses
//!
//! ## Quick Start
//!
//! ```rust
//! use usfm_core::{tokenize, detokenize, UsfmStylesheet};
//!
//! let stylesheet = UsfmStylesheet::default();
//! let tokens = tokenize(&stylesheet, "\\id MAT\n\\c 1\n\\p\n\\v 1 In the beginning\n", false);
//! assert_eq!(tokens[0].data.as_deref(), Some("MAT"));
//! assert_eq!(detokenize(&tokens, false), "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 In the beginning\r\n");
//! ```
//!
//! Rewriting verse text:
//!
//! ```rust
//! use usfm_core::update::{UpdateUsfmOptions, UpdateUsfmRow, UpdateUsfmTextBehavior};
//! use usfm_core::{update_usfm, UsfmStylesheet};
//!
//! let rows = vec![UpdateUsfmRow::new(vec!["MAT 1:1".parse()?], "Hello")];
//! let options = UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew);
//! let usfm = update_usfm("\\id MAT\n\\c 1\n\\p\n\\v 1 Original\n", &UsfmStylesheet::default(), rows, options)?;
//! assert!(usfm.ends_with("\\v 1 Hello\r\n"));
//! # Ok::<(), usfm_core::CoreError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(clippy::all)]
#![deny(unsafe_code)]

pub mod handlers;
pub mod parser;
pub mod scripture;
pub mod stylesheet;
pub mod tokenizer;
pub mod update;
pub mod utils;

pub use handlers::{ScriptureRefTracker, UsfmVersificationErrorDetector};
pub use parser::{parse_usfm, UsfmParser, UsfmParserHandler, UsfmParserState};
pub use scripture::{ScriptureRef, VerseRef, VersificationTable};
pub use stylesheet::UsfmStylesheet;
pub use tokenizer::{
    detokenize, tokenize, RtlReferenceOrder, UsfmToken, UsfmTokenType, UsfmTokenizer,
};
pub use update::{update_usfm, UpdateUsfmParserHandler};
pub use utils::{CoreError, Result};

/// Crate version for runtime compatibility checks
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
