//! Rewriting documents with replacement text
//!
//! Replacement text arrives as [`UpdateUsfmRow`]s addressed by
//! [`ScriptureRef`](crate::scripture::ScriptureRef). The rewrite engine
//! walks the document once, collects each addressable unit into an
//! [`UsfmUpdateBlock`], decides per [`UpdateUsfmOptions`] whether the
//! existing or the new text wins and runs any registered
//! [`UsfmUpdateBlockHandler`]s before writing the block back.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::stylesheet::UsfmStylesheet;
//! use usfm_core::update::{update_usfm, UpdateUsfmOptions, UpdateUsfmRow, UpdateUsfmTextBehavior};
//!
//! let rows = vec![
//!     UpdateUsfmRow::new(vec!["MAT 1:0/1:s".parse()?], "New heading"),
//!     UpdateUsfmRow::new(vec!["MAT 1:1".parse()?], "New verse"),
//! ];
//! let options = UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew);
//! let usfm = update_usfm(
//!     "\\id MAT\n\\c 1\n\\s Old heading\n\\p\n\\v 1 Old verse\n",
//!     &UsfmStylesheet::default(),
//!     rows,
//!     options,
//! )?;
//! assert_eq!(usfm, "\\id MAT\r\n\\c 1\r\n\\s New heading\r\n\\p\r\n\\v 1 New verse\r\n");
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

mod block;
mod engine;
mod handler;
mod options;
mod row;

pub use block::{UsfmUpdateBlock, UsfmUpdateBlockElement, UsfmUpdateBlockElementType};
pub use engine::{update_usfm, UpdateUsfmParserHandler};
pub use handler::{
    StripStyleMarkersHandler, TextTransformHandler, UpdateBlockHandlerRegistry,
    UsfmUpdateBlockErrorHandler, UsfmUpdateBlockHandler, UsfmUpdateBlockHandlerError,
};
pub use options::{
    UpdateUsfmMarkerBehavior, UpdateUsfmOptions, UpdateUsfmTextBehavior,
    DEFAULT_PRESERVED_PARAGRAPH_STYLES,
};
pub use row::UpdateUsfmRow;
