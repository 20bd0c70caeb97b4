//! Scripture references and versification
//!
//! - [`canon`]: book ids and numbers
//! - [`VerseRef`]: book, chapter and verse (bridges, sequences, segments)
//! - [`ScriptureRef`]: a verse plus a path to non-verse content
//! - [`merge_verse_ranges`]: joins overlapping verse strings
//! - [`Versification`] and [`VersificationTable`]: chapter and verse limits

pub mod canon;
mod ranges;
mod scripture_ref;
mod verse_ref;
mod versification;

pub use ranges::merge_verse_ranges;
pub use scripture_ref::{ScriptureElement, ScriptureRef};
pub use verse_ref::{VerseRef, VerseRefValidStatus, VERSE_RANGE_SEPARATOR, VERSE_SEQUENCE_INDICATOR};
pub use versification::{Versification, VersificationTable};
