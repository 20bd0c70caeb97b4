//! Reusable parser handlers
//!
//! - [`ScriptureRefTracker`]: addresses verse, non-verse and embed text as
//!   it is parsed; composed into handlers such as the rewrite engine
//! - [`UsfmVersificationErrorDetector`]: reports chapters and verses that
//!   disagree with a versification

mod scripture_ref;
mod versification;

pub use scripture_ref::{ScriptureRefTracker, ScriptureTextEvent, ScriptureTextType};
pub use versification::{
    UsfmVersificationError, UsfmVersificationErrorDetector, UsfmVersificationErrorType,
};

#[cfg(test)]
mod tests;
