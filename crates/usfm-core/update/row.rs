//! Replacement rows

use crate::scripture::ScriptureRef;
use crate::utils::errors::{CoreError, Result};
use crate::utils::hashers::{create_hash_map, FastMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// New text for one or more references
///
/// Rows are matched against the document in reference order, so a row list
/// must be sorted the way the references appear in the book.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UpdateUsfmRow {
    /// References the text belongs to
    pub refs: Vec<ScriptureRef>,
    /// Replacement text
    pub text: String,
    /// Extra values attached to the block the row lands in
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "std::collections::HashMap::is_empty"))]
    pub metadata: FastMap<String, String>,
}

impl UpdateUsfmRow {
    /// Create a row without metadata
    #[must_use]
    pub fn new(refs: Vec<ScriptureRef>, text: impl Into<String>) -> Self {
        Self {
            refs,
            text: text.into(),
            metadata: create_hash_map(),
        }
    }

    /// Attach a metadata value
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Parse `refs<TAB>text` where refs are comma separated
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidReference`] for an unparsable reference
    /// and [`CoreError::Config`] when the tab is missing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use usfm_core::update::UpdateUsfmRow;
    ///
    /// let row = UpdateUsfmRow::parse_tsv_line("MAT 1:1,MAT 1:2\tNew text")?;
    /// assert_eq!(row.refs.len(), 2);
    /// assert_eq!(row.text, "New text");
    /// # Ok::<(), usfm_core::utils::errors::CoreError>(())
    /// ```
    pub fn parse_tsv_line(line: &str) -> Result<Self> {
        let (refs, text) = line
            .split_once('\t')
            .ok_or_else(|| CoreError::config(format!("row without a tab separator: '{line}'")))?;
        let refs = refs
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ScriptureRef>>>()?;
        Ok(Self::new(refs, text.trim_end_matches(['\r', '\n'])))
    }
}
