//! Rewrite options
//!
//! [`UpdateUsfmOptions`] deserializes from configuration files with every
//! field optional:
//!
//! ```toml
//! text_behavior = "prefer_new"
//! style_behavior = "preserve"
//! remarks = ["Updated by the drafting pipeline"]
//! ```

use crate::utils::hashers::{create_hash_set, FastSet};
use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Paragraph styles whose text is never replaced by default
pub const DEFAULT_PRESERVED_PARAGRAPH_STYLES: [&str; 2] = ["r", "rem"];

/// How existing text and row text are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UpdateUsfmTextBehavior {
    /// Use row text only where the document has none
    #[default]
    PreferExisting,
    /// Use row text wherever a row matches
    PreferNew,
    /// Remove all existing text, inserting row text where a row matches
    StripExisting,
}

/// Whether markup inside replaced text survives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UpdateUsfmMarkerBehavior {
    /// Keep the markup
    #[default]
    Preserve,
    /// Drop the markup
    Strip,
}

impl FromStr for UpdateUsfmTextBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").to_ascii_lowercase().as_str() {
            "prefer_existing" => Ok(Self::PreferExisting),
            "prefer_new" => Ok(Self::PreferNew),
            "strip_existing" => Ok(Self::StripExisting),
            _ => Err(format!("unknown text behavior '{s}'")),
        }
    }
}

impl fmt::Display for UpdateUsfmTextBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreferExisting => "prefer-existing",
            Self::PreferNew => "prefer-new",
            Self::StripExisting => "strip-existing",
        })
    }
}

impl FromStr for UpdateUsfmMarkerBehavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "strip" => Ok(Self::Strip),
            _ => Err(format!("unknown marker behavior '{s}'")),
        }
    }
}

impl fmt::Display for UpdateUsfmMarkerBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Preserve => "preserve",
            Self::Strip => "strip",
        })
    }
}

/// Configuration of a rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UpdateUsfmOptions {
    /// Reconciliation of existing and row text
    pub text_behavior: UpdateUsfmTextBehavior,
    /// Verse paragraph markers inside replaced text
    pub paragraph_behavior: UpdateUsfmMarkerBehavior,
    /// Notes and figures inside replaced text
    pub embed_behavior: UpdateUsfmMarkerBehavior,
    /// Character styles inside replaced text
    pub style_behavior: UpdateUsfmMarkerBehavior,
    /// Paragraph markers whose text is always kept
    pub preserve_paragraph_styles: FastSet<String>,
    /// Replacement for the text after the book code on `\id`
    pub id_text: Option<String>,
    /// `\rem` paragraphs added after the identification lines
    pub remarks: Vec<String>,
    /// Whether verse segments must agree when matching rows
    pub compare_segments: bool,
}

impl Default for UpdateUsfmOptions {
    fn default() -> Self {
        let mut preserve_paragraph_styles = create_hash_set();
        preserve_paragraph_styles.extend(
            DEFAULT_PRESERVED_PARAGRAPH_STYLES
                .iter()
                .map(ToString::to_string),
        );
        Self {
            text_behavior: UpdateUsfmTextBehavior::default(),
            paragraph_behavior: UpdateUsfmMarkerBehavior::Preserve,
            embed_behavior: UpdateUsfmMarkerBehavior::Preserve,
            style_behavior: UpdateUsfmMarkerBehavior::Strip,
            preserve_paragraph_styles,
            id_text: None,
            remarks: Vec::new(),
            compare_segments: false,
        }
    }
}

impl UpdateUsfmOptions {
    /// Set the text behavior
    #[must_use]
    pub const fn with_text_behavior(mut self, behavior: UpdateUsfmTextBehavior) -> Self {
        self.text_behavior = behavior;
        self
    }

    /// Set the paragraph behavior
    #[must_use]
    pub const fn with_paragraph_behavior(mut self, behavior: UpdateUsfmMarkerBehavior) -> Self {
        self.paragraph_behavior = behavior;
        self
    }

    /// Set the embed behavior
    #[must_use]
    pub const fn with_embed_behavior(mut self, behavior: UpdateUsfmMarkerBehavior) -> Self {
        self.embed_behavior = behavior;
        self
    }

    /// Set the style behavior
    #[must_use]
    pub const fn with_style_behavior(mut self, behavior: UpdateUsfmMarkerBehavior) -> Self {
        self.style_behavior = behavior;
        self
    }

    /// Replace the `\id` text
    #[must_use]
    pub fn with_id_text(mut self, id_text: impl Into<String>) -> Self {
        self.id_text = Some(id_text.into());
        self
    }

    /// Add a `\rem` paragraph
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remarks.push(remark.into());
        self
    }

    /// Whether text in a paragraph style is kept unchanged
    #[must_use]
    pub fn is_preserved_paragraph(&self, marker: &str) -> bool {
        self.preserve_paragraph_styles.contains(marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = UpdateUsfmOptions::default();
        assert_eq!(options.text_behavior, UpdateUsfmTextBehavior::PreferExisting);
        assert_eq!(options.paragraph_behavior, UpdateUsfmMarkerBehavior::Preserve);
        assert_eq!(options.embed_behavior, UpdateUsfmMarkerBehavior::Preserve);
        assert_eq!(options.style_behavior, UpdateUsfmMarkerBehavior::Strip);
        assert!(options.is_preserved_paragraph("r"));
        assert!(options.is_preserved_paragraph("rem"));
        assert!(!options.is_preserved_paragraph("p"));
        assert!(!options.compare_segments);
    }

    #[test]
    fn behaviors_parse_from_cli_spelling() {
        assert_eq!(
            "prefer-new".parse::<UpdateUsfmTextBehavior>(),
            Ok(UpdateUsfmTextBehavior::PreferNew)
        );
        assert_eq!(
            "strip_existing".parse::<UpdateUsfmTextBehavior>(),
            Ok(UpdateUsfmTextBehavior::StripExisting)
        );
        assert!("replace".parse::<UpdateUsfmTextBehavior>().is_err());
        assert_eq!("Strip".parse(), Ok(UpdateUsfmMarkerBehavior::Strip));
        assert_eq!(UpdateUsfmTextBehavior::PreferNew.to_string(), "prefer-new");
    }
}
