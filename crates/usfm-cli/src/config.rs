//! Update configuration and row files
//!
//! Options come from a TOML file whose keys mirror
//! [`UpdateUsfmOptions`]. Rows come from either a tab separated file
//! (`refs<TAB>text`, one row per line, `#` comments allowed) or a JSON
//! array of `{ "refs": [...], "text": "...", "metadata": {...} }`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use usfm_core::update::{UpdateUsfmOptions, UpdateUsfmRow};
use usfm_core::ScriptureRef;

/// Load rewrite options from a TOML file
///
/// # Errors
///
/// Returns an error if the file cannot be read or has unknown values.
pub fn load_options(path: &Path) -> Result<UpdateUsfmOptions> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_options(&text).with_context(|| format!("invalid configuration in {}", path.display()))
}

/// Parse rewrite options from TOML text
///
/// # Errors
///
/// Returns an error for malformed TOML or unknown behavior names.
pub fn parse_options(text: &str) -> Result<UpdateUsfmOptions> {
    Ok(toml::from_str(text)?)
}

/// Row as written in JSON files
#[derive(Debug, Deserialize)]
struct JsonRow {
    /// References such as `MAT 1:1` or `MAT 1:0/1:s`
    refs: Vec<String>,
    /// Replacement text
    text: String,
    /// Values attached to the block
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl JsonRow {
    fn into_row(self) -> Result<UpdateUsfmRow> {
        let refs = self
            .refs
            .iter()
            .map(|r| r.parse::<ScriptureRef>())
            .collect::<usfm_core::Result<Vec<_>>>()?;
        Ok(self
            .metadata
            .into_iter()
            .fold(UpdateUsfmRow::new(refs, self.text), |row, (key, value)| {
                row.with_metadata(key, value)
            }))
    }
}

/// Load rows from a `.json` or tab separated file
///
/// # Errors
///
/// Returns an error naming the file and line for unreadable rows.
pub fn load_rows(path: &Path) -> Result<Vec<UpdateUsfmRow>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows = if is_json {
        parse_json_rows(&text)
    } else {
        parse_tsv_rows(&text)
    };
    rows.with_context(|| format!("invalid rows in {}", path.display()))
}

/// Parse a JSON array of rows
///
/// # Errors
///
/// Returns an error for malformed JSON or references.
pub fn parse_json_rows(text: &str) -> Result<Vec<UpdateUsfmRow>> {
    let rows: Vec<JsonRow> = serde_json::from_str(text)?;
    rows.into_iter().map(JsonRow::into_row).collect()
}

/// Parse tab separated rows, skipping blank lines and `#` comments
///
/// # Errors
///
/// Returns an error naming the first bad line.
pub fn parse_tsv_rows(text: &str) -> Result<Vec<UpdateUsfmRow>> {
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match UpdateUsfmRow::parse_tsv_line(line) {
            Ok(row) => rows.push(row),
            Err(err) => bail!("line {}: {err}", index + 1),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use usfm_core::update::{UpdateUsfmMarkerBehavior, UpdateUsfmTextBehavior};

    #[test]
    fn options_from_toml() {
        let options = parse_options(
            "text_behavior = \"prefer_new\"\nembed_behavior = \"strip\"\nremarks = [\"Drafted\"]\n",
        )
        .unwrap();
        assert_eq!(options.text_behavior, UpdateUsfmTextBehavior::PreferNew);
        assert_eq!(options.embed_behavior, UpdateUsfmMarkerBehavior::Strip);
        assert_eq!(options.style_behavior, UpdateUsfmMarkerBehavior::Strip);
        assert_eq!(options.remarks, ["Drafted"]);
        assert!(options.is_preserved_paragraph("rem"));
    }

    #[test]
    fn unknown_behavior_is_rejected() {
        assert!(parse_options("text_behavior = \"replace\"\n").is_err());
    }

    #[test]
    fn tsv_rows_skip_comments() {
        let rows = parse_tsv_rows("# refs\ttext\nMAT 1:1\tOne\n\nMAT 1:2,MAT 1:3\tTwo\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].refs.len(), 2);
        assert_eq!(rows[1].text, "Two");
    }

    #[test]
    fn tsv_errors_carry_line_numbers() {
        let err = parse_tsv_rows("MAT 1:1\tOne\nno tab here\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn json_rows_with_metadata() {
        let rows = parse_json_rows(
            r#"[{"refs": ["MAT 1:0/1:s"], "text": "Heading", "metadata": {"source": "draft"}}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].refs[0].to_string(), "MAT 1:0/1:s");
        assert_eq!(rows[0].metadata.get("source").map(String::as_str), Some("draft"));
    }
}
