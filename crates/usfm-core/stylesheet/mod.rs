//! USFM stylesheet loading and marker classification
//!
//! A stylesheet maps marker names to [`UsfmTag`] definitions. The default
//! stylesheet covering the USFM 3 marker inventory is embedded in the crate;
//! project stylesheets (e.g. `custom.sty`) are merged on top of it.
//!
//! # Format
//!
//! Stylesheets are line oriented. Each entry starts with a backslash
//! keyword; a `\Marker` entry opens a new definition that continues until
//! the next `\Marker`. Text after `#` is a comment and a leading `#!` is
//! stripped so Paratext-only entries are read as well.
//!
//! ```text
//! \Marker p
//! \Name p - Paragraph - Normal
//! \TextType VerseText
//! \TextProperties paragraph publishable vernacular
//! \StyleType Paragraph
//! ```
//!
//! An override entry of the form `\Marker xy -` removes `xy` and `xy*`.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::stylesheet::{UsfmStyleType, UsfmStylesheet};
//!
//! let stylesheet = UsfmStylesheet::default()
//!     .with_override("\\Marker zx\n\\StyleType Character\n")?;
//! assert_eq!(stylesheet.get_tag("zx").style_type, UsfmStyleType::Character);
//! assert_eq!(stylesheet.get_tag("zx*").style_type, UsfmStyleType::End);
//! assert_eq!(stylesheet.get_tag("zzz").style_type, UsfmStyleType::Unknown);
//! # Ok::<(), usfm_core::utils::errors::CoreError>(())
//! ```

mod tag;

pub use tag::{
    TextProperties, UsfmJustification, UsfmStyleAttribute, UsfmStyleType, UsfmTag, UsfmTextType,
};

use crate::utils::errors::{CoreError, Result};
use crate::utils::hashers::{create_hash_map_with_capacity, FastMap};
use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

/// Embedded default stylesheet
pub const DEFAULT_STYLESHEET: &str = include_str!("usfm.sty");

/// File name that resolves to the embedded stylesheet when absent on disk
pub const DEFAULT_STYLESHEET_NAME: &str = "usfm.sty";

/// Registry of marker definitions
#[derive(Debug, Clone)]
pub struct UsfmStylesheet {
    /// Tags keyed by marker name
    tags: FastMap<String, UsfmTag>,
}

/// One `\keyword value` line of a stylesheet
#[derive(Debug)]
struct StylesheetEntry<'a> {
    /// Lower-cased keyword without backslash
    keyword: String,
    /// Trimmed value
    value: &'a str,
    /// 1-based source line
    line: usize,
}

impl UsfmStylesheet {
    /// Create a stylesheet with no markers
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tags: create_hash_map_with_capacity(0),
        }
    }

    /// Load a stylesheet file and an optional override file
    ///
    /// A missing file named `usfm.sty` resolves to the embedded default.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if a file cannot be read and
    /// [`CoreError::Stylesheet`] if an entry is invalid.
    pub fn from_files(path: &Path, alternate: Option<&Path>) -> Result<Self> {
        let base = read_stylesheet(path)?;
        let mut stylesheet: Self = base.parse()?;
        if let Some(alternate) = alternate {
            let text = read_stylesheet(alternate)?;
            stylesheet.load(&text)?;
        }
        Ok(stylesheet)
    }

    /// Merge an override stylesheet into this one
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Stylesheet`] if an entry is invalid.
    pub fn with_override(mut self, text: &str) -> Result<Self> {
        self.load(text)?;
        Ok(self)
    }

    /// Look up a marker
    ///
    /// Never fails: table cell ranges such as `tc1-3` resolve to their base
    /// cell marker and anything else unknown yields a tag of
    /// [`UsfmStyleType::Unknown`].
    #[must_use]
    pub fn get_tag(&self, marker: &str) -> Cow<'_, UsfmTag> {
        if let Some(tag) = self.tags.get(marker) {
            return Cow::Borrowed(tag);
        }
        if let Some((base, _)) = parse_cell_range(marker) {
            if let Some(tag) = self.tags.get(base) {
                return Cow::Borrowed(tag);
            }
        }
        Cow::Owned(UsfmTag::new(marker))
    }

    /// Get a tag for modification, creating it if needed
    pub fn get_tag_mut(&mut self, marker: &str) -> &mut UsfmTag {
        self.create_tag(marker)
    }

    /// Check if a marker is defined
    #[must_use]
    pub fn contains(&self, marker: &str) -> bool {
        self.tags.contains_key(marker)
    }

    /// Number of defined markers
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if no markers are defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All defined tags sorted by marker name
    #[must_use]
    pub fn tags(&self) -> Vec<&UsfmTag> {
        let mut tags: Vec<&UsfmTag> = self.tags.values().collect();
        tags.sort_by(|a, b| a.marker.cmp(&b.marker));
        tags
    }

    /// Resolve a table cell range marker to its base marker and column span
    ///
    /// Returns `None` for markers that are not ranges.
    ///
    /// ```rust
    /// use usfm_core::stylesheet::UsfmStylesheet;
    ///
    /// assert_eq!(UsfmStylesheet::cell_range("tcr1-3"), Some(("tcr1", 3)));
    /// assert_eq!(UsfmStylesheet::cell_range("tc3"), None);
    /// ```
    #[must_use]
    pub fn cell_range(marker: &str) -> Option<(&str, u32)> {
        parse_cell_range(marker)
    }

    /// Create a tag if it does not exist yet
    fn create_tag(&mut self, marker: &str) -> &mut UsfmTag {
        self.tags.entry(marker.to_string()).or_insert_with(|| {
            let mut tag = UsfmTag::new(marker);
            if marker != "c" && marker != "v" {
                tag.text_properties = TextProperties::PUBLISHABLE;
            }
            tag
        })
    }

    /// Parse stylesheet text and merge its definitions
    fn load(&mut self, text: &str) -> Result<()> {
        let entries = split_stylesheet(text);
        let mut defined = 0usize;
        let mut index = 0;
        while index < entries.len() {
            let entry = &entries[index];
            index += 1;
            if entry.keyword != "marker" {
                continue;
            }

            let mut parts = entry.value.split_whitespace();
            let Some(marker) = parts.next() else {
                continue;
            };
            if parts.next() == Some("-") {
                self.tags.remove(marker);
                self.tags.remove(&format!("{marker}*"));
                continue;
            }

            let end = entries[index..]
                .iter()
                .position(|e| e.keyword == "marker")
                .map_or(entries.len(), |pos| index + pos);
            let end_tag = {
                let tag = self.create_tag(marker);
                parse_tag_entries(tag, &entries[index..end])?
            };
            if let Some(end_tag) = end_tag {
                if !self.tags.contains_key(&end_tag.marker) {
                    self.tags.insert(end_tag.marker.clone(), end_tag);
                }
            }
            defined += 1;
            index = end;
        }
        log::info!("Loaded {defined} stylesheet entries ({} markers)", self.tags.len());
        Ok(())
    }
}

impl Default for UsfmStylesheet {
    /// Load the embedded default stylesheet
    fn default() -> Self {
        let mut stylesheet = Self::empty();
        if let Err(err) = stylesheet.load(DEFAULT_STYLESHEET) {
            log::error!("Embedded stylesheet failed to load: {err}");
        }
        stylesheet
    }
}

impl FromStr for UsfmStylesheet {
    type Err = CoreError;

    fn from_str(text: &str) -> Result<Self> {
        let mut stylesheet = Self::empty();
        stylesheet.load(text)?;
        Ok(stylesheet)
    }
}

/// Read a stylesheet file, falling back to the embedded default
fn read_stylesheet(path: &Path) -> Result<Cow<'static, str>> {
    if !path.exists() && path.file_name().is_some_and(|name| name == DEFAULT_STYLESHEET_NAME) {
        return Ok(Cow::Borrowed(DEFAULT_STYLESHEET));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|err| CoreError::Io(format!("{}: {err}", path.display())))?;
    Ok(Cow::Owned(text))
}

/// Split stylesheet text into keyword entries
fn split_stylesheet(text: &str) -> Vec<StylesheetEntry<'_>> {
    let mut entries = Vec::new();
    for (line_index, raw) in text.lines().enumerate() {
        let raw = raw.trim_start();
        let raw = raw.strip_prefix("#!").unwrap_or(raw);
        let line = raw.split('#').next().unwrap_or_default().trim();
        let Some(line) = line.strip_prefix('\\') else {
            continue;
        };
        let (keyword, value) = line.split_once(' ').unwrap_or((line, ""));
        entries.push(StylesheetEntry {
            keyword: keyword.to_lowercase(),
            value: value.trim(),
            line: line_index + 1,
        });
    }
    entries
}

/// Apply the entries of one `\Marker` definition
///
/// Returns the end tag the definition introduces, if any.
fn parse_tag_entries(tag: &mut UsfmTag, entries: &[StylesheetEntry<'_>]) -> Result<Option<UsfmTag>> {
    if tag.marker == "id" {
        tag.text_properties |= TextProperties::BOOK;
    }

    let mut end_tag = None;
    for entry in entries {
        let value = entry.value;
        match entry.keyword.as_str() {
            "name" => tag.name = Some(value.to_string()),
            "description" => tag.description = Some(value.to_string()),
            "fontname" => tag.font_name = Some(value.to_string()),
            "fontsize" => set_dash_or_int(&mut tag.font_size, value),
            "xmltag" => tag.xml_tag = Some(value.to_string()),
            "encoding" => tag.encoding = Some(value.to_string()),
            "linespacing" => set_int(&mut tag.line_spacing, value),
            "spacebefore" => set_int(&mut tag.space_before, value),
            "spaceafter" => set_int(&mut tag.space_after, value),
            "leftmargin" => set_int(&mut tag.left_margin, value),
            "rightmargin" => set_int(&mut tag.right_margin, value),
            "firstlineindent" => {
                if let Ok(indent) = value.replace(',', "").parse::<f32>() {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        tag.first_line_indent = (indent * 1000.0) as i32;
                    }
                }
            }
            "rank" => set_dash_or_int(&mut tag.rank, value),
            "bold" => tag.bold = value != "-",
            "smallcaps" => tag.small_caps = value != "-",
            "subscript" => tag.subscript = value != "-",
            "italic" => tag.italic = value != "-",
            "regular" => {
                tag.italic = false;
                tag.bold = false;
                tag.superscript = false;
                tag.regular = true;
            }
            "underline" => tag.underline = value != "-",
            "superscript" => tag.superscript = value != "-",
            "notrepeatable" => tag.not_repeatable = value != "-",
            "textproperties" => {
                for keyword in value.split_whitespace() {
                    if let Some(flag) = TextProperties::from_keyword(keyword) {
                        tag.text_properties |= flag;
                    }
                }
                if tag.has(TextProperties::NONPUBLISHABLE) {
                    tag.text_properties.remove(TextProperties::PUBLISHABLE);
                }
            }
            "texttype" => {
                if value.eq_ignore_ascii_case("chapternumber") {
                    tag.text_properties |= TextProperties::CHAPTER;
                }
                if value.eq_ignore_ascii_case("versenumber") {
                    tag.text_properties |= TextProperties::VERSE;
                }
                if let Some(text_type) = UsfmTextType::from_stylesheet(value) {
                    tag.text_type = text_type;
                }
            }
            "color" => set_dash_or_int(&mut tag.color, value),
            "justification" => {
                if let Some(justification) = UsfmJustification::from_stylesheet(value) {
                    tag.justification = justification;
                }
            }
            "styletype" => {
                if let Some(style_type) = UsfmStyleType::from_stylesheet(value) {
                    tag.style_type = style_type;
                }
            }
            "occursunder" => {
                tag.occurs_under
                    .extend(value.split_whitespace().map(str::to_string));
            }
            "endmarker" => {
                end_tag = Some(UsfmTag::end(value));
                tag.end_marker = Some(value.to_string());
            }
            "attributes" => parse_attributes(tag, entry)?,
            _ => {}
        }
    }

    if tag.style_type == UsfmStyleType::Character && end_tag.is_none() {
        let end_marker = format!("{}*", tag.marker);
        end_tag = Some(UsfmTag::end(end_marker.clone()));
        tag.end_marker = Some(end_marker);
    }

    if tag.style_type == UsfmStyleType::Milestone {
        if let Some(end) = end_tag.as_mut() {
            end.style_type = UsfmStyleType::MilestoneEnd;
            end.attributes.push(UsfmStyleAttribute::new("eid", false));
            end.default_attribute_name = Some("eid".to_string());
            end.name.clone_from(&tag.name);
        }
    }

    if tag.text_type == UsfmTextType::Other
        && !tag.has(TextProperties::NONPUBLISHABLE)
        && !tag.has(TextProperties::CHAPTER)
        && !tag.has(TextProperties::VERSE)
        && matches!(
            tag.style_type,
            UsfmStyleType::Character | UsfmStyleType::Paragraph
        )
    {
        tag.text_properties |= TextProperties::PUBLISHABLE;
    }

    Ok(end_tag)
}

/// Parse a `\Attributes` entry
fn parse_attributes(tag: &mut UsfmTag, entry: &StylesheetEntry<'_>) -> Result<()> {
    let names: Vec<&str> = entry.value.split_whitespace().collect();
    if names.is_empty() {
        return Err(CoreError::stylesheet(
            entry.line,
            format!("Attributes of \\{} cannot be empty", tag.marker),
        ));
    }

    let mut attributes = Vec::with_capacity(names.len());
    let mut found_optional = false;
    for name in names {
        let optional = name.starts_with('?');
        if !optional && found_optional {
            return Err(CoreError::stylesheet(
                entry.line,
                format!(
                    "Required attribute '{name}' of \\{} follows an optional attribute",
                    tag.marker
                ),
            ));
        }
        attributes.push(UsfmStyleAttribute::new(name.trim_start_matches('?'), !optional));
        found_optional |= optional;
    }

    let required = attributes.iter().filter(|a| a.required).count();
    tag.default_attribute_name = if required <= 1 {
        attributes.first().map(|a| a.name.clone())
    } else {
        None
    };
    tag.attributes = attributes;
    Ok(())
}

/// Set a non-negative integer property
fn set_int(target: &mut i32, value: &str) {
    if let Ok(parsed) = value.parse::<i32>() {
        if parsed >= 0 {
            *target = parsed;
        }
    }
}

/// Set an integer property where `-` means zero
fn set_dash_or_int(target: &mut i32, value: &str) {
    if value == "-" {
        *target = 0;
    } else {
        set_int(target, value);
    }
}

/// Match `t[ch][cr]?[1-5]-[2-5]` and return the base marker and span
fn parse_cell_range(marker: &str) -> Option<(&str, u32)> {
    let (base, end) = marker.split_once('-')?;
    let bytes = base.as_bytes();
    let valid_base = matches!(
        bytes,
        [b't', b'h' | b'c', b'1'..=b'5'] | [b't', b'h' | b'c', b'c' | b'r', b'1'..=b'5']
    );
    if !valid_base || end.len() != 1 {
        return None;
    }
    let end = end.chars().next()?.to_digit(10)?;
    let start = base.chars().last()?.to_digit(10)?;
    if !(2..=5).contains(&end) || end <= start {
        return None;
    }
    Some((base, end - start + 1))
}

#[cfg(test)]
mod tests;
