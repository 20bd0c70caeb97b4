//! Attribute list parsing for `|name="value"` suffixes
//!
//! Accepts either one or more `name="value"` pairs covering the whole text
//! or a single unnamed default value. Names are word characters and `-`;
//! default values may not contain `\`, `=` or `|`.

use super::tokens::UsfmAttribute;

/// Result of parsing raw attribute text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAttributes {
    /// Explicit `name="value"` pairs
    Named(Vec<UsfmAttribute>),
    /// A single unnamed value for the marker's default attribute
    Default(String),
}

/// Parse the text following `|`
///
/// Returns `None` when the text is neither a complete attribute list nor a
/// valid default value.
#[must_use]
pub fn parse_attribute_value(text: &str) -> Option<ParsedAttributes> {
    let mut attributes = Vec::new();
    let mut pos = 0;
    while let Some((attribute, next)) = parse_named(text, pos) {
        attributes.push(attribute);
        pos = next;
        if pos == text.len() {
            return Some(ParsedAttributes::Named(attributes));
        }
    }

    if !attributes.is_empty() {
        // A list that does not cover the whole text is rejected outright
        return None;
    }

    if text.contains(['\\', '=', '|']) {
        return None;
    }
    Some(ParsedAttributes::Default(text.to_string()))
}

/// Parse `name\s*=\s*"value"\s*` starting at `pos` (after optional whitespace)
fn parse_named(text: &str, pos: usize) -> Option<(UsfmAttribute, usize)> {
    let mut pos = skip_whitespace(text, pos);
    let name_start = pos;
    pos += text[pos..]
        .char_indices()
        .find(|&(_, c)| !is_name_char(c))
        .map_or(text.len() - pos, |(i, _)| i);
    if pos == name_start {
        return None;
    }
    let name = &text[name_start..pos];

    pos = skip_whitespace(text, pos);
    text[pos..].strip_prefix('=')?;
    pos = skip_whitespace(text, pos + 1);
    text[pos..].strip_prefix('"')?;
    pos += 1;

    let value_start = pos;
    // Values hold at least one character, so a closing quote right after
    // the opening one is part of the value
    let first_len = text[pos..].chars().next()?.len_utf8();
    let close = text[pos + first_len..].find('"')? + pos + first_len;
    let value = &text[value_start..close];
    pos = skip_whitespace(text, close + 1);

    Some((UsfmAttribute::new(name, value, value_start), pos))
}

/// Skip Unicode whitespace starting at `pos`
fn skip_whitespace(text: &str, pos: usize) -> usize {
    pos + text[pos..]
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(text.len() - pos, |(i, _)| i)
}

/// Characters allowed in attribute names
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_pairs() {
        let parsed = parse_attribute_value(r#"lemma="grace" strong="G5485""#).unwrap();
        let ParsedAttributes::Named(attributes) = parsed else {
            panic!("expected named attributes");
        };
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].name, "lemma");
        assert_eq!(attributes[0].value, "grace");
        assert_eq!(attributes[0].offset, 7);
        assert_eq!(attributes[1].name, "strong");
        assert_eq!(attributes[1].value, "G5485");
    }

    #[test]
    fn whitespace_around_equals() {
        let parsed = parse_attribute_value(r#"x-occurrence = "1" "#).unwrap();
        assert_eq!(
            parsed,
            ParsedAttributes::Named(vec![UsfmAttribute::new("x-occurrence", "1", 16)])
        );
    }

    #[test]
    fn default_value() {
        assert_eq!(
            parse_attribute_value("grace"),
            Some(ParsedAttributes::Default("grace".to_string()))
        );
    }

    #[test]
    fn partial_list_is_rejected() {
        assert_eq!(parse_attribute_value(r#"lemma="grace" junk"#), None);
        assert_eq!(parse_attribute_value("a=b"), None);
        assert_eq!(parse_attribute_value("a|b"), None);
    }
}
