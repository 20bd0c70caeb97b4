//! Tests for stylesheet loading and marker lookup

use super::*;

#[test]
fn default_stylesheet_classifies_core_markers() {
    let stylesheet = UsfmStylesheet::default();

    let id = stylesheet.get_tag("id");
    assert_eq!(id.style_type, UsfmStyleType::Paragraph);
    assert!(id.has(TextProperties::BOOK));
    assert!(!id.has(TextProperties::PUBLISHABLE));

    let c = stylesheet.get_tag("c");
    assert!(c.has(TextProperties::CHAPTER));
    assert_eq!(c.text_type, UsfmTextType::Other);
    assert!(!c.has(TextProperties::PUBLISHABLE));

    let v = stylesheet.get_tag("v");
    assert_eq!(v.style_type, UsfmStyleType::Character);
    assert!(v.has(TextProperties::VERSE));
    assert_eq!(v.text_type, UsfmTextType::VerseText);

    let p = stylesheet.get_tag("p");
    assert_eq!(p.text_type, UsfmTextType::VerseText);
    assert!(p.has(TextProperties::PARAGRAPH));

    let f = stylesheet.get_tag("f");
    assert_eq!(f.style_type, UsfmStyleType::Note);
    assert_eq!(f.end_marker.as_deref(), Some("f*"));
    assert_eq!(stylesheet.get_tag("f*").style_type, UsfmStyleType::End);
}

#[test]
fn character_styles_get_end_markers() {
    let stylesheet = UsfmStylesheet::default();
    let nd = stylesheet.get_tag("nd");
    assert_eq!(nd.end_marker.as_deref(), Some("nd*"));
    assert_eq!(stylesheet.get_tag("nd*").style_type, UsfmStyleType::End);
}

#[test]
fn milestones_synthesize_milestone_end_tags() {
    let stylesheet = UsfmStylesheet::default();
    let start = stylesheet.get_tag("qt-s");
    assert_eq!(start.style_type, UsfmStyleType::Milestone);
    assert_eq!(start.end_marker.as_deref(), Some("qt-e"));
    assert_eq!(start.default_attribute_name.as_deref(), Some("sid"));

    let end = stylesheet.get_tag("qt-e");
    assert_eq!(end.style_type, UsfmStyleType::MilestoneEnd);
    assert_eq!(end.attributes, vec![UsfmStyleAttribute::new("eid", false)]);
    assert_eq!(end.name, start.name);
}

#[test]
fn attribute_declarations() {
    let stylesheet = UsfmStylesheet::default();
    let w = stylesheet.get_tag("w");
    assert_eq!(w.default_attribute_name.as_deref(), Some("lemma"));
    assert!(w.attributes.iter().all(|a| !a.required));

    let fig = stylesheet.get_tag("fig");
    assert_eq!(fig.attributes.len(), 6);
    assert_eq!(fig.default_attribute_name, None);

    let rb = stylesheet.get_tag("rb");
    assert_eq!(rb.attributes, vec![UsfmStyleAttribute::new("gloss", true)]);
    assert_eq!(rb.default_attribute_name.as_deref(), Some("gloss"));
}

#[test]
fn unknown_marker_never_fails() {
    let stylesheet = UsfmStylesheet::default();
    let tag = stylesheet.get_tag("zzz");
    assert_eq!(tag.style_type, UsfmStyleType::Unknown);
    assert_eq!(tag.marker, "zzz");
    assert!(!tag.is_known());
    assert!(!stylesheet.contains("zzz"));
}

#[test]
fn cell_ranges_resolve_to_base_marker() {
    let stylesheet = UsfmStylesheet::default();
    assert_eq!(UsfmStylesheet::cell_range("th1-3"), Some(("th1", 3)));
    assert_eq!(UsfmStylesheet::cell_range("thc2-4"), Some(("thc2", 3)));
    assert_eq!(UsfmStylesheet::cell_range("tcr1-2"), Some(("tcr1", 2)));
    assert_eq!(UsfmStylesheet::cell_range("tc3-2"), None);
    assert_eq!(UsfmStylesheet::cell_range("tc1-6"), None);
    assert_eq!(UsfmStylesheet::cell_range("qt-s"), None);
    assert_eq!(stylesheet.get_tag("tc1-5").marker, "tc1");
}

#[test]
fn override_replaces_and_deletes() {
    let stylesheet = UsfmStylesheet::default()
        .with_override(
            "\\Marker nd -\n\
             \\Marker p\n\
             \\TextType Section\n\
             \\Marker zq\n\
             \\StyleType Character\n\
             \\TextType VerseText\n",
        )
        .unwrap();
    assert!(!stylesheet.contains("nd"));
    assert!(!stylesheet.contains("nd*"));
    assert_eq!(stylesheet.get_tag("p").text_type, UsfmTextType::Section);
    assert_eq!(stylesheet.get_tag("zq").style_type, UsfmStyleType::Character);
    assert!(stylesheet.contains("zq*"));
}

#[test]
fn comments_and_paratext_prefix() {
    let stylesheet: UsfmStylesheet = "# comment\n\
         #!\\Marker zp # trailing comment\n\
         #!\\StyleType Paragraph\n\
         not an entry\n"
        .parse()
        .unwrap();
    assert_eq!(stylesheet.get_tag("zp").style_type, UsfmStyleType::Paragraph);
    assert_eq!(stylesheet.len(), 1);
}

#[test]
fn required_attribute_after_optional_fails() {
    let result = "\\Marker zw\n\\StyleType Character\n\\Attributes ?a b\n".parse::<UsfmStylesheet>();
    let err = result.unwrap_err();
    assert!(matches!(err, CoreError::Stylesheet { line: 3, .. }));
}

#[test]
fn empty_attributes_fail() {
    let result = "\\Marker zw\n\\Attributes\n".parse::<UsfmStylesheet>();
    assert!(result.is_err());
}

#[test]
fn numeric_properties() {
    let stylesheet: UsfmStylesheet = "\\Marker zp\n\
         \\StyleType Paragraph\n\
         \\FontSize -\n\
         \\LeftMargin .25\n\
         \\SpaceBefore 8\n\
         \\RightMargin -3\n\
         \\FirstLineIndent .125\n\
         \\Justification Center\n\
         \\Bold\n\
         \\Italic -\n"
        .parse()
        .unwrap();
    let tag = stylesheet.get_tag("zp");
    assert_eq!(tag.font_size, 0);
    assert_eq!(tag.space_before, 8);
    assert_eq!(tag.right_margin, 0);
    assert_eq!(tag.left_margin, 0);
    assert_eq!(tag.first_line_indent, 125);
    assert_eq!(tag.justification, UsfmJustification::Center);
    assert!(tag.bold);
    assert!(!tag.italic);
}

#[test]
fn nonpublishable_clears_publishable() {
    let stylesheet: UsfmStylesheet = "\\Marker zn\n\
         \\StyleType Paragraph\n\
         \\TextProperties paragraph NonPublishable\n"
        .parse()
        .unwrap();
    let tag = stylesheet.get_tag("zn");
    assert!(tag.has(TextProperties::NONPUBLISHABLE));
    assert!(!tag.has(TextProperties::PUBLISHABLE));
}

#[test]
fn missing_default_file_uses_embedded() {
    let dir = std::env::temp_dir().join("usfm-core-missing-stylesheet-dir");
    let stylesheet = UsfmStylesheet::from_files(&dir.join(DEFAULT_STYLESHEET_NAME), None).unwrap();
    assert!(stylesheet.contains("v"));

    let missing = UsfmStylesheet::from_files(&dir.join("custom.sty"), None);
    assert!(matches!(missing, Err(CoreError::Io(_))));
}
