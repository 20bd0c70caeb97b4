//! Tests for tokenization and detokenization

use super::*;
use pretty_assertions::assert_eq;

fn tokenize_default(usfm: &str) -> Vec<UsfmToken> {
    let stylesheet = UsfmStylesheet::default();
    tokenize(&stylesheet, usfm, false)
}

fn types(tokens: &[UsfmToken]) -> Vec<UsfmTokenType> {
    tokens.iter().map(|t| t.token_type).collect()
}

#[test]
fn tokenize_basic_document() {
    let tokens = tokenize_default(
        "\\id MAT - Test\n\\c 1\n\\p\n\\v 1 This is verse one.\n\\v 2 This is \\nd Lord\\nd* verse two.\n",
    );
    assert_eq!(
        types(&tokens),
        vec![
            UsfmTokenType::Book,
            UsfmTokenType::Text,
            UsfmTokenType::Chapter,
            UsfmTokenType::Paragraph,
            UsfmTokenType::Verse,
            UsfmTokenType::Text,
            UsfmTokenType::Verse,
            UsfmTokenType::Text,
            UsfmTokenType::Character,
            UsfmTokenType::Text,
            UsfmTokenType::End,
            UsfmTokenType::Text,
        ]
    );
    assert_eq!(tokens[0].data.as_deref(), Some("MAT"));
    assert_eq!(tokens[1].text_str(), "- Test ");
    assert_eq!(tokens[2].data.as_deref(), Some("1"));
    assert_eq!(tokens[5].text_str(), "This is verse one. ");
    assert_eq!(tokens[8].end_marker.as_deref(), Some("nd*"));
    assert_eq!(tokens[11].text_str(), "verse two. ");
}

#[test]
fn detokenize_basic_document() {
    let tokens = tokenize_default(
        "\\id MAT - Test\n\\c 1\n\\p\n\\v 1 This is verse one.\n\\v 2 This is \\nd Lord\\nd* verse two.\n",
    );
    assert_eq!(
        detokenize(&tokens, false),
        "\\id MAT - Test\r\n\\c 1\r\n\\p\r\n\\v 1 This is verse one.\r\n\\v 2 This is \\nd Lord\\nd*verse two.\r\n"
    );
}

#[test]
fn round_trip_is_stable() {
    let stylesheet = UsfmStylesheet::default();
    let tokens = tokenize(
        &stylesheet,
        "\\id MAT\n\\c 1\n\\s Heading\n\\p\n\\v 1 Text \\f + \\fr 1:1 \\ft Note\\f* more.\n\\q1\n\\v 2 Poetry\n",
        false,
    );
    let usfm = detokenize(&tokens, false);
    let again = tokenize(&stylesheet, &usfm, false);
    assert_eq!(again, tokens);
    assert_eq!(detokenize(&again, false), usfm);
}

#[test]
fn attributes_on_character_style() {
    let tokens = tokenize_default("\\w gloss|lemma=\"x\"\\w*");
    assert_eq!(
        types(&tokens),
        vec![
            UsfmTokenType::Character,
            UsfmTokenType::Text,
            UsfmTokenType::Attribute,
            UsfmTokenType::End,
        ]
    );
    assert_eq!(tokens[1].text_str(), "gloss");
    assert_eq!(tokens[0].get_attribute("lemma"), Some("x"));
    assert_eq!(tokens[2].to_usfm(), "|lemma=\"x\"");
    assert_eq!(tokens[2].data.as_deref(), Some("lemma=\"x\""));
    assert_eq!(detokenize(&tokens, false), "\\w gloss|lemma=\"x\"\\w*\r\n");
}

#[test]
fn default_attribute_value() {
    let tokens = tokenize_default("\\p \\w gracious|grace\\w* words");
    let character = &tokens[1];
    assert_eq!(character.token_type, UsfmTokenType::Character);
    assert_eq!(character.get_attribute("lemma"), Some("grace"));
    assert_eq!(tokens[3].to_usfm(), "|grace");
    assert_eq!(
        detokenize(&tokens, false),
        "\\p \\w gracious|grace\\w*words\r\n"
    );
}

#[test]
fn invalid_attributes_stay_text() {
    let tokens = tokenize_default("\\p \\bd bold|x=y\\bd*");
    assert_eq!(tokens[2].token_type, UsfmTokenType::Text);
    assert_eq!(tokens[2].text_str(), "bold|x=y");
    assert!(tokens[1].attributes().is_empty());
}

#[test]
fn bar_without_end_marker_is_text() {
    let tokens = tokenize_default("\\p a|b \\v 1 c");
    assert_eq!(tokens[1].text_str(), "a|b ");
    assert_eq!(tokens[2].token_type, UsfmTokenType::Verse);
}

#[test]
fn figure_usfm2_form_is_converted() {
    let tokens = tokenize_default("\\p \\fig DESC|file.jpg|col|loc|copy|cap|ref\\fig*");
    let figure = &tokens[1];
    assert_eq!(figure.nestless_marker(), Some("fig"));
    assert_eq!(figure.get_attribute("alt"), Some("DESC"));
    assert_eq!(figure.get_attribute("src"), Some("file.jpg"));
    assert_eq!(figure.get_attribute("size"), Some("col"));
    assert_eq!(figure.get_attribute("loc"), Some("loc"));
    assert_eq!(figure.get_attribute("copy"), Some("copy"));
    assert_eq!(figure.get_attribute("ref"), Some("ref"));
    assert_eq!(tokens[2].text_str(), "cap");
    assert_eq!(tokens[3].token_type, UsfmTokenType::Attribute);
}

#[test]
fn milestones_with_attributes() {
    let usfm = "\\v 1 \\qt-s |sid=\"qt1\" who=\"Pilate\"\\*Are you the king?\\qt-e\\*\n";
    let tokens = tokenize_default(usfm);
    assert_eq!(
        types(&tokens),
        vec![
            UsfmTokenType::Verse,
            UsfmTokenType::Milestone,
            UsfmTokenType::Text,
            UsfmTokenType::MilestoneEnd,
        ]
    );
    assert_eq!(tokens[1].get_attribute("who"), Some("Pilate"));
    assert_eq!(tokens[1].end_marker.as_deref(), Some("qt-e"));
    assert_eq!(
        detokenize(&tokens, false),
        "\\v 1 \\qt-s |sid=\"qt1\" who=\"Pilate\"\\*Are you the king?\\qt-e\\*\r\n"
    );
}

#[test]
fn unterminated_milestone_degrades_to_text() {
    let tokens = tokenize_default("\\p \\ts text");
    assert_eq!(types(&tokens), vec![UsfmTokenType::Paragraph, UsfmTokenType::Text]);
    assert_eq!(tokens[1].text_str(), "\\ts text");
}

#[test]
fn unknown_markers() {
    let tokens = tokenize_default("\\p \\zzz text\\zzz*");
    assert_eq!(
        types(&tokens),
        vec![
            UsfmTokenType::Paragraph,
            UsfmTokenType::Unknown,
            UsfmTokenType::Text,
            UsfmTokenType::End,
        ]
    );
    assert_eq!(tokens[1].end_marker.as_deref(), Some("zzz*"));
}

#[test]
fn nested_character_styles() {
    let tokens = tokenize_default("\\p \\bd bold \\+it both\\+it*\\bd*");
    assert_eq!(tokens[3].token_type, UsfmTokenType::Character);
    assert_eq!(tokens[3].marker.as_deref(), Some("+it"));
    assert!(tokens[3].is_nested());
    assert_eq!(tokens[3].nestless_marker(), Some("it"));
    assert_eq!(tokens[3].end_marker.as_deref(), Some("+it*"));
    assert_eq!(tokens[5].token_type, UsfmTokenType::End);
    assert_eq!(tokens[5].marker.as_deref(), Some("+it*"));
}

#[test]
fn verse_after_parenthesis_stays_inline() {
    let tokens = tokenize_default("\\p text (\\v 2 more)");
    assert_eq!(tokens[1].text_str(), "text (");
    assert_eq!(detokenize(&tokens, false), "\\p text (\\v 2 more)\r\n");
}

#[test]
fn space_inserted_after_end_marker_before_paragraph() {
    let tokens = tokenize_default("\\p \\em test\\em*\\p here");
    assert_eq!(tokens[4].token_type, UsfmTokenType::Text);
    assert_eq!(tokens[4].text_str(), " ");
    assert_eq!(tokens[5].token_type, UsfmTokenType::Paragraph);
}

#[test]
fn table_cell_ranges() {
    let tokens = tokenize_default("\\tr \\tc1-2 a\\tc3 b");
    assert_eq!(tokens[1].marker.as_deref(), Some("tc1-2"));
    assert_eq!(tokens[1].col_span, 2);
    assert_eq!(tokens[3].col_span, 0);
}

#[test]
fn notes_carry_callers() {
    let tokens = tokenize_default("\\p text\\f + \\ft note\\f*");
    let note = &tokens[2];
    assert_eq!(note.token_type, UsfmTokenType::Note);
    assert_eq!(note.data.as_deref(), Some("+"));
    assert_eq!(note.to_usfm(), "\\f + ");
}

#[test]
fn source_positions() {
    let tokens = tokenize_default("\\id MAT\n\\c 1\n\\p\n\\v 1 Text");
    let positions: Vec<(usize, usize)> = tokens.iter().map(|t| (t.line, t.column)).collect();
    assert_eq!(positions, vec![(1, 1), (2, 1), (3, 1), (4, 1), (4, 6)]);
}

#[test]
fn preserve_whitespace_keeps_runs() {
    let stylesheet = UsfmStylesheet::default();
    let tokens = tokenize(&stylesheet, "\\p  text\n", true);
    assert_eq!(types(&tokens), vec![UsfmTokenType::Paragraph, UsfmTokenType::Text]);
    assert_eq!(tokens[1].text_str(), "  text\n");
}

#[test]
fn regularizes_control_characters() {
    let tokens = tokenize_default("\\p a\tb\r\n  c");
    assert_eq!(tokens[1].text_str(), "a b c");
}

#[test]
fn detokenize_output_contract() {
    assert_eq!(detokenize(&[], false), "");
    let tokens = vec![UsfmToken::text(" lead "), UsfmToken::text("trail ")];
    assert_eq!(detokenize(&tokens, false), "lead trail\r\n");
}

#[test]
fn rtl_reference_order_marks_verse_bridges() {
    let stylesheet = UsfmStylesheet::default();
    let tokens = tokenize(&stylesheet, "\\p\n\\v 1-2 Text\n", false);

    let right_to_left = UsfmTokenizer::new(&stylesheet)
        .with_rtl_reference_order(RtlReferenceOrder::BookChapterVerse);
    assert_eq!(
        right_to_left.detokenize(&tokens, false),
        "\\p\r\n\\v 1\u{200F}-2 Text\r\n"
    );

    let left_to_right = UsfmTokenizer::new(&stylesheet)
        .with_rtl_reference_order(RtlReferenceOrder::BookVerseChapter);
    assert_eq!(
        left_to_right.detokenize(&tokens, false),
        "\\p\r\n\\v 1\u{200E}-2 Text\r\n"
    );

    assert_eq!(
        UsfmTokenizer::new(&stylesheet).detokenize(&tokens, false),
        "\\p\r\n\\v 1-2 Text\r\n"
    );
}

#[test]
fn rtl_reference_order_replaces_existing_marks() {
    let stylesheet = UsfmStylesheet::default();
    let verse = UsfmToken::new(
        UsfmTokenType::Verse,
        "v",
        None,
        None,
        Some("3\u{200F},5-6".to_string()),
    );
    let tokenizer = UsfmTokenizer::new(&stylesheet)
        .with_rtl_reference_order(RtlReferenceOrder::BookVerseChapter);
    assert_eq!(
        tokenizer.detokenize(&[verse], false),
        "\\v 3\u{200E},5\u{200E}-6\r\n"
    );
}

#[test]
fn rtl_reference_order_from_str() {
    assert_eq!(
        "book-chapter-verse".parse::<RtlReferenceOrder>(),
        Ok(RtlReferenceOrder::BookChapterVerse)
    );
    assert_eq!(
        "BOOK_VERSE_CHAPTER".parse::<RtlReferenceOrder>(),
        Ok(RtlReferenceOrder::BookVerseChapter)
    );
    assert_eq!(RtlReferenceOrder::default(), RtlReferenceOrder::NotSet);
    assert!("verse-first".parse::<RtlReferenceOrder>().is_err());
}
