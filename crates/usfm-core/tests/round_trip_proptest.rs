//! Property-based tests for usfm-core
//!
//! Generates small but structurally varied books and checks that
//! tokenizing, detokenizing and rewriting without rows are lossless.

use proptest::prelude::*;
use usfm_core::update::UpdateUsfmOptions;
use usfm_core::{detokenize, tokenize, update_usfm, UsfmStylesheet};

/// A run of lowercase words
fn arb_words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..6).prop_map(|words| words.join(" "))
}

/// Verse body with optional character style and footnote
fn arb_verse_body() -> impl Strategy<Value = String> {
    (
        arb_words(),
        prop::option::of(arb_words()),
        prop::option::of(arb_words()),
    )
        .prop_map(|(text, styled, note)| {
            let mut body = text;
            if let Some(styled) = styled {
                body.push_str(&format!(" \\w {styled}\\w* tail"));
            }
            if let Some(note) = note {
                body.push_str(&format!("\\f + \\ft {note}\\f*"));
            }
            body
        })
}

/// Chapter with an optional heading and a paragraph of verses
fn arb_chapter() -> impl Strategy<Value = (Option<String>, Vec<String>)> {
    (
        prop::option::of(arb_words()),
        prop::collection::vec(arb_verse_body(), 1..6),
    )
}

/// Complete book
fn arb_book() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_chapter(), 1..4).prop_map(|chapters| {
        let mut usfm = String::from("\\id MAT - Generated\n");
        for (index, (heading, verses)) in chapters.into_iter().enumerate() {
            usfm.push_str(&format!("\\c {}\n", index + 1));
            if let Some(heading) = heading {
                usfm.push_str(&format!("\\s {heading}\n"));
            }
            usfm.push_str("\\p\n");
            for (verse, body) in verses.into_iter().enumerate() {
                usfm.push_str(&format!("\\v {} {body}\n", verse + 1));
            }
        }
        usfm
    })
}

proptest! {
    #[test]
    fn tokens_survive_detokenize(usfm in arb_book()) {
        let stylesheet = UsfmStylesheet::default();
        let tokens = tokenize(&stylesheet, &usfm, false);
        let rendered = detokenize(&tokens, false);
        prop_assert_eq!(tokenize(&stylesheet, &rendered, false), tokens);
    }

    #[test]
    fn detokenize_is_a_fixed_point(usfm in arb_book()) {
        let stylesheet = UsfmStylesheet::default();
        let once = detokenize(&tokenize(&stylesheet, &usfm, false), false);
        let twice = detokenize(&tokenize(&stylesheet, &once, false), false);
        prop_assert_eq!(&twice, &once);
        prop_assert!(once.ends_with("\r\n"));
        prop_assert!(!once.ends_with(" \r\n"));
        prop_assert!(!once.ends_with("\r\n\r\n"));
    }

    #[test]
    fn update_without_rows_matches_detokenize(usfm in arb_book()) {
        let stylesheet = UsfmStylesheet::default();
        let expected = detokenize(&tokenize(&stylesheet, &usfm, false), false);
        let updated = update_usfm(&usfm, &stylesheet, Vec::new(), UpdateUsfmOptions::default()).unwrap();
        prop_assert_eq!(updated, expected);
    }
}
