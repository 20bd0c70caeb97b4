//! Tests for the reference tracker and versification detector

use super::*;
use crate::parser::{parse_usfm, UsfmParserHandler, UsfmParserState};
use crate::scripture::{ScriptureRef, VersificationTable};
use crate::stylesheet::UsfmStylesheet;
use crate::tokenizer::UsfmAttribute;
use pretty_assertions::assert_eq;

/// Forwards parser events to a tracker and records the span events
#[derive(Default)]
struct TrackerRecorder {
    tracker: ScriptureRefTracker,
    events: Vec<String>,
    /// Book code and number of events recorded when it started
    book_starts: Vec<(String, usize)>,
}

impl TrackerRecorder {
    fn record(&mut self, events: Vec<ScriptureTextEvent>) {
        for event in events {
            let (name, refs) = match &event {
                ScriptureTextEvent::StartVerse(_) => ("start_verse", event.refs()),
                ScriptureTextEvent::EndVerse(_) => ("end_verse", event.refs()),
                ScriptureTextEvent::StartNonVerse(_) => ("start_nonverse", event.refs()),
                ScriptureTextEvent::EndNonVerse(_) => ("end_nonverse", event.refs()),
                ScriptureTextEvent::StartEmbed(_) => ("start_embed", event.refs()),
                ScriptureTextEvent::EndEmbed(_) => ("end_embed", event.refs()),
            };
            let refs: Vec<String> = refs.iter().map(ScriptureRef::to_string).collect();
            self.events.push(format!("{name} {}", refs.join(",")));
        }
    }
}

impl UsfmParserHandler for TrackerRecorder {
    fn end_usfm(&mut self, _: &UsfmParserState<'_>) {
        let events = self.tracker.end_usfm();
        self.record(events);
    }

    fn start_book(&mut self, _: &UsfmParserState<'_>, _: &str, code: &str) {
        let events = self.tracker.start_book();
        self.record(events);
        self.book_starts.push((code.to_string(), self.events.len()));
    }

    fn end_book(&mut self, _: &UsfmParserState<'_>, _: &str) {
        let events = self.tracker.end_book();
        self.record(events);
    }

    fn chapter(&mut self, state: &UsfmParserState<'_>, _: &str, marker: &str, _: Option<&str>, _: Option<&str>) {
        let events = self.tracker.chapter(state, marker);
        self.record(events);
    }

    fn verse(&mut self, state: &UsfmParserState<'_>, number: &str, marker: &str, _: Option<&str>, _: Option<&str>) {
        let events = self.tracker.verse(state, number, marker);
        self.record(events);
    }

    fn start_para(&mut self, state: &UsfmParserState<'_>, marker: &str, _: bool, _: &[UsfmAttribute]) {
        let events = self.tracker.start_para(state, marker);
        self.record(events);
    }

    fn end_para(&mut self, _: &UsfmParserState<'_>, marker: &str) {
        let events = self.tracker.end_para(marker);
        self.record(events);
    }

    fn start_row(&mut self, _: &UsfmParserState<'_>, marker: &str) {
        self.tracker.start_row(marker);
    }

    fn end_row(&mut self, _: &UsfmParserState<'_>, _: &str) {
        self.tracker.end_row();
    }

    fn start_cell(&mut self, _: &UsfmParserState<'_>, marker: &str, _: &str, _: u32) {
        let events = self.tracker.start_cell(marker);
        self.record(events);
    }

    fn end_cell(&mut self, _: &UsfmParserState<'_>, _: &str) {
        let events = self.tracker.end_cell();
        self.record(events);
    }

    fn start_sidebar(&mut self, _: &UsfmParserState<'_>, marker: &str, _: Option<&str>) {
        self.tracker.start_sidebar(marker);
    }

    fn end_sidebar(&mut self, _: &UsfmParserState<'_>, _: &str, _: bool) {
        self.tracker.end_sidebar();
    }

    fn text(&mut self, state: &UsfmParserState<'_>, text: &str) {
        let events = self.tracker.text(state, text);
        self.record(events);
    }

    fn opt_break(&mut self, state: &UsfmParserState<'_>) {
        let events = self.tracker.opt_break(state);
        self.record(events);
    }

    fn start_char(&mut self, state: &UsfmParserState<'_>, marker: &str, _: bool, _: &[UsfmAttribute]) {
        let events = self.tracker.start_char(state, marker);
        self.record(events);
    }

    fn end_char(&mut self, _: &UsfmParserState<'_>, marker: &str, _: &[UsfmAttribute], _: bool) {
        let events = self.tracker.end_char(marker);
        self.record(events);
    }

    fn start_note(&mut self, state: &UsfmParserState<'_>, marker: &str, _: &str, _: Option<&str>) {
        let events = self.tracker.start_note(state, marker);
        self.record(events);
    }

    fn end_note(&mut self, _: &UsfmParserState<'_>, _: &str, _: bool) {
        let events = self.tracker.end_note();
        self.record(events);
    }
}

fn track(usfm: &str) -> TrackerRecorder {
    let stylesheet = UsfmStylesheet::default();
    let mut recorder = TrackerRecorder::default();
    parse_usfm(usfm, &stylesheet, &mut recorder);
    recorder
}

fn verse_events(recorder: &TrackerRecorder) -> Vec<&str> {
    recorder
        .events
        .iter()
        .map(String::as_str)
        .filter(|event| event.contains("_verse "))
        .collect()
}

#[test]
fn headings_and_verses() {
    let recorder = track("\\id MAT - Test\n\\c 1\n\\s Heading\n\\p\n\\v 1 One\n\\v 2 Two\n");
    assert_eq!(
        recorder.events,
        vec![
            "start_nonverse MAT 1:0/1:s",
            "end_nonverse MAT 1:0/1:s",
            "start_nonverse MAT 1:0/2:p",
            "end_nonverse MAT 1:0/2:p",
            "start_verse MAT 1:1",
            "end_verse MAT 1:1",
            "start_verse MAT 1:2",
            "end_verse MAT 1:2",
        ]
    );
    assert_eq!(recorder.tracker.current_text_type(), ScriptureTextType::None);
}

#[test]
fn heading_inside_verse_nests_under_it() {
    let recorder = track("\\id MAT\n\\c 1\n\\p\n\\v 1 One\n\\s Head\n\\p\n\\v 2 Two\n");
    assert_eq!(
        recorder.events,
        vec![
            "start_nonverse MAT 1:0/1:p",
            "end_nonverse MAT 1:0/1:p",
            "start_verse MAT 1:1",
            "start_nonverse MAT 1:1/1:s",
            "end_nonverse MAT 1:1/1:s",
            "end_verse MAT 1:1",
            "start_verse MAT 1:2",
            "end_verse MAT 1:2",
        ]
    );
}

#[test]
fn duplicate_verses_are_suppressed() {
    let recorder = track(
        "\\id MAT\n\\c 1\n\\p\n\\v 3 text\n\\v 3 text2\\f + \\ft note\\f*\n\\v 4 more",
    );
    assert_eq!(
        verse_events(&recorder),
        vec![
            "start_verse MAT 1:3",
            "end_verse MAT 1:3",
            "start_verse MAT 1:4",
            "end_verse MAT 1:4",
        ]
    );
    assert!(!recorder.events.iter().any(|e| e.starts_with("start_embed")));
}

#[test]
fn overlapping_bridges_merge() {
    let recorder = track("\\id MAT\n\\c 1\n\\p\n\\v 1-2 a\n\\v 2-3 b\n\\v 4 c");
    assert_eq!(
        verse_events(&recorder),
        vec![
            "start_verse MAT 1:1,MAT 1:2",
            "end_verse MAT 1:1,MAT 1:2,MAT 1:3",
            "start_verse MAT 1:4",
            "end_verse MAT 1:4",
        ]
    );
}

#[test]
fn notes_and_cross_references_are_embeds() {
    let recorder = track(
        "\\id MAT\n\\c 1\n\\p\n\\v 1 Text\\f + \\ft note\\f* more \\x - \\xt ref\\x*\n",
    );
    let embeds: Vec<&str> = recorder
        .events
        .iter()
        .map(String::as_str)
        .filter(|event| event.contains("_embed "))
        .collect();
    assert_eq!(
        embeds,
        vec![
            "start_embed MAT 1:1/1:f",
            "end_embed MAT 1:1/1:f",
            "start_embed MAT 1:1/2:x",
            "end_embed MAT 1:1/2:x",
        ]
    );
}

#[test]
fn table_cells_are_non_verse_text() {
    let recorder = track("\\id MAT\n\\c 1\n\\tr \\tc1 A\\tc2 B\n\\tr \\tc1 C\n");
    assert_eq!(
        recorder.events,
        vec![
            "start_nonverse MAT 1:0/1:tr/1:tc1",
            "end_nonverse MAT 1:0/1:tr/1:tc1",
            "start_nonverse MAT 1:0/1:tr/2:tc2",
            "end_nonverse MAT 1:0/1:tr/2:tc2",
            "start_nonverse MAT 1:0/2:tr/1:tc1",
            "end_nonverse MAT 1:0/2:tr/1:tc1",
        ]
    );
}

#[test]
fn private_use_markers_are_ignored() {
    let recorder = track("\\id MAT\n\\c 1\n\\p\n\\v 1 a\n\\zfoo private\n\\v 2 b");
    assert!(!recorder.events.iter().any(|e| e.contains("zfoo")));
    assert_eq!(
        verse_events(&recorder),
        vec![
            "start_verse MAT 1:1",
            "end_verse MAT 1:1",
            "start_verse MAT 1:2",
            "end_verse MAT 1:2",
        ]
    );
}

#[test]
fn later_id_lines_keep_the_first_book() {
    let recorder = track("\\id MAT\n\\c 1\n\\p\n\\v 1 a\n\\id MRK\n\\c 1\n\\p\n\\v 1 b\n");
    assert_eq!(
        verse_events(&recorder),
        vec![
            "start_verse MAT 1:1",
            "end_verse MAT 1:1",
            "start_verse MAT 1:1",
            "end_verse MAT 1:1",
        ]
    );
}

#[test]
fn verse_text_ends_before_the_next_book() {
    let recorder = track("\\id MAT\n\\c 1\n\\p\n\\v 1 a\n\\id MRK\n");
    let (code, before_second_book) = &recorder.book_starts[1];
    assert_eq!(code, "MRK");
    assert_eq!(
        recorder.events[*before_second_book - 1],
        "end_verse MAT 1:1"
    );
    assert!(recorder.events[*before_second_book..]
        .iter()
        .all(|event| !event.contains("_verse ")));
}

#[test]
fn event_helpers() {
    let verse: ScriptureRef = "MAT 1:1".parse().unwrap();
    let start = ScriptureTextEvent::StartEmbed(verse.clone());
    assert!(start.is_start());
    assert_eq!(start.refs(), [verse.clone()]);
    let end = ScriptureTextEvent::EndVerse(vec![verse.clone(), verse]);
    assert!(!end.is_start());
    assert_eq!(end.refs().len(), 2);
}

const VRS: &str = "MAT 1:5 2:3\n#! *MAT 2:2,a,b\n";

fn detect(usfm: &str) -> Vec<UsfmVersificationError> {
    let versification = VersificationTable::parse("test", VRS).unwrap();
    let stylesheet = UsfmStylesheet::default();
    let mut detector = UsfmVersificationErrorDetector::new(&versification);
    parse_usfm(usfm, &stylesheet, &mut detector);
    detector.into_errors()
}

fn chapter(number: u32, verses: &[&str]) -> String {
    let mut usfm = format!("\\c {number}\n\\p\n");
    for verse in verses {
        usfm.push_str(&format!("\\v {verse} text\n"));
    }
    usfm
}

fn summary(errors: &[UsfmVersificationError]) -> Vec<(UsfmVersificationErrorType, String, String)> {
    errors
        .iter()
        .map(|error| {
            (
                error.error_type(),
                error.expected_verse_ref(),
                error.actual_verse_ref(),
            )
        })
        .collect()
}

#[test]
fn complete_book_has_no_errors() {
    let usfm = format!(
        "\\id MAT\n{}{}",
        chapter(1, &["1", "2", "3", "4", "5"]),
        chapter(2, &["1", "2a", "2b", "3"])
    );
    assert_eq!(detect(&usfm), vec![]);
}

#[test]
fn missing_verse_and_chapter() {
    let usfm = format!("\\id MAT\n{}", chapter(1, &["1", "2", "3", "4"]));
    assert_eq!(
        summary(&detect(&usfm)),
        vec![(
            UsfmVersificationErrorType::MissingChapter,
            "MAT 2:3".to_string(),
            "MAT 1:4".to_string()
        )]
    );

    let usfm = format!(
        "\\id MAT\n{}{}",
        chapter(1, &["1", "2", "3", "4"]),
        chapter(2, &["1", "2a", "2b", "3"])
    );
    assert_eq!(
        summary(&detect(&usfm)),
        vec![(
            UsfmVersificationErrorType::MissingVerse,
            "MAT 1:5".to_string(),
            "MAT 1:4".to_string()
        )]
    );
}

#[test]
fn extra_verse() {
    let usfm = format!(
        "\\id MAT\n{}{}",
        chapter(1, &["1", "2", "3", "4", "5", "6"]),
        chapter(2, &["1", "2a", "2b", "3"])
    );
    let errors = detect(&usfm);
    assert_eq!(
        summary(&errors),
        vec![(
            UsfmVersificationErrorType::ExtraVerse,
            String::new(),
            "MAT 1:6".to_string()
        )]
    );
    assert_eq!(errors[0].to_string(), "extra-verse: MAT 1:6");
}

#[test]
fn invalid_verse_range() {
    let usfm = format!(
        "\\id MAT\n{}{}",
        chapter(1, &["1", "3-2", "4", "5"]),
        chapter(2, &["1", "2a", "2b", "3"])
    );
    let errors = detect(&usfm);
    assert_eq!(
        summary(&errors),
        vec![(
            UsfmVersificationErrorType::InvalidVerseRange,
            "MAT 1:2-3".to_string(),
            "MAT 1:3-2".to_string()
        )]
    );
    assert_eq!(
        errors[0].to_string(),
        "invalid-verse-range: expected MAT 1:2-3, found MAT 1:3-2"
    );
}

#[test]
fn verse_segments() {
    let usfm = format!(
        "\\id MAT\n{}{}",
        chapter(1, &["1", "2", "3a", "4", "5"]),
        chapter(2, &["1", "2", "3"])
    );
    assert_eq!(
        summary(&detect(&usfm)),
        vec![
            (
                UsfmVersificationErrorType::ExtraVerseSegment,
                "MAT 1:3".to_string(),
                "MAT 1:3a".to_string()
            ),
            (
                UsfmVersificationErrorType::MissingVerseSegment,
                "MAT 2:2a".to_string(),
                "MAT 2:2".to_string()
            ),
        ]
    );
}

#[test]
fn non_canonical_books_are_not_checked() {
    let usfm = format!("\\id FRT\n{}", chapter(1, &["1"]));
    assert!(detect(&usfm).is_empty());
}
