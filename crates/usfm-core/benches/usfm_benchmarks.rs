//! Benchmarks for tokenizing, parsing and rewriting USFM
//!
//! Generates synthetic books so the numbers do not depend on external
//! files. Book sizes cover a short epistle up to a long gospel.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fmt::Write;
use usfm_core::handlers::ScriptureRefTracker;
use usfm_core::update::{UpdateUsfmOptions, UpdateUsfmRow, UpdateUsfmTextBehavior};
use usfm_core::{
    detokenize, parse_usfm, tokenize, update_usfm, ScriptureRef, UsfmParserHandler,
    UsfmParserState, UsfmStylesheet,
};

/// Synthetic book with headings, poetry, notes and character styles
fn generate_book(chapters: u32, verses: u32) -> String {
    let mut usfm = String::from("\\id MAT - Benchmark\n\\h Matthew\n\\mt1 Matthew\n");
    for chapter in 1..=chapters {
        let _ = writeln!(usfm, "\\c {chapter}");
        let _ = writeln!(usfm, "\\s1 Heading for chapter {chapter}");
        usfm.push_str("\\p\n");
        for verse in 1..=verses {
            match verse % 4 {
                0 => {
                    let _ = writeln!(usfm, "\\q1\n\\v {verse} A line of poetry for verse {verse}");
                }
                1 => {
                    let _ = writeln!(
                        usfm,
                        "\\v {verse} Text with a note\\f + \\fr {chapter}:{verse} \\ft A footnote.\\f* here."
                    );
                }
                2 => {
                    let _ = writeln!(
                        usfm,
                        "\\v {verse} The \\nd Lord\\nd* said \\w word|lemma=\"logos\"\\w* again."
                    );
                }
                _ => {
                    let _ = writeln!(usfm, "\\v {verse} Plain verse text number {verse}.");
                }
            }
        }
    }
    usfm
}

/// One row per verse
fn generate_rows(chapters: u32, verses: u32) -> Vec<UpdateUsfmRow> {
    (1..=chapters)
        .flat_map(|chapter| (1..=verses).map(move |verse| (chapter, verse)))
        .filter_map(|(chapter, verse)| {
            let scripture_ref: ScriptureRef = format!("MAT {chapter}:{verse}").parse().ok()?;
            Some(UpdateUsfmRow::new(vec![scripture_ref], format!("Replacement {chapter}:{verse}")))
        })
        .collect()
}

/// Counts verse starts through the reference tracker
#[derive(Default)]
struct VerseCounter {
    tracker: ScriptureRefTracker,
    count: usize,
}

impl UsfmParserHandler for VerseCounter {
    fn verse(
        &mut self,
        state: &UsfmParserState<'_>,
        number: &str,
        marker: &str,
        _alt_number: Option<&str>,
        _pub_number: Option<&str>,
    ) {
        self.count += self
            .tracker
            .verse(state, number, marker)
            .iter()
            .filter(|event| event.is_start())
            .count();
    }
}

const SIZES: [(&str, u32, u32); 3] = [("small", 5, 20), ("medium", 28, 30), ("large", 80, 40)];

fn bench_tokenize(c: &mut Criterion) {
    let stylesheet = UsfmStylesheet::default();
    let mut group = c.benchmark_group("tokenize");
    for (name, chapters, verses) in SIZES {
        let usfm = generate_book(chapters, verses);
        group.throughput(Throughput::Bytes(usfm.len() as u64));
        group.bench_with_input(BenchmarkId::new("tokenize", name), &usfm, |b, usfm| {
            b.iter(|| tokenize(&stylesheet, black_box(usfm), false));
        });
        let tokens = tokenize(&stylesheet, &usfm, false);
        group.bench_with_input(BenchmarkId::new("detokenize", name), &tokens, |b, tokens| {
            b.iter(|| detokenize(black_box(tokens), false));
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let stylesheet = UsfmStylesheet::default();
    let mut group = c.benchmark_group("parse");
    for (name, chapters, verses) in SIZES {
        let usfm = generate_book(chapters, verses);
        group.throughput(Throughput::Bytes(usfm.len() as u64));
        group.bench_with_input(BenchmarkId::new("events", name), &usfm, |b, usfm| {
            b.iter(|| parse_usfm(black_box(usfm), &stylesheet, &mut ()));
        });
        group.bench_with_input(BenchmarkId::new("tracked", name), &usfm, |b, usfm| {
            b.iter(|| {
                let mut counter = VerseCounter::default();
                parse_usfm(black_box(usfm), &stylesheet, &mut counter);
                counter.count
            });
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let stylesheet = UsfmStylesheet::default();
    let options = UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew);
    let mut group = c.benchmark_group("update");
    for (name, chapters, verses) in SIZES {
        let usfm = generate_book(chapters, verses);
        let rows = generate_rows(chapters, verses);
        group.throughput(Throughput::Bytes(usfm.len() as u64));
        group.bench_with_input(BenchmarkId::new("prefer_new", name), &usfm, |b, usfm| {
            b.iter(|| {
                update_usfm(black_box(usfm), &stylesheet, rows.clone(), options.clone())
            });
        });
    }
    group.finish();
}

fn bench_stylesheet(c: &mut Criterion) {
    c.bench_function("stylesheet_default", |b| b.iter(UsfmStylesheet::default));
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_update,
    bench_stylesheet
);
criterion_main!(benches);
