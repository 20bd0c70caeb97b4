//! End-to-end rewrite tests through the public API

use pretty_assertions::assert_eq;
use usfm_core::update::{
    StripStyleMarkersHandler, TextTransformHandler, UpdateBlockHandlerRegistry,
    UpdateUsfmOptions, UpdateUsfmParserHandler, UpdateUsfmRow, UpdateUsfmTextBehavior,
};
use usfm_core::{update_usfm, UsfmStylesheet};

const BOOK: &str = "\\id MAT - Old\n\\c 1\n\\p\n\\v 1 Old one.\n\\v 2 Old two.\n\\c 2\n\\s1 Old heading\n\\p\n\\v 1 Old three.\n";

const ROWS: &str = "MAT 1:1\tNew one.\nMAT 2:0/1:s1\tNew heading\nMAT 2:1\tNew three.\n";

fn rows() -> Vec<UpdateUsfmRow> {
    ROWS.lines()
        .map(UpdateUsfmRow::parse_tsv_line)
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn rows_from_tsv_rewrite_a_book() {
    let options = UpdateUsfmOptions::default()
        .with_text_behavior(UpdateUsfmTextBehavior::PreferNew)
        .with_id_text("- New")
        .with_remark("Drafted");
    let usfm = update_usfm(BOOK, &UsfmStylesheet::default(), rows(), options).unwrap();
    assert_eq!(
        usfm,
        "\\id MAT - New\r\n\\rem Drafted\r\n\\c 1\r\n\\p\r\n\\v 1 New one.\r\n\\v 2 Old two.\r\n\\c 2\r\n\\s1 New heading\r\n\\p\r\n\\v 1 New three.\r\n"
    );
}

#[test]
fn rewriting_twice_is_stable() {
    let options = UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew);
    let stylesheet = UsfmStylesheet::default();
    let once = update_usfm(BOOK, &stylesheet, rows(), options.clone()).unwrap();
    let twice = update_usfm(&once, &stylesheet, rows(), options).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn override_stylesheet_markers_are_styles() {
    let stylesheet = UsfmStylesheet::default()
        .with_override("\\Marker zx\n\\StyleType Character\n")
        .unwrap();
    let rows = vec![UpdateUsfmRow::new(vec!["MAT 1:1".parse().unwrap()], "New")];
    let usfm = update_usfm(
        "\\id MAT\n\\c 1\n\\p\n\\v 1 Old \\zx mark\\zx* one.\n",
        &stylesheet,
        rows,
        UpdateUsfmOptions::default().with_text_behavior(UpdateUsfmTextBehavior::PreferNew),
    )
    .unwrap();
    assert_eq!(usfm, "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 New\r\n");
}

#[test]
fn handlers_run_in_registration_order() {
    let mut handlers = UpdateBlockHandlerRegistry::new();
    handlers.register(Box::new(StripStyleMarkersHandler)).unwrap();
    handlers
        .register(Box::new(TextTransformHandler::new("upper", str::to_uppercase)))
        .unwrap();
    assert_eq!(handlers.names(), ["strip-style-markers", "upper"]);

    let usfm = UpdateUsfmParserHandler::new(Vec::new(), UpdateUsfmOptions::default())
        .with_handlers(handlers)
        .update(
            "\\id MAT\n\\c 1\n\\p\n\\v 1 The \\nd Lord \\nd*said\n",
            &UsfmStylesheet::default(),
        )
        .unwrap();
    assert_eq!(usfm, "\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1 THE LORD SAID\r\n");
}
