//! Integration tests for the usfm CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const BOOK: &str = "\\id MAT - Test\n\\c 1\n\\s Heading\n\\p\n\\v 1 Original one.\n\\v 2 Original two.\n";

fn usfm() -> Command {
    let mut cmd = Command::cargo_bin("usfm").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("USFM_STYLESHEET");
    cmd
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn tokenize_lists_tokens() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    usfm()
        .arg("tokenize")
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::contains("book\t\\id MAT"))
        .stdout(predicate::str::contains("verse\t\\v 2"))
        .stdout(predicate::str::contains("\"Original one. \""));
}

#[test]
fn tokenize_json_output() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    usfm()
        .args(["tokenize", "--json"])
        .arg(&book)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["))
        .stdout(predicate::str::contains("\"token_type\": \"book\""));
}

#[test]
fn detokenize_normalizes_line_endings() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    usfm()
        .arg("detokenize")
        .arg(&book)
        .assert()
        .success()
        .stdout("\\id MAT - Test\r\n\\c 1\r\n\\s Heading\r\n\\p\r\n\\v 1 Original one.\r\n\\v 2 Original two.\r\n");
}

#[test]
fn detokenize_marks_rtl_verse_bridges() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", "\\id MAT\n\\c 1\n\\p\n\\v 1-2 Text\n");
    usfm()
        .arg("detokenize")
        .arg(&book)
        .args(["--rtl-reference-order", "book-chapter-verse"])
        .assert()
        .success()
        .stdout("\\id MAT\r\n\\c 1\r\n\\p\r\n\\v 1\u{200F}-2 Text\r\n");
}

#[test]
fn update_with_tsv_rows() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    let rows = write(&dir, "rows.tsv", "MAT 1:0/1:s\tNew heading\nMAT 1:2\tNew two.\n");
    usfm()
        .arg("update")
        .arg(&book)
        .arg("--rows")
        .arg(&rows)
        .args(["--text-behavior", "prefer-new", "--remark", "Drafted"])
        .assert()
        .success()
        .stdout("\\id MAT - Test\r\n\\rem Drafted\r\n\\c 1\r\n\\s New heading\r\n\\p\r\n\\v 1 Original one.\r\n\\v 2 New two.\r\n");
}

#[test]
fn update_with_json_rows_config_and_output_file() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    let rows = write(
        &dir,
        "rows.json",
        r#"[{"refs": ["MAT 1:1"], "text": "Replaced one."}]"#,
    );
    let config = write(&dir, "update.toml", "text_behavior = \"strip_existing\"\n");
    let output = dir.path().join("out.usfm");
    usfm()
        .arg("update")
        .arg(&book)
        .arg("--rows")
        .arg(&rows)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout("");
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "\\id MAT - Test\r\n\\c 1\r\n\\s\r\n\\p\r\n\\v 1 Replaced one.\r\n\\v 2\r\n"
    );
}

#[test]
fn update_rejects_bad_rows() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    let rows = write(&dir, "rows.tsv", "MAT 1:1 missing tab\n");
    usfm()
        .arg("update")
        .arg(&book)
        .arg("--rows")
        .arg(&rows)
        .assert()
        .failure()
        .stderr(predicate::str::contains("rows.tsv"))
        .stderr(predicate::str::contains("line 1"));
}

#[test]
fn check_reports_versification_errors() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    let vrs = write(&dir, "test.vrs", "MAT 1:3\n");
    usfm()
        .arg("check")
        .arg(&book)
        .arg("--versification")
        .arg(&vrs)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing-verse: expected MAT 1:3, found MAT 1:2"))
        .stderr(predicate::str::contains("1 versification error(s) found"));
}

#[test]
fn check_passes_complete_book() {
    let dir = TempDir::new().unwrap();
    let book = write(&dir, "MAT.usfm", BOOK);
    let vrs = write(&dir, "test.vrs", "MAT 1:2\n");
    usfm()
        .arg("check")
        .arg(&book)
        .arg("--versification")
        .arg(&vrs)
        .assert()
        .success()
        .stdout("No versification errors\n");
}

#[test]
fn markers_honours_override_stylesheet() {
    let dir = TempDir::new().unwrap();
    let custom = write(&dir, "custom.sty", "\\Marker zqt\n\\StyleType Character\n");
    usfm()
        .arg("markers")
        .args(["--style-type", "character"])
        .arg("--override-stylesheet")
        .arg(&custom)
        .assert()
        .success()
        .stdout(predicate::str::contains("zqt\tcharacter"))
        .stdout(predicate::str::contains("\nnd\tcharacter"))
        .stdout(predicate::str::contains("\tparagraph\t").not());
}

#[test]
fn missing_input_fails_with_path() {
    usfm()
        .args(["detokenize", "no-such-file.usfm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-file.usfm"));
}
