//! File reading and output selection

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use usfm_core::utils::text::strip_bom;

/// Read a USFM file, dropping a leading byte order mark
///
/// # Errors
///
/// Returns an error naming the file if it cannot be read as UTF-8.
pub fn read_usfm(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let (stripped, had_bom) = strip_bom(&text);
    if had_bom {
        log::debug!("Stripped byte order mark from {}", path.display());
    }
    Ok(stripped.to_string())
}

/// Write `text` to `output` when given, otherwise to `out`
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_output(text: &str, output: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.usfm");
        fs::write(&path, "\u{FEFF}\\id MAT\n").unwrap();
        assert_eq!(read_usfm(&path).unwrap(), "\\id MAT\n");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_usfm(Path::new("does/not/exist.usfm")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.usfm"));
    }

    #[test]
    fn output_goes_to_file_or_writer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.usfm");
        let mut buffer = Vec::new();
        write_output("text", Some(&path), &mut buffer).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "text");

        write_output("text", None, &mut buffer).unwrap();
        assert_eq!(buffer, b"text");
    }
}
