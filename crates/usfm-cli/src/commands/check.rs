//! Check command implementation

use crate::cli::GlobalArgs;
use crate::input::read_usfm;
use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use usfm_core::{parse_usfm, UsfmVersificationErrorDetector, VersificationTable};

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// USFM files to check
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Versification table (`.vrs`)
    #[arg(long, value_name = "FILE")]
    pub versification: PathBuf,
}

impl CheckArgs {
    /// Execute the check command
    ///
    /// Prints one line per problem and fails when any file has problems.
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable inputs or when errors were found.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        let stylesheet = global.load_stylesheet()?;
        let name = self
            .versification
            .file_stem()
            .map_or_else(|| "custom".to_string(), |s| s.to_string_lossy().into_owned());
        let text = fs::read_to_string(&self.versification)
            .with_context(|| format!("failed to read {}", self.versification.display()))?;
        let versification = VersificationTable::parse(name, &text)
            .with_context(|| format!("invalid versification {}", self.versification.display()))?;

        let mut total = 0;
        for input in &self.inputs {
            let usfm = read_usfm(input)?;
            let mut detector = UsfmVersificationErrorDetector::new(&versification);
            parse_usfm(&usfm, &stylesheet, &mut detector);
            for error in detector.errors() {
                writeln!(out, "{}: {error}", input.display())?;
            }
            total += detector.errors().len();
            log::info!("{}: {} problem(s)", input.display(), detector.errors().len());
        }

        if total > 0 {
            bail!("{total} versification error(s) found");
        }
        if !global.quiet {
            writeln!(out, "No versification errors")?;
        }
        Ok(())
    }
}
