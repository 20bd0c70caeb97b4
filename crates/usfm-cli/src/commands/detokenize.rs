//! Detokenize command implementation

use crate::cli::GlobalArgs;
use crate::input::{read_usfm, write_output};
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use usfm_core::tokenizer::{RtlReferenceOrder, UsfmTokenizer};

/// Arguments for the detokenize command
#[derive(Debug, Args)]
pub struct DetokenizeArgs {
    /// USFM file to normalize
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Direction marks for verse bridges in right-to-left text
    /// (`book-chapter-verse` or `book-verse-chapter`)
    #[arg(long, value_name = "ORDER", default_value_t = RtlReferenceOrder::NotSet)]
    pub rtl_reference_order: RtlReferenceOrder,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl DetokenizeArgs {
    /// Execute the detokenize command
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        let stylesheet = global.load_stylesheet()?;
        let usfm = read_usfm(&self.input)?;
        let tokenizer =
            UsfmTokenizer::new(&stylesheet).with_rtl_reference_order(self.rtl_reference_order);
        let tokens = tokenizer.tokenize(&usfm, false);
        let normalized = tokenizer.detokenize(&tokens, false);
        write_output(&normalized, self.output.as_deref(), out)
    }
}
