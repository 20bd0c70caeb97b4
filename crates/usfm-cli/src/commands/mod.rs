//! CLI command implementations

use crate::cli::GlobalArgs;
use anyhow::Result;
use clap::Subcommand;
use std::io::Write;

pub mod check;
pub mod detokenize;
pub mod markers;
pub mod tokenize;
pub mod update;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the tokens of a USFM file
    Tokenize(tokenize::TokenizeArgs),

    /// Normalize a USFM file through tokenize and detokenize
    Detokenize(detokenize::DetokenizeArgs),

    /// Rewrite a USFM file with replacement rows
    Update(update::UpdateArgs),

    /// Report chapters and verses that disagree with a versification
    Check(check::CheckArgs),

    /// List the markers of the active stylesheet
    Markers(markers::MarkersArgs),
}

impl Commands {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns the command's failure.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        match self {
            Self::Tokenize(args) => args.execute(global, out),
            Self::Detokenize(args) => args.execute(global, out),
            Self::Update(args) => args.execute(global, out),
            Self::Check(args) => args.execute(global, out),
            Self::Markers(args) => args.execute(global, out),
        }
    }
}
