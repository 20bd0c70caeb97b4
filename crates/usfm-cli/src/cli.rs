//! Top-level arguments

use crate::commands::Commands;
use anyhow::{Context, Result};
use clap::{Args, Parser};
use std::io::Write;
use std::path::PathBuf;
use usfm_core::UsfmStylesheet;

/// Tokenize, rewrite and check USFM scripture files
#[derive(Debug, Parser)]
#[command(name = "usfm", version, about, long_about = None)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Run the selected command, writing results to `out`
    ///
    /// # Errors
    ///
    /// Returns any input, stylesheet or processing failure with the file
    /// it concerns as context.
    pub fn run(&self, out: &mut dyn Write) -> Result<()> {
        self.command.execute(&self.global, out)
    }
}

/// Options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Base stylesheet (defaults to the embedded usfm.sty)
    #[arg(long, global = true, value_name = "FILE", env = "USFM_STYLESHEET")]
    pub stylesheet: Option<PathBuf>,

    /// Stylesheet merged over the base, e.g. a project custom.sty
    #[arg(long, global = true, value_name = "FILE")]
    pub override_stylesheet: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Log filter for the verbosity flags
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Initialize `env_logger`; `RUST_LOG` takes precedence over the flags
    pub fn init_logging(&self) {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level()),
        )
        .format_timestamp(None)
        .try_init();
    }

    /// Load the stylesheet selected by the flags
    ///
    /// # Errors
    ///
    /// Returns an error if a stylesheet file cannot be read or parsed.
    pub fn load_stylesheet(&self) -> Result<UsfmStylesheet> {
        let stylesheet = match &self.stylesheet {
            Some(path) => UsfmStylesheet::from_files(path, None)
                .with_context(|| format!("failed to load stylesheet {}", path.display()))?,
            None => UsfmStylesheet::default(),
        };
        let Some(path) = &self.override_stylesheet else {
            return Ok(stylesheet);
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stylesheet {}", path.display()))?;
        stylesheet
            .with_override(&text)
            .with_context(|| format!("failed to load stylesheet {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_log_levels() {
        let mut args = GlobalArgs::default();
        assert_eq!(args.log_level(), "warn");
        args.verbose = 2;
        assert_eq!(args.log_level(), "debug");
        args.verbose = 7;
        assert_eq!(args.log_level(), "trace");
        args.quiet = true;
        assert_eq!(args.log_level(), "error");
    }

    #[test]
    fn parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["usfm", "markers", "-vv", "--override-stylesheet", "custom.sty"])
            .unwrap();
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(
            cli.global.override_stylesheet,
            Some(PathBuf::from("custom.sty"))
        );
        assert!(matches!(cli.command, Commands::Markers(_)));
    }

    #[test]
    fn default_stylesheet_needs_no_files() {
        let stylesheet = GlobalArgs::default().load_stylesheet().unwrap();
        assert!(stylesheet.contains("p"));
    }
}
