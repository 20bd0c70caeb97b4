//! Update command implementation

use crate::cli::GlobalArgs;
use crate::config::{load_options, load_rows};
use crate::input::{read_usfm, write_output};
use anyhow::{Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use usfm_core::update::{
    StripStyleMarkersHandler, UpdateBlockHandlerRegistry, UpdateUsfmMarkerBehavior,
    UpdateUsfmOptions, UpdateUsfmParserHandler, UpdateUsfmTextBehavior,
};

/// Arguments for the update command
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// USFM file to rewrite
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Replacement rows (`.json` or tab separated)
    #[arg(short, long, value_name = "ROWS")]
    pub rows: PathBuf,

    /// TOML file with rewrite options
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How existing and new text are reconciled
    #[arg(long, value_name = "BEHAVIOR")]
    pub text_behavior: Option<UpdateUsfmTextBehavior>,

    /// Verse paragraph markers inside replaced text
    #[arg(long, value_name = "BEHAVIOR")]
    pub paragraph_behavior: Option<UpdateUsfmMarkerBehavior>,

    /// Notes and figures inside replaced text
    #[arg(long, value_name = "BEHAVIOR")]
    pub embed_behavior: Option<UpdateUsfmMarkerBehavior>,

    /// Character styles inside replaced text
    #[arg(long, value_name = "BEHAVIOR")]
    pub style_behavior: Option<UpdateUsfmMarkerBehavior>,

    /// Replace the text after the book code on `\id`
    #[arg(long, value_name = "TEXT")]
    pub id_text: Option<String>,

    /// Add a `\rem` line after the identification lines
    #[arg(long = "remark", value_name = "TEXT")]
    pub remarks: Vec<String>,

    /// Remove character style markers from every unit
    #[arg(long)]
    pub strip_styles: bool,

    /// Keep going when a block handler fails
    #[arg(long)]
    pub ignore_handler_errors: bool,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl UpdateArgs {
    /// Rewrite options from the config file with flags applied on top
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn options(&self) -> Result<UpdateUsfmOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => UpdateUsfmOptions::default(),
        };
        if let Some(behavior) = self.text_behavior {
            options.text_behavior = behavior;
        }
        if let Some(behavior) = self.paragraph_behavior {
            options.paragraph_behavior = behavior;
        }
        if let Some(behavior) = self.embed_behavior {
            options.embed_behavior = behavior;
        }
        if let Some(behavior) = self.style_behavior {
            options.style_behavior = behavior;
        }
        if let Some(id_text) = &self.id_text {
            options.id_text = Some(id_text.clone());
        }
        options.remarks.extend(self.remarks.iter().cloned());
        Ok(options)
    }

    /// Execute the update command
    ///
    /// # Errors
    ///
    /// Returns an error for unreadable inputs or an escalated handler failure.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        let stylesheet = global.load_stylesheet()?;
        let usfm = read_usfm(&self.input)?;
        let rows = load_rows(&self.rows)?;
        let options = self.options()?;
        log::info!(
            "Updating {} with {} rows ({})",
            self.input.display(),
            rows.len(),
            options.text_behavior
        );

        let mut handlers = UpdateBlockHandlerRegistry::new();
        if self.strip_styles {
            handlers.register(Box::new(StripStyleMarkersHandler))?;
        }
        let ignore = self.ignore_handler_errors;
        let updated = UpdateUsfmParserHandler::new(rows, options)
            .with_handlers(handlers)
            .with_error_handler(move |_| ignore)
            .update(&usfm, &stylesheet)
            .with_context(|| format!("failed to update {}", self.input.display()))?;
        write_output(&updated, self.output.as_deref(), out)
    }
}
