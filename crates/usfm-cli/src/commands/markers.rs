//! Markers command implementation

use crate::cli::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::io::Write;

/// Arguments for the markers command
#[derive(Debug, Args)]
pub struct MarkersArgs {
    /// Only list markers of this style type (e.g. `paragraph`, `character`)
    #[arg(long, value_name = "TYPE")]
    pub style_type: Option<String>,
}

impl MarkersArgs {
    /// Execute the markers command
    ///
    /// # Errors
    ///
    /// Returns an error if the stylesheet cannot be loaded.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        let stylesheet = global.load_stylesheet()?;
        for tag in stylesheet.tags() {
            let style_type = tag.style_type.to_string();
            if self
                .style_type
                .as_deref()
                .is_some_and(|wanted| !style_type.eq_ignore_ascii_case(wanted))
            {
                continue;
            }
            let end = tag.end_marker.as_deref().unwrap_or("");
            writeln!(out, "{}\t{}\t{:?}\t{}", tag.marker, style_type, tag.text_type, end)?;
        }
        Ok(())
    }
}
