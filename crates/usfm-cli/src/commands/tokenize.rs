//! Tokenize command implementation

use crate::cli::GlobalArgs;
use crate::input::read_usfm;
use anyhow::Result;
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use usfm_core::{UsfmToken, UsfmTokenType, UsfmTokenizer};

/// Arguments for the tokenize command
#[derive(Debug, Args)]
pub struct TokenizeArgs {
    /// USFM file to tokenize
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Print tokens as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Keep whitespace exactly as written
    #[arg(long)]
    pub preserve_whitespace: bool,
}

impl TokenizeArgs {
    /// Execute the tokenize command
    ///
    /// # Errors
    ///
    /// Returns an error if the file or stylesheet cannot be loaded.
    pub fn execute(&self, global: &GlobalArgs, out: &mut dyn Write) -> Result<()> {
        let stylesheet = global.load_stylesheet()?;
        let usfm = read_usfm(&self.input)?;
        let tokens = UsfmTokenizer::new(&stylesheet).tokenize(&usfm, self.preserve_whitespace);
        log::info!("{} tokens in {}", tokens.len(), self.input.display());

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &tokens)?;
            writeln!(out)?;
        } else {
            for token in &tokens {
                writeln!(out, "{}", describe(token))?;
            }
        }
        Ok(())
    }
}

/// One line per token: position, type and content
fn describe(token: &UsfmToken) -> String {
    let content = match token.token_type {
        UsfmTokenType::Text => format!("{:?}", token.text_str()),
        _ => token.to_usfm().trim_end().to_string(),
    };
    format!(
        "{}:{}\t{}\t{}",
        token.line, token.column, token.token_type, content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_tokens_are_quoted() {
        let token = UsfmToken::text("In the beginning ");
        assert!(describe(&token).ends_with("\t\"In the beginning \""));
    }

    #[test]
    fn marker_tokens_show_usfm() {
        let token = UsfmToken::new(UsfmTokenType::Verse, "v", None, None, Some("1".to_string()));
        assert!(describe(&token).ends_with("\t\\v 1"));
    }
}
