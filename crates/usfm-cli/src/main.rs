//! `usfm` command-line entry point

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use usfm_cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.global.init_logging();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.run(&mut out).and_then(|()| out.flush().map_err(Into::into)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
