//! USFM CLI library
//!
//! Argument definitions and command implementations behind the `usfm`
//! binary. Commands write to any [`std::io::Write`] so they can be driven
//! from tests without spawning a process.

pub mod cli;
pub mod commands;
pub mod config;
pub mod input;

pub use cli::{Cli, GlobalArgs};
pub use commands::Commands;
