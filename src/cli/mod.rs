//! Command-line interface for amulets
//!
//! Argument parsing with clap, styled console output, and the glue between the
//! library's search engine and the terminal.

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use output::Output;
