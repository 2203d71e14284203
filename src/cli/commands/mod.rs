use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::enumerate::SpaceEnumerator;

pub mod config;
pub mod count;
pub mod inspect;
pub mod search;

#[derive(Parser)]
#[command(
    name = "amulets",
    version = env!("CARGO_PKG_VERSION"),
    about = "Search word geodes for SHA-256 digests hiding a long run of eights",
    long_about = "Enumerates every ordered combination of word variants (punctuation, case and \
                  leading spaces), hashes each one, and reports the amulets whose digest holds \
                  a long run of the marker digit. The search is split across parallel workers."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every geode for amulets
    Search(search::SearchArgs),
    /// Show the size of the index space
    Count(count::CountArgs),
    /// Show the geode behind one index and test it
    Inspect(inspect::InspectArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

/// Word list input shared by every command that builds a search space
#[derive(Args, Debug, Default)]
pub struct WordArgs {
    /// Words to combine; each argument may hold several whitespace-separated words
    #[arg(value_name = "WORDS")]
    pub words: Vec<String>,

    /// Read more whitespace-separated words from a file ("-" for stdin)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

impl WordArgs {
    pub fn load(&self) -> Result<Vec<String>> {
        let mut text = self.words.join(" ");
        if let Some(path) = &self.file {
            let contents = if path.as_os_str() == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read words from stdin")?;
                buffer
            } else {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read words file: {}", path.display()))?
            };
            text.push(' ');
            text.push_str(&contents);
        }
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    pub fn space(&self) -> Result<SpaceEnumerator> {
        let words = self.load()?;
        tracing::debug!("Building search space over {} words", words.len());
        SpaceEnumerator::new(&words)
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let config_path = self.config.as_deref();

        match self.command {
            Commands::Search(args) => search::execute(args, config_path, self.verbose, self.quiet).await,
            Commands::Count(args) => count::execute(args, config_path),
            Commands::Inspect(args) => inspect::execute(args, config_path),
            Commands::Config(args) => config::execute(args, config_path),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info"),
        2 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // stderr keeps JSON results on stdout clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_words_from_args_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "up\n  down\tleft").unwrap();

        let args = WordArgs {
            words: vec!["ok go".to_string(), "ok".to_string()],
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(args.load().unwrap(), vec!["ok", "go", "ok", "up", "down", "left"]);
    }

    #[test]
    fn test_empty_word_list_is_rejected() {
        let args = WordArgs {
            words: vec!["   ".to_string()],
            file: None,
        };
        assert!(args.space().is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["amulets", "-vv", "search", "ok", "go", "--workers", "3"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Search(args) => {
                assert_eq!(args.words.words, vec!["ok", "go"]);
                assert_eq!(args.workers, Some(3));
            }
            _ => panic!("expected search"),
        }
    }
}
