use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::AmuletsConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show {
        /// Only show one section (search, amulet or output)
        section: Option<String>,
    },
    /// Validate the merged configuration
    Validate,
}

pub fn execute(args: ConfigArgs, config_path: Option<&str>) -> Result<()> {
    let config = AmuletsConfig::load(config_path, None::<&()>)?;
    config.settings()?;

    match args.command {
        ConfigCommands::Show { section } => print!("{}", render(&config, section.as_deref())?),
        ConfigCommands::Validate => println!("Configuration is valid"),
    }
    Ok(())
}

fn render(config: &AmuletsConfig, section: Option<&str>) -> Result<String> {
    let value = match section {
        Some(name) => config
            .get_section(name)
            .with_context(|| format!("Unknown configuration section: {name}"))?,
        None => config.get_full_config()?,
    };
    toml::to_string_pretty(&value).context("Failed to render configuration")
}
