use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Typed view over the merged configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub search: SearchSettings,
    pub amulet: AmuletSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Worker count, 0 = auto
    pub workers: usize,
    /// Percentage of CPU cores used when `workers` is 0
    pub thread_percentage: u8,
    pub min_indices_for_parallel: u64,
    pub result_buffer: usize,
    pub progress_every: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmuletSettings {
    pub marker: String,
    pub min_run: usize,
    pub max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// One JSON object per line
    Json,
}

impl AmuletSettings {
    /// The marker as a single character
    pub fn marker_char(&self) -> Result<char> {
        let mut chars = self.marker.chars();
        match (chars.next(), chars.next()) {
            (Some(marker), None) => Ok(marker),
            _ => bail!("amulet.marker must be a single character, got {:?}", self.marker),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.search.thread_percentage == 0 || self.search.thread_percentage > 100 {
            bail!(
                "search.thread_percentage must be between 1 and 100, got {}",
                self.search.thread_percentage
            );
        }
        if self.search.result_buffer == 0 {
            bail!("search.result_buffer cannot be 0");
        }
        if self.search.progress_every == 0 {
            bail!("search.progress_every cannot be 0");
        }
        if self.amulet.min_run == 0 {
            bail!("amulet.min_run cannot be 0");
        }
        let marker = self.amulet.marker_char()?;
        if !marker.is_ascii_hexdigit() || marker.is_ascii_uppercase() {
            bail!("amulet.marker must be a lowercase hex digit, got {marker:?}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AmuletsConfig;

    fn defaults() -> Settings {
        AmuletsConfig::defaults().unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = defaults();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.search.workers, 0);
        assert_eq!(settings.search.result_buffer, 64);
        assert_eq!(settings.amulet.min_run, 6);
        assert!(settings.output.progress);
    }

    #[test]
    fn test_validation() {
        let mut settings = defaults();
        settings.search.thread_percentage = 0;
        assert!(settings.validate().is_err());

        let mut settings = defaults();
        settings.search.result_buffer = 0;
        assert!(settings.validate().is_err());

        let mut settings = defaults();
        settings.amulet.marker = "88".to_string();
        assert!(settings.validate().is_err());

        let mut settings = defaults();
        settings.amulet.marker = "x".to_string();
        assert!(settings.validate().is_err());

        let mut settings = defaults();
        settings.amulet.min_run = 0;
        assert!(settings.validate().is_err());
    }
}
