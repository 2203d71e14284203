use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use std::path::Path;

use super::settings::Settings;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub struct AmuletsConfig {
    figment: Figment,
}

impl AmuletsConfig {
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG)) // 1. Defaults (lowest)
            .merge(Toml::file(Self::user_config_path())) // 2. User config
            .merge(Toml::file("amulets.toml")); // 3. Working directory config

        if let Some(path) = custom_config {
            if !Path::new(path).exists() {
                bail!("Config file not found: {path}");
            }
            figment = figment.merge(Toml::file(path)); // 4. Custom config
        }

        // 5. Environment variables, AMULETS_SEARCH__WORKERS -> search.workers
        figment = figment.merge(Env::prefixed("AMULETS_").split("__"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides)); // 6. CLI (highest)
        }

        Ok(AmuletsConfig { figment })
    }

    /// The built-in defaults alone, without any file, env or CLI layer
    pub fn defaults() -> Result<Settings> {
        let settings: Settings = Figment::from(Toml::string(DEFAULT_CONFIG))
            .extract()
            .context("Failed to parse built-in configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Extract and validate the typed settings
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .context("Failed to parse configuration")?;
        settings.validate()?;
        tracing::trace!("CONFIG LOAD: Final settings = {:?}", settings);
        Ok(settings)
    }

    /// Get a nested object/section as JSON
    pub fn get_section(&self, path: &str) -> Result<serde_json::Value> {
        let value = self.figment.extract_inner(path)?;
        Ok(value)
    }

    /// Get the full merged configuration as a structured value
    pub fn get_full_config(&self) -> Result<serde_json::Value> {
        let value = self.figment.extract()?;
        Ok(value)
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/amulets/config.toml", home),
            Err(_) => "~/.config/amulets/config.toml".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use figment::Jail;

    #[derive(Serialize)]
    struct SearchOverrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        workers: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        result_buffer: Option<usize>,
    }

    #[derive(Serialize)]
    struct Overrides {
        search: SearchOverrides,
    }

    // Every test that reads AMULETS_ variables or the working directory runs
    // in a Jail, which serializes them and restores the environment.

    #[test]
    fn test_config_loads_defaults() {
        Jail::expect_with(|jail| {
            // No user config either
            let home = jail.directory().display().to_string();
            jail.set_env("HOME", home);
            let config = AmuletsConfig::load(None, None::<&()>).expect("Should load default config");
            let settings = config.settings().unwrap();

            assert_eq!(settings.amulet.marker, "8");
            assert_eq!(settings.amulet.min_run, 6);
            assert_eq!(settings.amulet.max_bytes, 64);
            assert_eq!(settings.output.format, OutputFormat::Text);
            assert_eq!(settings, AmuletsConfig::defaults().unwrap());

            let search = config.get_section("search").unwrap();
            assert!(search.get("thread_percentage").is_some());
            assert!(config.get_full_config().unwrap().get("amulet").is_some());
            Ok(())
        });
    }

    #[test]
    fn test_custom_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[amulet]\nmin_run = 4\n\n[output]\nformat = \"json\"\n")?;

            let settings = AmuletsConfig::load(Some("custom.toml"), None::<&()>)
                .unwrap()
                .settings()
                .unwrap();
            assert_eq!(settings.amulet.min_run, 4);
            assert_eq!(settings.output.format, OutputFormat::Json);
            // Untouched keys keep their defaults
            assert_eq!(settings.amulet.max_bytes, 64);
            Ok(())
        });
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        Jail::expect_with(|_| {
            assert!(AmuletsConfig::load(Some("non_existent_amulets.toml"), None::<&()>).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.set_env("AMULETS_SEARCH__PROGRESS_EVERY", "1234");
            let settings = AmuletsConfig::load(None, None::<&()>).unwrap().settings().unwrap();
            assert_eq!(settings.search.progress_every, 1234);
            Ok(())
        });
    }

    #[test]
    fn test_layer_precedence() {
        Jail::expect_with(|jail| {
            jail.create_file("amulets.toml", "[search]\nworkers = 2\nresult_buffer = 8\n")?;
            jail.set_env("AMULETS_SEARCH__WORKERS", "5");

            let settings = AmuletsConfig::load(None, None::<&()>).unwrap().settings().unwrap();
            assert_eq!(settings.search.workers, 5);
            assert_eq!(settings.search.result_buffer, 8);

            let overrides = Overrides {
                search: SearchOverrides {
                    workers: Some(3),
                    result_buffer: None,
                },
            };
            let settings = AmuletsConfig::load(None, Some(overrides)).unwrap().settings().unwrap();
            assert_eq!(settings.search.workers, 3);
            assert_eq!(settings.search.result_buffer, 8);
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides_skip_unset_fields() {
        Jail::expect_with(|_| {
            let overrides = Overrides {
                search: SearchOverrides {
                    workers: Some(3),
                    result_buffer: None,
                },
            };
            let settings = AmuletsConfig::load(None, Some(overrides)).unwrap().settings().unwrap();
            assert_eq!(settings.search.workers, 3);
            assert_eq!(settings.search.result_buffer, 64);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[search]\nthread_percentage = 150\n")?;
            assert!(AmuletsConfig::load(Some("bad.toml"), None::<&()>).unwrap().settings().is_err());
            Ok(())
        });
    }
}
