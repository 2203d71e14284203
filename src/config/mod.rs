//! Configuration management for amulets
//!
//! Settings are layered with figment: embedded defaults, user and working
//! directory TOML files, an optional `--config` file, `AMULETS_` environment
//! variables, and finally CLI flags. [`AmuletsConfig::settings`] extracts the
//! typed, validated [`Settings`].

pub mod core;
pub mod settings;

pub use self::core::AmuletsConfig;
pub use settings::{AmuletSettings, OutputFormat, OutputSettings, SearchSettings, Settings};
