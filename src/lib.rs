//! # amulets - exhaustive search for SHA-256 amulets
//!
//! A *geode* is an ordered sequence of word variants: each input word may
//! appear at most once, rendered with one of six punctuation marks, three case
//! transforms and zero to four leading spaces. A geode is an *amulet* when the
//! SHA-256 of its text holds a long run of the digit `8`.
//!
//! ## Features
//!
//! - **Bijective indexing**: every geode has exactly one index in `0..N`, and
//!   any index can be turned back into its geode without enumerating the rest
//! - **Exact partitioning**: the index space is tiled into contiguous ranges,
//!   one per worker, with no gaps and no overlap
//! - **Isolated workers**: each worker is an OS thread that owns its data and
//!   reports only through crossbeam channels
//! - **Layered configuration**: TOML files, environment variables and CLI flags
//!
//! ## Quick Start
//!
//! ```bash
//! # How big is the space?
//! amulets count ok go
//!
//! # Search it on every core
//! amulets search ok go cool
//!
//! # Look at a single geode
//! amulets inspect 271 ok go
//! ```
//!
//! ## Library Usage
//!
//! ```rust
//! use amulets::amulet::{Amulet, AmuletTest};
//! use amulets::enumerate::SpaceEnumerator;
//! use amulets::parallel::{Coordinator, ExecutionStrategy};
//!
//! let space = SpaceEnumerator::new(&["ok", "go"])?;
//! let test = AmuletTest::new('8', 4, 64)?;
//! let coordinator = Coordinator::new(space, test, ExecutionStrategy::explicit(2));
//!
//! let mut found: Vec<Amulet> = Vec::new();
//! let summary = coordinator.run(&mut found, None)?;
//! assert!(summary.is_complete());
//! for amulet in &found {
//!     println!("{} {:?}", amulet.quality(), amulet.text());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod amulet;
pub mod cli;
pub mod config;
pub mod enumerate;
pub mod parallel;

pub use cli::{Cli, Output};
pub use config::AmuletsConfig;

/// Result type alias for amulets operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
