//! Partitioned parallel search over the geode index space
//!
//! # Architecture Responsibilities
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Partitioning**: Splits `[0, N)` into contiguous ranges that tile it exactly
//! - **Worker Lifecycle**: One OS thread per partition, `Idle → Running → Finished | Failed`
//! - **Coordination**: Multiplexes every worker's result and signal channels with `crossbeam::channel::Select`
//!
//! ## What This Module Does NOT Do:
//! - **Formatting**: Results go to a [`Reporter`]; printing is the caller's business
//! - **Shared State**: Workers own their data and only ever talk through channels
//! - **Force Termination**: Cancellation stops the coordinator's wait; workers notice the
//!   closed channels at their next send and exit on their own
//!
//! ```text
//! ┌─────────────┐  partitions  ┌──────────┐  Amulet        ┌─────────────┐
//! │ Coordinator │─────────────▶│ Worker 0 │───────────────▶│             │
//! │             │              ├──────────┤  WorkerSignal  │  Select     │──▶ Reporter
//! │   plan()    │─────────────▶│ Worker 1 │───────────────▶│  (fan-in)   │
//! └─────────────┘              └──────────┘                └─────────────┘
//!                                                  cancel ──────▲
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use amulets::amulet::{Amulet, AmuletTest};
//! use amulets::enumerate::SpaceEnumerator;
//! use amulets::parallel::{Coordinator, ExecutionStrategy};
//!
//! let space = SpaceEnumerator::new(&["ok", "go"]).unwrap();
//! let coordinator = Coordinator::new(space, AmuletTest::default(), ExecutionStrategy::explicit(2));
//!
//! let mut found: Vec<Amulet> = Vec::new();
//! let summary = coordinator.run(&mut found, None).unwrap();
//! assert_eq!(summary.scanned, 16380);
//! ```

pub mod coordinator;
pub mod core;
pub mod partition;
pub mod worker;

// Re-export main types for easier access
pub use self::core::ExecutionStrategy;
pub use coordinator::{CancelHandle, Coordinator, Reporter, SearchSummary, WorkerFailure, cancellation};
pub use partition::{Partition, plan};
pub use worker::{Worker, WorkerSignal, WorkerState};
