use crate::config::SearchSettings;

/// How many workers a search runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// A single worker scans the whole space
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => (*workers).max(1),
        }
    }

    /// Pick the strategy for a space of `space_size` indices.
    ///
    /// An explicit `search.workers` is honoured as-is. Otherwise the worker
    /// count comes from the available cores, and spaces below
    /// `search.min_indices_for_parallel` run sequentially.
    pub fn from_settings(settings: &SearchSettings, space_size: u128) -> Self {
        if settings.workers > 0 {
            return Self::explicit(settings.workers);
        }
        let optimal_workers = Self::calculate_optimal_workers(settings.thread_percentage);
        Self::auto(space_size, settings.min_indices_for_parallel as u128, optimal_workers)
    }

    pub fn explicit(workers: usize) -> Self {
        if workers <= 1 {
            ExecutionStrategy::Sequential
        } else {
            ExecutionStrategy::Parallel { workers }
        }
    }

    /// Threshold decision between sequential and parallel execution
    ///
    /// # Example
    /// ```rust
    /// use amulets::parallel::ExecutionStrategy;
    ///
    /// let strategy = ExecutionStrategy::auto(90, 4096, 8);
    /// assert!(matches!(strategy, ExecutionStrategy::Sequential));
    ///
    /// let strategy = ExecutionStrategy::auto(16380, 4096, 8);
    /// assert_eq!(strategy.workers(), 8);
    /// ```
    pub fn auto(space_size: u128, min_indices_for_parallel: u128, optimal_workers: usize) -> Self {
        if space_size >= min_indices_for_parallel && optimal_workers > 1 {
            ExecutionStrategy::Parallel {
                workers: optimal_workers,
            }
        } else {
            ExecutionStrategy::Sequential
        }
    }

    /// Calculate optimal workers from the available cores
    ///
    /// # Algorithm
    /// ```text
    /// 1. Detect available CPU cores: num_cpus::get()
    /// 2. Apply percentage: cores * thread_percentage / 100
    /// 3. Ensure minimum: max(1, result)
    /// ```
    pub fn calculate_optimal_workers(thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();
        std::cmp::max(1, (available_cores * thread_percentage as usize) / 100)
    }
}
