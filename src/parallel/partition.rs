use anyhow::{Result, bail};
use std::ops::Range;

/// Contiguous half-open slice `[start, end)` of the index space owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub worker: usize,
    pub start: u128,
    pub end: u128,
}

impl Partition {
    pub fn len(&self) -> u128 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: u128) -> bool {
        self.start <= index && index < self.end
    }

    pub fn range(&self) -> Range<u128> {
        self.start..self.end
    }
}

/// Split `[0, total)` into `workers` contiguous partitions.
///
/// Every partition gets `total / workers` indices and the last one also takes
/// the remainder, so consecutive partitions share a boundary
/// (`end_k == start_{k+1}`) and the lengths sum to `total` exactly.
pub fn plan(total: u128, workers: usize) -> Result<Vec<Partition>> {
    if workers == 0 {
        bail!("Cannot partition the search space across zero workers");
    }

    let chunk = total / workers as u128;
    let partitions = (0..workers)
        .map(|worker| {
            let start = chunk * worker as u128;
            let end = if worker + 1 == workers { total } else { start + chunk };
            Partition { worker, start, end }
        })
        .collect();
    Ok(partitions)
}
