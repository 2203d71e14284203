use anyhow::Result;
use crossbeam::channel::{Receiver, Select, Sender, bounded, unbounded};
use std::ops::Range;
use std::time::{Duration, Instant};

use super::core::ExecutionStrategy;
use super::partition::{self, Partition};
use super::worker::{Worker, WorkerSignal};
use crate::amulet::{Amulet, AmuletTest};
use crate::config::Settings;
use crate::enumerate::SpaceEnumerator;

/// Receives everything the coordinator surfaces while a search runs
pub trait Reporter {
    fn amulet(&mut self, amulet: &Amulet);

    /// `scanned` indices out of `total` have been checked so far
    fn progress(&mut self, _scanned: u128, _total: u128) {}

    fn worker_finished(&mut self, _worker: usize, _scanned: u128) {}

    fn worker_failed(&mut self, _failure: &WorkerFailure) {}
}

impl Reporter for Vec<Amulet> {
    fn amulet(&mut self, amulet: &Amulet) {
        self.push(amulet.clone());
    }
}

/// A worker that stopped before covering its partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFailure {
    pub worker: usize,
    pub reason: String,
    /// Indices of the partition that were never checked
    pub unscanned: Range<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    pub space_size: u128,
    pub workers: usize,
    pub scanned: u128,
    pub amulets: usize,
    pub elapsed: Duration,
    pub failures: Vec<WorkerFailure>,
    pub cancelled: bool,
}

impl SearchSummary {
    /// Some part of the space was lost to a failed worker
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.cancelled && !self.is_degraded() && self.scanned == self.space_size
    }
}

/// Sending half of a cancellation channel
#[derive(Debug, Clone)]
pub struct CancelHandle(Sender<()>);

impl CancelHandle {
    pub fn cancel(&self) {
        // A full buffer already holds a pending cancellation
        let _ = self.0.try_send(());
    }
}

pub fn cancellation() -> (CancelHandle, Receiver<()>) {
    let (tx, rx) = bounded(1);
    (CancelHandle(tx), rx)
}

/// Coordinator-side view of one running worker
struct WorkerLink {
    partition: Partition,
    results: Receiver<Amulet>,
    signals: Receiver<WorkerSignal>,
    scanned: u128,
    results_open: bool,
    done: bool,
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Results(usize),
    Signals(usize),
    Cancel,
}

enum Event {
    Found(Amulet),
    ResultsClosed(usize),
    Signal(usize, WorkerSignal),
    SignalsClosed(usize),
    Cancelled,
    CancelSourceGone,
}

/// Fans a search out to isolated workers and multiplexes what they send back
pub struct Coordinator {
    space: SpaceEnumerator,
    test: AmuletTest,
    strategy: ExecutionStrategy,
    result_buffer: usize,
    progress_every: u64,
}

impl Coordinator {
    pub fn new(space: SpaceEnumerator, test: AmuletTest, strategy: ExecutionStrategy) -> Self {
        Self {
            space,
            test,
            strategy,
            result_buffer: 64,
            progress_every: 65536,
        }
    }

    pub fn from_settings(space: SpaceEnumerator, settings: &Settings) -> Result<Self> {
        let test = AmuletTest::from_settings(&settings.amulet)?;
        let strategy = ExecutionStrategy::from_settings(&settings.search, space.count());
        Ok(Self::new(space, test, strategy)
            .with_result_buffer(settings.search.result_buffer)
            .with_progress_every(settings.search.progress_every))
    }

    pub fn with_result_buffer(mut self, result_buffer: usize) -> Self {
        self.result_buffer = result_buffer.max(1);
        self
    }

    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every.max(1);
        self
    }

    pub fn space(&self) -> &SpaceEnumerator {
        &self.space
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Partitions for this search; never more workers than indices
    pub fn plan(&self) -> Result<Vec<Partition>> {
        let total = self.space.count();
        let workers = (self.strategy.workers() as u128).min(total.max(1)) as usize;
        partition::plan(total, workers)
    }

    /// Search the whole space. Returns when every worker is done or as soon as
    /// `cancel` receives a message.
    pub fn run<R: Reporter>(&self, reporter: &mut R, cancel: Option<&Receiver<()>>) -> Result<SearchSummary> {
        let partitions = self.plan()?;
        tracing::info!(
            "Searching {} geodes over {} words with {} workers",
            self.space.count(),
            self.space.words().len(),
            partitions.len()
        );

        let workers = partitions
            .into_iter()
            .map(|p| Worker::new(p.worker, self.space.clone(), p, self.test, self.progress_every))
            .collect();
        self.supervise(workers, reporter, cancel)
    }

    /// Spawn the given workers and wait on all of them
    pub fn supervise<R: Reporter>(
        &self,
        workers: Vec<Worker>,
        reporter: &mut R,
        cancel: Option<&Receiver<()>>,
    ) -> Result<SearchSummary> {
        let start_time = Instant::now();
        let worker_count = workers.len();

        let mut links = Vec::with_capacity(worker_count);
        for worker in workers {
            let (result_tx, result_rx) = bounded(self.result_buffer);
            let (signal_tx, signal_rx) = unbounded();
            let partition = worker.partition();
            // Detached: cancellation must not wait on workers
            worker.spawn(result_tx, signal_tx)?;
            links.push(WorkerLink {
                partition,
                results: result_rx,
                signals: signal_rx,
                scanned: 0,
                results_open: true,
                done: false,
            });
        }

        let mut amulets = 0usize;
        let mut failures = Vec::new();
        let mut cancelled = false;
        let mut cancel = cancel;

        while links.iter().any(|link| !link.done) {
            match Self::next_event(&links, cancel) {
                Event::Found(amulet) => {
                    amulets += 1;
                    reporter.amulet(&amulet);
                }
                Event::ResultsClosed(i) => links[i].results_open = false,
                Event::Signal(i, WorkerSignal::Progress { scanned, .. }) => {
                    links[i].scanned = scanned;
                    reporter.progress(Self::scanned(&links), self.space.count());
                }
                Event::Signal(i, WorkerSignal::Finished { worker, scanned }) => {
                    links[i].scanned = scanned;
                    amulets += Self::drain(&mut links[i], reporter);
                    tracing::debug!("Worker {worker} finished ({scanned} indices)");
                    reporter.worker_finished(worker, scanned);
                    reporter.progress(Self::scanned(&links), self.space.count());
                }
                Event::Signal(i, WorkerSignal::Failed { scanned, reason, .. }) => {
                    links[i].scanned = scanned;
                    amulets += Self::drain(&mut links[i], reporter);
                    failures.push(Self::failure(&links[i], reason, reporter));
                }
                Event::SignalsClosed(i) => {
                    amulets += Self::drain(&mut links[i], reporter);
                    let reason = "worker exited without reporting completion".to_string();
                    failures.push(Self::failure(&links[i], reason, reporter));
                }
                Event::Cancelled => {
                    tracing::info!("Search cancelled");
                    cancelled = true;
                    break;
                }
                Event::CancelSourceGone => cancel = None,
            }
        }

        Ok(SearchSummary {
            space_size: self.space.count(),
            workers: worker_count,
            scanned: Self::scanned(&links),
            amulets,
            elapsed: start_time.elapsed(),
            failures,
            cancelled,
        })
    }

    /// Block until any active worker channel or the cancel channel is ready
    fn next_event(links: &[WorkerLink], cancel: Option<&Receiver<()>>) -> Event {
        let mut select = Select::new();
        let mut sources = Vec::new();
        for (i, link) in links.iter().enumerate().filter(|(_, link)| !link.done) {
            if link.results_open {
                select.recv(&link.results);
                sources.push(Source::Results(i));
            }
            select.recv(&link.signals);
            sources.push(Source::Signals(i));
        }
        if let Some(cancel) = cancel {
            select.recv(cancel);
            sources.push(Source::Cancel);
        }

        let operation = select.select();
        match sources[operation.index()] {
            Source::Results(i) => match operation.recv(&links[i].results) {
                Ok(amulet) => Event::Found(amulet),
                Err(_) => Event::ResultsClosed(i),
            },
            Source::Signals(i) => match operation.recv(&links[i].signals) {
                Ok(signal) => Event::Signal(i, signal),
                Err(_) => Event::SignalsClosed(i),
            },
            Source::Cancel => match cancel.map(|c| operation.recv(c)) {
                Some(Ok(())) => Event::Cancelled,
                _ => Event::CancelSourceGone,
            },
        }
    }

    /// Report results still buffered for a worker that has stopped, and retire it
    fn drain<R: Reporter>(link: &mut WorkerLink, reporter: &mut R) -> usize {
        let mut drained = 0;
        for amulet in link.results.try_iter() {
            reporter.amulet(&amulet);
            drained += 1;
        }
        link.done = true;
        drained
    }

    fn failure<R: Reporter>(link: &WorkerLink, reason: String, reporter: &mut R) -> WorkerFailure {
        let failure = WorkerFailure {
            worker: link.partition.worker,
            reason,
            unscanned: link.partition.start + link.scanned..link.partition.end,
        };
        tracing::warn!(
            "Worker {} failed: {} (indices {}..{} not scanned)",
            failure.worker,
            failure.reason,
            failure.unscanned.start,
            failure.unscanned.end
        );
        reporter.worker_failed(&failure);
        failure
    }

    fn scanned(links: &[WorkerLink]) -> u128 {
        links.iter().map(|link| link.scanned).sum()
    }
}
