use anyhow::{Context, Result, anyhow};
use crossbeam::channel::Sender;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use super::partition::Partition;
use crate::amulet::{Amulet, AmuletTest};
use crate::enumerate::SpaceEnumerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Finished,
    Failed,
}

/// Lifecycle messages a worker sends to the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerSignal {
    Progress { worker: usize, scanned: u128 },
    Finished { worker: usize, scanned: u128 },
    Failed { worker: usize, scanned: u128, reason: String },
}

/// Scans one partition. Owns its own copy of the space and shares nothing
/// with other workers; everything it produces leaves through its channels.
pub struct Worker {
    id: usize,
    space: SpaceEnumerator,
    partition: Partition,
    test: AmuletTest,
    progress_every: u128,
    state: WorkerState,
}

impl Worker {
    pub fn new(id: usize, space: SpaceEnumerator, partition: Partition, test: AmuletTest, progress_every: u64) -> Self {
        Self {
            id,
            space,
            partition,
            test,
            progress_every: progress_every.max(1) as u128,
            state: WorkerState::Idle,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run on a dedicated OS thread
    pub fn spawn(self, results: Sender<Amulet>, signals: Sender<WorkerSignal>) -> Result<JoinHandle<WorkerState>> {
        let id = self.id;
        thread::Builder::new()
            .name(format!("amulet-worker-{id}"))
            .spawn(move || self.run(results, signals))
            .with_context(|| format!("Failed to spawn worker {id}"))
    }

    /// Scan the whole partition on the current thread, then send exactly one
    /// `Finished` or `Failed` signal.
    pub fn run(mut self, results: Sender<Amulet>, signals: Sender<WorkerSignal>) -> WorkerState {
        self.state = WorkerState::Running;
        tracing::debug!(
            "Worker {} running over [{}, {})",
            self.id,
            self.partition.start,
            self.partition.end
        );

        let mut scanned = 0u128;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.scan(&results, &signals, &mut scanned)));

        let signal = match outcome {
            Ok(Ok(())) => {
                self.state = WorkerState::Finished;
                WorkerSignal::Finished {
                    worker: self.id,
                    scanned,
                }
            }
            Ok(Err(e)) => {
                self.state = WorkerState::Failed;
                WorkerSignal::Failed {
                    worker: self.id,
                    scanned,
                    reason: format!("{e:#}"),
                }
            }
            Err(payload) => {
                self.state = WorkerState::Failed;
                WorkerSignal::Failed {
                    worker: self.id,
                    scanned,
                    reason: format!("worker panicked: {}", panic_message(payload.as_ref())),
                }
            }
        };

        tracing::debug!("Worker {} {:?} after {} indices", self.id, self.state, scanned);
        if signals.send(signal).is_err() {
            tracing::debug!("Worker {}: coordinator no longer listening", self.id);
        }
        self.state
    }

    fn scan(&self, results: &Sender<Amulet>, signals: &Sender<WorkerSignal>, scanned: &mut u128) -> Result<()> {
        for index in self.partition.range() {
            let geode = self.space.unrank(index)?;
            if let Some(verdict) = self.test.check(&geode.text()) {
                let amulet = Amulet {
                    index,
                    worker: self.id,
                    geode,
                    verdict,
                };
                results
                    .send(amulet)
                    .map_err(|_| anyhow!("coordinator stopped receiving results"))?;
            }

            *scanned += 1;
            if *scanned % self.progress_every == 0 {
                signals
                    .send(WorkerSignal::Progress {
                        worker: self.id,
                        scanned: *scanned,
                    })
                    .map_err(|_| anyhow!("coordinator stopped receiving signals"))?;
            }
        }
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::partition;
    use crossbeam::channel::unbounded;

    fn lenient() -> AmuletTest {
        AmuletTest::new('8', 4, 64).unwrap()
    }

    #[test]
    fn test_worker_scans_its_partition() {
        let space = SpaceEnumerator::new(&["ok", "go"]).unwrap();
        let whole = partition::plan(space.count(), 1).unwrap()[0];
        let worker = Worker::new(0, space, whole, lenient(), 1000);
        assert_eq!(worker.state(), WorkerState::Idle);

        let (result_tx, result_rx) = unbounded();
        let (signal_tx, signal_rx) = unbounded();
        assert_eq!(worker.run(result_tx, signal_tx), WorkerState::Finished);

        let amulets: Vec<Amulet> = result_rx.try_iter().collect();
        assert_eq!(amulets.len(), 13);
        assert!(amulets.iter().all(|a| a.worker == 0 && a.verdict.run_length >= 4));

        let signals: Vec<WorkerSignal> = signal_rx.try_iter().collect();
        assert_eq!(signals.iter().filter(|s| matches!(s, WorkerSignal::Progress { .. })).count(), 16);
        assert_eq!(
            signals.last(),
            Some(&WorkerSignal::Finished {
                worker: 0,
                scanned: 16380
            })
        );
    }

    #[test]
    fn test_worker_only_touches_its_range() {
        let space = SpaceEnumerator::new(&["ok", "go"]).unwrap();
        let partitions = partition::plan(space.count(), 3).unwrap();
        let worker = Worker::new(1, space, partitions[1], lenient(), 1 << 20);

        let (result_tx, result_rx) = unbounded();
        let (signal_tx, signal_rx) = unbounded();
        worker.run(result_tx, signal_tx);

        assert!(result_rx.try_iter().all(|a| partitions[1].contains(a.index) && a.worker == 1));
        assert_eq!(
            signal_rx.try_iter().last(),
            Some(WorkerSignal::Finished {
                worker: 1,
                scanned: partitions[1].len()
            })
        );
    }

    #[test]
    fn test_worker_reports_failure() {
        let space = SpaceEnumerator::new(&["ok"]).unwrap();
        let beyond = Partition {
            worker: 0,
            start: 85,
            end: 95,
        };
        let (result_tx, _result_rx) = unbounded();
        let (signal_tx, signal_rx) = unbounded();
        let state = Worker::new(0, space, beyond, AmuletTest::default(), 1000).run(result_tx, signal_tx);
        assert_eq!(state, WorkerState::Failed);

        match signal_rx.try_recv().unwrap() {
            WorkerSignal::Failed { scanned, reason, .. } => {
                assert_eq!(scanned, 5);
                assert!(reason.contains("out of range"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_stops_when_coordinator_leaves() {
        let space = SpaceEnumerator::new(&["ok", "go", "up"]).unwrap();
        let whole = partition::plan(space.count(), 1).unwrap()[0];
        let (result_tx, result_rx) = unbounded();
        let (signal_tx, signal_rx) = unbounded();
        drop(result_rx);
        drop(signal_rx);

        let state = Worker::new(0, space, whole, lenient(), 10).run(result_tx, signal_tx);
        assert_eq!(state, WorkerState::Failed);
    }

    #[test]
    fn test_spawned_worker_reports_over_channels() {
        let space = SpaceEnumerator::new(&["ok"]).unwrap();
        let whole = partition::plan(space.count(), 1).unwrap()[0];
        let (result_tx, _result_rx) = unbounded();
        let (signal_tx, signal_rx) = unbounded();

        let handle = Worker::new(4, space, whole, AmuletTest::default(), 1000)
            .spawn(result_tx, signal_tx)
            .unwrap();
        assert_eq!(handle.join().unwrap(), WorkerState::Finished);
        assert_eq!(
            signal_rx.recv().unwrap(),
            WorkerSignal::Finished { worker: 4, scanned: 90 }
        );
    }
}
