use crate::policy::StatusPolicy;
use crate::prober::{HttpClient, Outcome, Prober};
use crate::progress::{Counters, ProgressMonitor};
use crate::queue::WorkQueue;
use crate::reporter::Reporter;
use crate::sink::ResultSink;
use crate::target::Target;
use crate::variants::VariantGenerator;
use crossbeam_channel::bounded;
use std::any::Any;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Errors that end a run early.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Appending a hit to the result file failed. Hits are no longer durable, so
    /// the run stops.
    #[error("Failed to append to result file: {0}")]
    Sink(#[from] io::Error),

    #[error("Worker thread panicked: {0}")]
    WorkerPanicked(String),

    #[error("Thread count must be at least 1")]
    NoWorkers,
}

/// Where a run currently is. Each target goes through the full cycle once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Loading,
    Running,
    Draining,
    Done,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub threads: usize,
    pub print_policy: StatusPolicy,
    pub progress_interval: Duration,
    pub variants: VariantGenerator,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            threads: 20,
            print_policy: StatusPolicy::All,
            progress_interval: Duration::from_secs(1),
            variants: VariantGenerator::default(),
        }
    }
}

/// Final counter values of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total_words: usize,
    pub words_done: usize,
    pub requests_issued: u64,
    pub hits_saved: u64,
    pub failed_requests: u64,
    pub elapsed: Duration,
}

/// State behind the engine's single lock: counters, console and result file.
struct Ledger {
    counters: Counters,
    sink: ResultSink,
    reporter: Box<dyn Reporter>,
}

/// Drives the worker pool for one target at a time.
///
/// The engine owns the result sink and the reporter for the whole invocation;
/// only the counters are reset between targets. Every critical section on the
/// shared lock is a single counter update, one console write or one file append,
/// and no network call happens while it is held.
pub struct Engine<C: HttpClient> {
    settings: EngineSettings,
    client: C,
    ledger: Mutex<Ledger>,
    phase: Mutex<RunPhase>,
}

impl<C: HttpClient> Engine<C> {
    pub fn new(
        settings: EngineSettings,
        client: C,
        sink: ResultSink,
        reporter: Box<dyn Reporter>,
    ) -> Result<Self, EngineError> {
        if settings.threads == 0 {
            return Err(EngineError::NoWorkers);
        }
        Ok(Self {
            settings,
            client,
            ledger: Mutex::new(Ledger {
                counters: Counters::start(0),
                sink,
                reporter,
            }),
            phase: Mutex::new(RunPhase::Idle),
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current run's counters.
    pub fn counters(&self) -> Counters {
        self.ledger().counters
    }

    /// Scans `target` with every word in `words`, blocking until the queue is drained.
    ///
    /// Duplicate words are collapsed before any request is made. A result-file
    /// write failure stops all workers and is returned once they have exited.
    pub fn run<I>(&self, target: &Target, words: I) -> Result<RunSummary, EngineError>
    where
        I: IntoIterator<Item = String>,
    {
        self.set_phase(RunPhase::Loading);
        let queue = WorkQueue::load(words);
        {
            let mut ledger = self.ledger();
            ledger.counters = Counters::start(queue.total_words());
            ledger.reporter.run_started(target.base(), queue.total_words());
        }

        self.set_phase(RunPhase::Running);
        let abort = AtomicBool::new(false);
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let monitor = ProgressMonitor::new(self.settings.progress_interval);
        let base = target.base();

        let results: Vec<Result<(), EngineError>> = thread::scope(|s| {
            let monitor_handle = s.spawn(|| {
                monitor.run(
                    &stop_rx,
                    || self.render_progress(),
                    || {
                        self.render_progress();
                        self.ledger().reporter.run_finished();
                    },
                )
            });

            let workers: Vec<_> = (0..self.settings.threads)
                .map(|_| s.spawn(|| self.work(base, &queue, &abort)))
                .collect();

            let results: Vec<Result<(), EngineError>> = workers
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|payload| {
                        Err(EngineError::WorkerPanicked(panic_message(payload)))
                    })
                })
                .collect();

            let _ = stop_tx.send(());
            if monitor_handle.join().is_err() {
                tracing::warn!("progress monitor panicked");
            }
            results
        });

        self.set_phase(RunPhase::Done);
        let summary = self.summary();
        tracing::debug!(
            "finished {}: {} words, {} requests, {} hits, {} failed requests in {:.2?}",
            base,
            summary.words_done,
            summary.requests_issued,
            summary.hits_saved,
            summary.failed_requests,
            summary.elapsed
        );

        results.into_iter().collect::<Result<Vec<()>, _>>()?;
        Ok(summary)
    }

    fn work(&self, base: &Url, queue: &WorkQueue, abort: &AtomicBool) -> Result<(), EngineError> {
        let result = self.drain(base, queue, abort);
        self.set_phase(RunPhase::Draining);
        result
    }

    fn drain(&self, base: &Url, queue: &WorkQueue, abort: &AtomicBool) -> Result<(), EngineError> {
        let prober = Prober::new(&self.client);
        while let Some(word) = queue.pull() {
            for variant in self.settings.variants.variants(&word) {
                if abort.load(Ordering::Relaxed) {
                    return Ok(());
                }
                match prober.probe(base, &variant) {
                    Some(outcome) => {
                        if let Err(e) = self.handle_outcome(&outcome) {
                            abort.store(true, Ordering::Relaxed);
                            return Err(e);
                        }
                    }
                    None => self.ledger().counters.failed_requests += 1,
                }
            }
            self.ledger().counters.words_done += 1;
        }
        Ok(())
    }

    fn handle_outcome(&self, outcome: &Outcome) -> Result<(), EngineError> {
        self.ledger().counters.requests_issued += 1;

        if self.settings.print_policy.matches(outcome.status) {
            self.ledger().reporter.hit(outcome);
        }

        let mut ledger = self.ledger();
        if ledger.sink.record(outcome)? {
            ledger.counters.hits_saved += 1;
        }
        Ok(())
    }

    fn render_progress(&self) {
        let mut ledger = self.ledger();
        let report = ledger.counters.report(Instant::now());
        ledger.reporter.progress(&report);
    }

    fn summary(&self) -> RunSummary {
        let counters = self.counters();
        RunSummary {
            total_words: counters.total_words,
            words_done: counters.words_done,
            requests_issued: counters.requests_issued,
            hits_saved: counters.hits_saved,
            failed_requests: counters.failed_requests,
            elapsed: counters.started.elapsed(),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, next: RunPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != next {
            tracing::debug!("run phase {:?} -> {:?}", *phase, next);
            *phase = next;
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic type".to_string()
    }
}
