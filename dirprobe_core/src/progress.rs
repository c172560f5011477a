use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Per-run counters shared by the workers and the progress monitor.
///
/// Always mutated through the engine's single lock; every update is O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub total_words: usize,
    pub words_done: usize,
    pub requests_issued: u64,
    pub hits_saved: u64,
    /// Requests that produced no response. Never shown on the progress line.
    pub failed_requests: u64,
    pub started: Instant,
}

impl Counters {
    pub fn start(total_words: usize) -> Self {
        Self {
            total_words,
            words_done: 0,
            requests_issued: 0,
            hits_saved: 0,
            failed_requests: 0,
            started: Instant::now(),
        }
    }

    /// Derives the throughput and ETA figures as of `now`.
    pub fn report(&self, now: Instant) -> ProgressReport {
        // Floor avoids a division by zero on the very first tick.
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64().max(0.001);
        let remaining_words = self.total_words.saturating_sub(self.words_done);
        ProgressReport {
            remaining_words,
            total_words: self.total_words,
            requests_per_second: self.requests_issued as f64 / elapsed,
            hits: self.hits_saved,
            eta_secs: estimate_remaining_secs(remaining_words, self.words_done, elapsed),
        }
    }
}

/// Remaining time at the current word rate, or `0.0` before any word completes.
pub fn estimate_remaining_secs(remaining_words: usize, words_done: usize, elapsed_secs: f64) -> f64 {
    if words_done == 0 || elapsed_secs <= 0.0 {
        return 0.0;
    }
    let words_per_sec = words_done as f64 / elapsed_secs;
    remaining_words as f64 / words_per_sec
}

/// One sample rendered by the progress line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub remaining_words: usize,
    pub total_words: usize,
    pub requests_per_second: f64,
    pub hits: u64,
    pub eta_secs: f64,
}

impl ProgressReport {
    /// ETA split into whole minutes and seconds.
    pub fn eta_min_sec(&self) -> (u64, u64) {
        let secs = self.eta_secs.max(0.0) as u64;
        (secs / 60, secs % 60)
    }

    pub fn render(&self) -> String {
        let (min, sec) = self.eta_min_sec();
        format!(
            "[PROGRESS] Words left: {}/{} | RPS: {:6.1} | Hits: {} | ETA: {:02}:{:02}",
            self.remaining_words, self.total_words, self.requests_per_second, self.hits, min, sec
        )
    }
}

/// Periodic sampler for a running scan.
///
/// The monitor does not touch shared state itself: `tick` is expected to take the
/// snapshot and render it, `finish` runs once after the stop signal.
#[derive(Debug, Clone, Copy)]
pub struct ProgressMonitor {
    interval: Duration,
}

/// Shortest tick the monitor accepts; anything lower is raised to this.
pub const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(10);

impl ProgressMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_PROGRESS_INTERVAL),
        }
    }

    /// Ticks immediately, then once per interval until `stop` fires or disconnects.
    pub fn run<T, F>(&self, stop: &Receiver<()>, mut tick: T, finish: F)
    where
        T: FnMut(),
        F: FnOnce(),
    {
        loop {
            tick();
            match stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        finish();
    }
}
