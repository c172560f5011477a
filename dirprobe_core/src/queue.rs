use crossbeam_channel::{Receiver, unbounded};
use std::collections::HashSet;

/// Shared queue of base words, filled once and drained by every worker.
///
/// The queue is populated up front and its sending side is dropped before any
/// worker starts, so an empty, disconnected channel is the exhaustion signal.
/// A word is handed to exactly one worker.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    receiver: Receiver<String>,
    total_words: usize,
}

impl WorkQueue {
    /// Deduplicates `words` and enqueues each distinct entry once.
    pub fn load<I>(words: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let unique: HashSet<String> = words.into_iter().collect();
        let (sender, receiver) = unbounded();
        let total_words = unique.len();
        for word in unique {
            // The receiver lives in `receiver` for the whole loop, so sending cannot fail.
            let _ = sender.send(word);
        }
        drop(sender);
        Self {
            receiver,
            total_words,
        }
    }

    /// Number of distinct words loaded. Fixed at load time.
    pub fn total_words(&self) -> usize {
        self.total_words
    }

    /// Words not yet handed to a worker.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Takes the next word, or `None` once the queue is exhausted.
    pub fn pull(&self) -> Option<String> {
        self.receiver.recv().ok()
    }
}
