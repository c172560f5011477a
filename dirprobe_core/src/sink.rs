use crate::policy::StatusPolicy;
use crate::prober::Outcome;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only store for hits.
///
/// Every matching outcome becomes one line `"<status> - <length>B - <url>\n"` and
/// is flushed before [`ResultSink::record`] returns. The sink is not internally
/// synchronized; the engine keeps it behind its shared lock.
pub struct ResultSink {
    writer: Box<dyn Write + Send>,
    policy: StatusPolicy,
    path: Option<PathBuf>,
}

impl ResultSink {
    /// Creates (or truncates) the result file at `path`.
    pub fn create(path: &Path, policy: StatusPolicy) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: Box::new(file),
            policy,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an arbitrary writer, e.g. an in-memory buffer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W, policy: StatusPolicy) -> Self {
        Self {
            writer: Box::new(writer),
            policy,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    /// Appends `outcome` if its status matches the save policy.
    ///
    /// Returns `Ok(true)` when a line was written. Write errors are returned as-is.
    pub fn record(&mut self, outcome: &Outcome) -> io::Result<bool> {
        if !self.policy.matches(outcome.status) {
            return Ok(false);
        }
        let line = format_hit(outcome);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(true)
    }
}

impl std::fmt::Debug for ResultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSink")
            .field("policy", &self.policy)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

pub fn format_hit(outcome: &Outcome) -> String {
    format!(
        "{} - {}B - {}\n",
        outcome.status, outcome.content_length, outcome.url
    )
}
