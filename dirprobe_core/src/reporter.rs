use crate::prober::Outcome;
use crate::progress::ProgressReport;
use colored::{Color, Colorize};
use std::io::{self, Write};
use url::Url;

/// Console side of a scan: receives hits, progress samples and run boundaries.
///
/// The engine only calls a `Reporter` while holding its shared lock, so
/// implementations never see concurrent calls and can write without buffering.
pub trait Reporter: Send {
    /// A new target is about to be scanned with `total_words` base words.
    fn run_started(&mut self, target: &Url, total_words: usize);

    /// An outcome passed the print policy.
    fn hit(&mut self, outcome: &Outcome);

    /// A progress sample; expected to overwrite the previous one.
    fn progress(&mut self, report: &ProgressReport);

    /// The run is over; terminate the progress line.
    fn run_finished(&mut self);
}

/// Status colour used for hit lines.
pub fn color_for(status: u16) -> Color {
    match status {
        200..=299 => Color::Green,
        300..=399 => Color::Blue,
        400..=499 => Color::Yellow,
        500..=599 => Color::Red,
        _ => Color::White,
    }
}

/// Formats a hit line without colour:
/// `[HH:MM:SS]  200    512B   GET      http://host/path  -->  /next`.
pub fn format_hit_line(timestamp: &str, outcome: &Outcome) -> String {
    let redirect = match &outcome.redirect_location {
        Some(location) => format!("  -->  {location}"),
        None => String::new(),
    };
    format!(
        "[{timestamp}] {:4}  {:5}B   GET      {}{redirect}",
        outcome.status, outcome.content_length, outcome.url
    )
}

/// Writes coloured status output to a terminal (stdout by default).
///
/// Console writes are best-effort: a failing terminal never aborts a scan.
pub struct ConsoleReporter {
    out: Box<dyn Write + Send>,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn new<W: Write + Send + 'static>(out: W) -> Self {
        Self { out: Box::new(out) }
    }
}

impl Reporter for ConsoleReporter {
    fn run_started(&mut self, target: &Url, total_words: usize) {
        let _ = writeln!(self.out, "{}", format!("\n=== Scanning: {target} ===\n").cyan());
        let _ = writeln!(
            self.out,
            "{}",
            format!("[i] Base words loaded: {total_words}").cyan()
        );
    }

    fn hit(&mut self, outcome: &Outcome) {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let line = format_hit_line(&timestamp, outcome).color(color_for(outcome.status));
        let _ = writeln!(self.out, "{line}");
    }

    fn progress(&mut self, report: &ProgressReport) {
        let _ = write!(self.out, "\r{}", report.render().cyan());
        let _ = self.out.flush();
    }

    fn run_finished(&mut self) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Everything a reporter was told, in call order.
    #[derive(Debug, Default)]
    pub struct Recorded {
        pub runs: Vec<(String, usize)>,
        pub hits: Vec<Outcome>,
        pub progress: Vec<ProgressReport>,
        pub finished: usize,
    }

    #[derive(Debug, Clone, Default)]
    pub struct RecordingReporter(pub Arc<Mutex<Recorded>>);

    impl RecordingReporter {
        pub fn hit_statuses(&self) -> Vec<u16> {
            self.0.lock().unwrap().hits.iter().map(|o| o.status).collect()
        }
    }

    impl Reporter for RecordingReporter {
        fn run_started(&mut self, target: &Url, total_words: usize) {
            self.0
                .lock()
                .unwrap()
                .runs
                .push((target.to_string(), total_words));
        }
        fn hit(&mut self, outcome: &Outcome) {
            self.0.lock().unwrap().hits.push(outcome.clone());
        }
        fn progress(&mut self, report: &ProgressReport) {
            self.0.lock().unwrap().progress.push(report.clone());
        }
        fn run_finished(&mut self) {
            self.0.lock().unwrap().finished += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::test_utils::SharedBuffer;

    fn outcome(status: u16, redirect: Option<&str>) -> Outcome {
        Outcome {
            url: Url::parse("http://x/admin").unwrap(),
            status,
            content_length: 42,
            redirect_location: redirect.map(str::to_string),
        }
    }

    #[test]
    fn colors_follow_status_class() {
        assert_eq!(color_for(204), Color::Green);
        assert_eq!(color_for(301), Color::Blue);
        assert_eq!(color_for(403), Color::Yellow);
        assert_eq!(color_for(503), Color::Red);
        assert_eq!(color_for(101), Color::White);
        assert_eq!(color_for(999), Color::White);
    }

    #[test]
    fn hit_line_layout() {
        assert_eq!(
            format_hit_line("12:00:01", &outcome(200, None)),
            "[12:00:01]  200     42B   GET      http://x/admin"
        );
        assert_eq!(
            format_hit_line("12:00:01", &outcome(302, Some("/login"))),
            "[12:00:01]  302     42B   GET      http://x/admin  -->  /login"
        );
    }

    #[test]
    fn console_reporter_writes_progress_then_newline() {
        let buffer = SharedBuffer::default();
        let mut reporter = ConsoleReporter::new(buffer.clone());
        reporter.run_started(&Url::parse("http://x/").unwrap(), 3);
        reporter.hit(&outcome(403, None));
        reporter.progress(&ProgressReport {
            remaining_words: 1,
            total_words: 3,
            requests_per_second: 10.0,
            hits: 1,
            eta_secs: 0.0,
        });
        reporter.run_finished();

        let text = buffer.contents();
        assert!(text.contains("=== Scanning: http://x/ ==="));
        assert!(text.contains("[i] Base words loaded: 3"));
        assert!(text.contains("403     42B   GET      http://x/admin"));
        assert!(text.contains("\r"));
        assert!(text.contains("Words left: 1/3"));
        assert!(text.ends_with('\n'));
    }
}
