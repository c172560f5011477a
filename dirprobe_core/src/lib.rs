pub mod config;
pub mod engine;
pub mod http;
pub mod policy;
pub mod prober;
pub mod progress;
pub mod queue;
pub mod reporter;
pub mod sink;
pub mod target;
pub mod variants;
pub mod wordlist;

pub use config::DirprobeConfig;
pub use engine::{Engine, EngineError, EngineSettings, RunPhase, RunSummary};
pub use http::{ClientSettings, ReqwestClient};
pub use policy::StatusPolicy;
pub use prober::{HttpClient, Outcome, Prober, RawResponse};
pub use progress::{Counters, ProgressMonitor, ProgressReport};
pub use queue::WorkQueue;
pub use reporter::{ConsoleReporter, Reporter};
pub use sink::ResultSink;
pub use target::{Target, TargetError, TargetList};
pub use variants::VariantGenerator;
pub use wordlist::{WordlistError, load_words};
