use dirprobe_core::config::DirprobeConfig;
use dirprobe_core::engine::{Engine, EngineSettings};
use dirprobe_core::http::{ClientSettings, ReqwestClient, parse_header_json, pick_user_agent};
use dirprobe_core::policy::StatusPolicy;
use dirprobe_core::reporter::ConsoleReporter;
use dirprobe_core::sink::ResultSink;
use dirprobe_core::target::{Target, TargetList};
use dirprobe_core::wordlist::load_words;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Multi-target content discovery: wordlist x extension x bypass suffix, probed concurrently.
/// For authorized testing only.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Target URL, or a file with one target per line.
    targets: String,
    /// Wordlist directory (walked recursively) or a single wordlist file.
    wordlist: PathBuf,
    #[clap(short, long)]
    threads: Option<usize>,
    /// Per-request timeout in seconds.
    #[clap(long)]
    timeout: Option<u64>,
    #[clap(long)]
    proxy: Option<String>,
    /// Extra request headers as a JSON object, e.g. '{"Cookie": "a=b"}'.
    #[clap(long)]
    headers: Option<String>,
    /// Disable TLS certificate verification.
    #[clap(long)]
    insecure: bool,
    /// Only print these status codes (e.g. 200,403). Saving is unaffected.
    #[clap(long, default_value = "")]
    status: String,
    #[clap(short, long, value_parser)]
    config_file: Option<PathBuf>,
    #[clap(short, long)]
    verbose: bool,
    #[clap(short, long)]
    quiet: bool,
}

fn load_config(cli: &Cli) -> Result<DirprobeConfig, anyhow::Error> {
    match &cli.config_file {
        Some(config_path) => {
            tracing::info!("Loading configuration from {config_path:?}");
            DirprobeConfig::load_from_file(config_path)
        }
        None => {
            let default_config_path = PathBuf::from("dirprobe.toml");
            if default_config_path.exists() {
                tracing::info!("Loading default configuration from {default_config_path:?}");
                DirprobeConfig::load_from_file(&default_config_path)
            } else {
                Ok(DirprobeConfig::default())
            }
        }
    }
}

fn custom_headers(raw: Option<&str>) -> Vec<(String, String)> {
    match raw {
        Some(raw) => parse_header_json(raw).unwrap_or_else(|| {
            tracing::warn!("Invalid --headers JSON, ignoring.");
            eprintln!("{}", "[!] Invalid --headers JSON, ignoring.".red());
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Idle connections kept per host: two per worker thread.
fn idle_pool_size(threads: usize) -> usize {
    threads.saturating_mul(2)
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(&cli)?;
    if let Some(threads) = cli.threads {
        config.fuzzer.threads = threads;
    }
    if let Some(timeout) = cli.timeout {
        config.fuzzer.timeout_secs = timeout;
    }
    tracing::debug!("Effective configuration: {config:#?}");

    let target_list = TargetList::from_arg(&cli.targets)?;
    let result_file = PathBuf::from(target_list.result_file_name());

    let print_policy = StatusPolicy::parse_list(&cli.status);
    let save_policy = StatusPolicy::only(config.policy.save_codes.iter().copied());

    println!("{}", format!("[i] Printing: {print_policy}").green());
    println!("{}", format!("[i] Saving only: {save_policy}").green());
    println!("{}", format!("[i] Output file: {}", result_file.display()).green());

    let words = load_words(&cli.wordlist)
        .with_context(|| format!("Failed to load wordlist from {:?}", cli.wordlist))?;

    let client_settings = ClientSettings {
        timeout: Duration::from_secs(config.fuzzer.timeout_secs),
        proxy: cli.proxy.clone(),
        insecure: cli.insecure,
        user_agent: pick_user_agent(&config.http.user_agents, &mut rand::rng()),
        headers: custom_headers(cli.headers.as_deref()),
        follow_redirects: config.http.follow_redirects,
        max_idle_per_host: idle_pool_size(config.fuzzer.threads),
    };
    let client = ReqwestClient::new(&client_settings).context("Failed to build HTTP client")?;

    let sink = ResultSink::create(&result_file, save_policy)
        .with_context(|| format!("Failed to create result file {result_file:?}"))?;

    let engine_settings = EngineSettings {
        threads: config.fuzzer.threads,
        print_policy,
        progress_interval: Duration::from_millis(config.fuzzer.progress_interval_ms),
        variants: config.variants.generator(),
    };
    let engine = Engine::new(
        engine_settings,
        client,
        sink,
        Box::new(ConsoleReporter::stdout()),
    )?;

    for raw_target in &target_list.targets {
        let target = match Target::parse(raw_target) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Skipping target: {e}");
                continue;
            }
        };
        engine.run(&target, words.iter().cloned())?;
    }

    println!(
        "{}",
        format!("\n[+] Results written to {}", result_file.display()).green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["dirprobe", "http://x", "lists/"]);
        assert_eq!(cli.targets, "http://x");
        assert_eq!(cli.wordlist, PathBuf::from("lists/"));
        assert_eq!(cli.threads, None);
        assert_eq!(cli.timeout, None);
        assert!(!cli.insecure);
        assert_eq!(StatusPolicy::parse_list(&cli.status), StatusPolicy::All);
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::parse_from([
            "dirprobe",
            "targets.txt",
            "lists/",
            "-t",
            "50",
            "--timeout",
            "7",
            "--proxy",
            "http://127.0.0.1:8080",
            "--headers",
            r#"{"X-Test": "1"}"#,
            "--insecure",
            "--status",
            "200,403",
        ]);
        assert_eq!(cli.threads, Some(50));
        assert_eq!(cli.timeout, Some(7));
        assert_eq!(cli.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert!(cli.insecure);
        assert_eq!(
            StatusPolicy::parse_list(&cli.status),
            StatusPolicy::only([200, 403])
        );
        assert_eq!(
            custom_headers(cli.headers.as_deref()),
            vec![("X-Test".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn idle_pool_size_does_not_overflow() {
        assert_eq!(idle_pool_size(20), 40);
        assert_eq!(idle_pool_size(usize::MAX), usize::MAX);
    }

    #[test]
    fn invalid_headers_fall_back_to_none() {
        assert!(custom_headers(Some("{oops")).is_empty());
        assert!(custom_headers(None).is_empty());
    }
}
