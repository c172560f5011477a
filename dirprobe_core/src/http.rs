use crate::prober::{HttpClient, RawResponse};
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION, USER_AGENT};
use reqwest::{Proxy, redirect};
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

/// Browser User-Agents picked from when none is configured.
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
];

/// Hops followed before the last redirect response is returned as-is.
const MAX_REDIRECTS: usize = 10;

/// Everything needed to build the shared transport for an invocation.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub proxy: Option<String>,
    /// Skip TLS certificate and hostname verification.
    pub insecure: bool,
    pub user_agent: String,
    /// Extra request headers, applied after the User-Agent so they may override it.
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
    pub max_idle_per_host: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            proxy: None,
            insecure: false,
            user_agent: DEFAULT_USER_AGENTS[0].to_string(),
            headers: Vec::new(),
            follow_redirects: true,
            max_idle_per_host: 40,
        }
    }
}

/// Picks one User-Agent from `agents`, falling back to the built-in list.
pub fn pick_user_agent<R: Rng + ?Sized>(agents: &[String], rng: &mut R) -> String {
    match agents.choose(rng) {
        Some(agent) => agent.clone(),
        None => DEFAULT_USER_AGENTS
            .choose(rng)
            .copied()
            .unwrap_or(DEFAULT_USER_AGENTS[0])
            .to_string(),
    }
}

/// Parses the `--headers` JSON object into name/value pairs.
///
/// Returns `None` when `raw` is not a JSON object. String values are used as-is,
/// other scalars by their JSON text; `null`, arrays and objects are skipped.
pub fn parse_header_json(raw: &str) -> Option<Vec<(String, String)>> {
    let JsonValue::Object(map) = serde_json::from_str::<JsonValue>(raw).ok()? else {
        return None;
    };
    let headers = map
        .into_iter()
        .filter_map(|(name, value)| match value {
            JsonValue::String(s) => Some((name, s)),
            JsonValue::Number(n) => Some((name, n.to_string())),
            JsonValue::Bool(b) => Some((name, b.to_string())),
            _ => {
                tracing::warn!("header {name:?} has a non-scalar value, skipping");
                None
            }
        })
        .collect();
    Some(headers)
}

/// [`HttpClient`] backed by a pooled, blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, reqwest::Error> {
        let redirect_policy = if settings.follow_redirects {
            redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            redirect::Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(settings.insecure)
            .redirect(redirect_policy)
            .default_headers(default_headers(settings))
            .pool_max_idle_per_host(settings.max_idle_per_host);

        if settings.insecure {
            builder = builder.danger_accept_invalid_hostnames(true);
        }
        // Only an explicit proxy is used; environment proxy variables are ignored.
        builder = match &settings.proxy {
            Some(proxy) => builder.proxy(Proxy::all(proxy.as_str())?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn default_headers(settings: &ClientSettings) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&settings.user_agent) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(_) => tracing::warn!("invalid User-Agent {:?}, using none", settings.user_agent),
    }
    for (name, value) in &settings.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("skipping invalid header {name:?}: {value:?}"),
        }
    }
    headers
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> Option<RawResponse> {
        let response = match self.client.get(url.as_str()).send() {
            Ok(response) => response,
            Err(e) => {
                tracing::trace!("request to {url} failed: {e}");
                return None;
            }
        };

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.bytes() {
            Ok(body) => Some(RawResponse {
                status,
                body_len: body.len() as u64,
                location,
            }),
            Err(e) => {
                tracing::trace!("reading body of {url} failed: {e}");
                None
            }
        }
    }
}
