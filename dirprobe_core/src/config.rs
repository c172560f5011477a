use crate::http::DEFAULT_USER_AGENTS;
use crate::policy::DEFAULT_SAVE_CODES;
use crate::variants::{DEFAULT_BYPASS, DEFAULT_EXTENSIONS, VariantGenerator};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct FuzzerSettings {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

pub fn default_threads() -> usize {
    20
}
pub fn default_timeout_secs() -> u64 {
    3
}
fn default_progress_interval_ms() -> u64 {
    1000
}

impl Default for FuzzerSettings {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            timeout_secs: default_timeout_secs(),
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct VariantSettings {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_bypass")]
    pub bypass: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_bypass() -> Vec<String> {
    DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect()
}

impl Default for VariantSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            bypass: default_bypass(),
        }
    }
}

impl VariantSettings {
    pub fn generator(&self) -> VariantGenerator {
        VariantGenerator::new(self.extensions.clone(), self.bypass.clone())
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct PolicySettings {
    #[serde(default = "default_save_codes")]
    pub save_codes: Vec<u16>,
}

fn default_save_codes() -> Vec<u16> {
    DEFAULT_SAVE_CODES.to_vec()
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            save_codes: default_save_codes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect()
}

fn default_follow_redirects() -> bool {
    true
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
            follow_redirects: default_follow_redirects(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct DirprobeConfig {
    #[serde(default)]
    pub fuzzer: FuzzerSettings,
    #[serde(default)]
    pub variants: VariantSettings,
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub http: HttpSettings,
}

impl DirprobeConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
