use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("Invalid target URL {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Target {0:?} has no host")]
    NoHost(String),

    #[error("Failed to read target list {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Base URL of one scan, always ending in exactly one `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    base: Url,
}

impl Target {
    /// Normalizes `raw` into a base URL.
    ///
    /// Trailing slashes collapse to one. A target without a scheme is assumed
    /// to be plain `http`.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        let normalized = format!("{}/", with_scheme.trim_end_matches('/'));

        let base = Url::parse(&normalized).map_err(|source| TargetError::InvalidUrl {
            input: raw.to_string(),
            source,
        })?;
        if base.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::NoHost(raw.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

/// Targets to scan plus the stem used to name the result file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetList {
    pub targets: Vec<String>,
    pub output_name: String,
}

impl TargetList {
    /// Interprets `arg` as a file of newline separated targets if such a file
    /// exists, otherwise as a single target.
    pub fn from_arg(arg: &str) -> Result<Self, TargetError> {
        let path = Path::new(arg);
        if path.is_file() {
            let content = fs::read_to_string(path).map_err(|source| TargetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let targets = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            let output_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| arg.to_string());
            return Ok(Self {
                targets,
                output_name,
            });
        }

        Ok(Self {
            targets: vec![arg.to_string()],
            output_name: extract_domain(arg).to_string(),
        })
    }

    /// Result file name: the output stem with a `.txt` suffix enforced.
    pub fn result_file_name(&self) -> String {
        with_txt_suffix(&self.output_name)
    }
}

/// Text between the scheme and the first `/`.
pub fn extract_domain(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

pub fn with_txt_suffix(name: &str) -> String {
    if name.ends_with(".txt") {
        name.to_string()
    } else {
        format!("{name}.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_normalizes_trailing_separator() {
        for raw in ["http://x", "http://x/", "http://x///"] {
            assert_eq!(Target::parse(raw).unwrap().base().as_str(), "http://x/");
        }
        assert_eq!(
            Target::parse("https://x/app//").unwrap().to_string(),
            "https://x/app/"
        );
    }

    #[test]
    fn parse_defaults_to_http() {
        assert_eq!(
            Target::parse("example.com").unwrap().base().as_str(),
            "http://example.com/"
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Target::parse("http://").is_err());
        assert!(Target::parse("http://exa mple.com").is_err());
    }

    #[test]
    fn single_target_is_named_after_its_host() {
        let list = TargetList::from_arg("https://shop.example.com/store/").unwrap();
        assert_eq!(list.targets, vec!["https://shop.example.com/store/"]);
        assert_eq!(list.output_name, "shop.example.com");
        assert_eq!(list.result_file_name(), "shop.example.com.txt");
    }

    #[test]
    fn target_file_is_named_after_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scope.txt");
        fs::write(&path, "http://a.example\n\n  http://b.example  \n").unwrap();

        let list = TargetList::from_arg(path.to_str().unwrap()).unwrap();
        assert_eq!(list.targets, vec!["http://a.example", "http://b.example"]);
        assert_eq!(list.output_name, "scope.txt");
        assert_eq!(list.result_file_name(), "scope.txt");
    }

    #[test]
    fn txt_suffix_is_enforced_once() {
        assert_eq!(with_txt_suffix("domains"), "domains.txt");
        assert_eq!(with_txt_suffix("domains.txt"), "domains.txt");
        assert_eq!(with_txt_suffix("domains.lst"), "domains.lst.txt");
    }

    #[test]
    fn extract_domain_strips_scheme_and_path() {
        assert_eq!(extract_domain("http://x.org/a/b"), "x.org");
        assert_eq!(extract_domain("https://x.org:8443"), "x.org:8443");
        assert_eq!(extract_domain("x.org/path"), "x.org");
    }
}
