use std::collections::HashSet;

/// Extensions appended to every word by default. The empty entry keeps the bare word.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "", ".php", ".asp", ".aspx", ".jsp", ".bak", ".old", ".zip", ".tar", ".tar.gz", ".txt",
    ".log", ".conf", ".json", ".env",
];

/// Path-normalization suffixes tried after every extension by default.
pub const DEFAULT_BYPASS: &[&str] = &["", "/", "/.", ";/", "%2e/", "%2f", "/..;/", "../", "//"];

/// Expands a base word into the set of candidate paths that get requested.
///
/// For a word `w` (with trailing `/` stripped), the output contains every `w + ext`
/// and every `w + ext + bypass` for the configured lists. Both stages land in the
/// same set, so extension-only variants are kept alongside the bypass forms and
/// repeated combinations collapse.
///
/// A `VariantGenerator` holds no mutable state; one instance is shared by
/// reference between all workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantGenerator {
    extensions: Vec<String>,
    bypass: Vec<String>,
}

impl VariantGenerator {
    /// Creates a generator from explicit suffix lists.
    ///
    /// An empty list is treated as `[""]` so that every word yields at least itself.
    pub fn new(extensions: Vec<String>, bypass: Vec<String>) -> Self {
        Self {
            extensions: non_empty(extensions),
            bypass: non_empty(bypass),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn bypass(&self) -> &[String] {
        &self.bypass
    }

    /// Upper bound on the number of requests issued per word.
    pub fn max_variants_per_word(&self) -> usize {
        self.extensions.len() * (self.bypass.len() + 1)
    }

    /// Returns every candidate path for `word`.
    pub fn variants(&self, word: &str) -> HashSet<String> {
        let base = strip_trailing_separator(word);

        let with_ext: HashSet<String> = self
            .extensions
            .iter()
            .map(|ext| format!("{base}{ext}"))
            .collect();

        let mut out = HashSet::with_capacity(self.max_variants_per_word());
        for candidate in &with_ext {
            for token in &self.bypass {
                out.insert(format!("{candidate}{token}"));
            }
        }
        out.extend(with_ext);
        out
    }
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

/// Removes every trailing `/` from `word`.
pub fn strip_trailing_separator(word: &str) -> &str {
    word.trim_end_matches('/')
}

fn non_empty(list: Vec<String>) -> Vec<String> {
    if list.is_empty() {
        vec![String::new()]
    } else {
        list
    }
}
