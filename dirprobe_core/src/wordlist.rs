use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while collecting words from disk.
#[derive(Error, Debug)]
pub enum WordlistError {
    /// The wordlist path does not exist.
    #[error("Wordlist path {0:?} does not exist")]
    NotFound(PathBuf),

    /// Directory traversal failed below the wordlist root.
    #[error("Failed to walk wordlist directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A wordlist file was found but could not be read.
    #[error("Failed to read wordlist file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Collects every distinct word below `root`.
///
/// `root` may be a single file or a directory, which is walked recursively.
/// Directory symlinks are not descended into; symlinks to files are read. Every
/// line of every file is trimmed; blank lines are skipped. Bytes that are not valid
/// UTF-8 are dropped from the line rather than failing the load.
pub fn load_words(root: &Path) -> Result<HashSet<String>, WordlistError> {
    if !root.exists() {
        return Err(WordlistError::NotFound(root.to_path_buf()));
    }

    let mut words = HashSet::new();
    let mut files_read = 0usize;
    for entry in WalkDir::new(root) {
        let entry = entry?;
        let is_file = if entry.path_is_symlink() {
            entry.path().is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }
        let bytes = fs::read(entry.path()).map_err(|source| WordlistError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        collect_words(&bytes, &mut words);
        files_read += 1;
    }

    tracing::debug!(
        "loaded {} unique words from {} file(s) under {:?}",
        words.len(),
        files_read,
        root
    );
    Ok(words)
}

/// Adds the non-blank trimmed lines of `bytes` to `words`.
///
/// `\n`, `\r\n` and a bare `\r` all end a line.
pub fn collect_words(bytes: &[u8], words: &mut HashSet<String>) {
    let text = decode_ignoring_invalid(bytes);
    for line in text.split(['\n', '\r']) {
        let word = line.trim();
        if !word.is_empty() {
            words.insert(word.to_string());
        }
    }
}

fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
