use std::collections::BTreeSet;
use std::fmt;

/// Status codes the result file always captures unless configured otherwise.
pub const DEFAULT_SAVE_CODES: &[u16] = &[200, 302, 401, 403];

/// Decides which outcomes are printed or saved, keyed on the HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Matches every status code.
    #[default]
    All,
    /// Matches only the listed codes.
    Only(BTreeSet<u16>),
}

impl StatusPolicy {
    pub fn only<I: IntoIterator<Item = u16>>(codes: I) -> Self {
        StatusPolicy::Only(codes.into_iter().collect())
    }

    pub fn default_save() -> Self {
        Self::only(DEFAULT_SAVE_CODES.iter().copied())
    }

    /// Parses a comma separated list such as `"200, 403"`.
    ///
    /// Entries that are not plain integers are skipped. An input with no usable
    /// entry yields [`StatusPolicy::All`].
    pub fn parse_list(raw: &str) -> Self {
        let codes: BTreeSet<u16> = raw
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|c| c.parse().ok())
            .collect();
        if codes.is_empty() {
            StatusPolicy::All
        } else {
            StatusPolicy::Only(codes)
        }
    }

    pub fn matches(&self, status: u16) -> bool {
        match self {
            StatusPolicy::All => true,
            StatusPolicy::Only(codes) => codes.contains(&status),
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusPolicy::All => write!(f, "ALL"),
            StatusPolicy::Only(codes) => {
                let list: Vec<String> = codes.iter().map(u16::to_string).collect();
                write!(f, "[{}]", list.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_everything() {
        let policy = StatusPolicy::All;
        assert!(policy.matches(200));
        assert!(policy.matches(599));
        assert!(policy.matches(0));
    }

    #[test]
    fn parse_list_keeps_numeric_entries() {
        let policy = StatusPolicy::parse_list(" 200,403 ,abc,,-1,4x4");
        assert_eq!(policy, StatusPolicy::only([200, 403]));
        assert!(policy.matches(403));
        assert!(!policy.matches(302));
    }

    #[test]
    fn parse_list_without_codes_is_all() {
        assert_eq!(StatusPolicy::parse_list(""), StatusPolicy::All);
        assert_eq!(StatusPolicy::parse_list("  "), StatusPolicy::All);
        assert_eq!(StatusPolicy::parse_list("foo,bar"), StatusPolicy::All);
    }

    #[test]
    fn default_save_policy() {
        let policy = StatusPolicy::default_save();
        for code in [200, 302, 401, 403] {
            assert!(policy.matches(code));
        }
        assert!(!policy.matches(404));
        assert!(!policy.matches(500));
        assert_eq!(policy.to_string(), "[200, 302, 401, 403]");
    }
}
