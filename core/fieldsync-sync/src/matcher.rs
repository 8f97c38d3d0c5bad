//! Remote field name matching.
//!
//! Fields in a sync group are named `"<Prefix> - <Base>"`, or
//! `"<Prefix>-A<d> - <Base>"` for numbered variants where `<d>` is a single
//! digit. Only the base name is compared against the target list.

use std::collections::HashSet;

const SEPARATOR: &str = " - ";

/// Splits `remote_name` under the prefix convention.
///
/// Returns `(true, base)` when the name belongs to the `prefix` group, where
/// `base` is the raw text after the separator. Returns `(false, "")`
/// otherwise.
pub fn matches<'a>(remote_name: &'a str, prefix: &str) -> (bool, &'a str) {
    match base_name(remote_name, prefix) {
        Some(base) => (true, base),
        None => (false, ""),
    }
}

fn base_name<'a>(remote_name: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = remote_name.strip_prefix(prefix)?;

    if let Some(base) = rest.strip_prefix(SEPARATOR) {
        return Some(base);
    }

    let variant = rest.strip_prefix("-A")?;
    let mut chars = variant.chars();
    if !chars.next()?.is_ascii_digit() {
        return None;
    }
    chars.as_str().strip_prefix(SEPARATOR)
}

/// Canonical form used for base-name comparison: non-breaking spaces become
/// spaces, surrounding whitespace is trimmed, letters are lowercased.
pub fn normalize_name(name: &str) -> String {
    name.replace('\u{a0}', " ").trim().to_lowercase()
}

/// Decides which remote fields belong to a sync group.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    prefix: String,
    targets: HashSet<String>,
}

impl NameMatcher {
    /// Creates a matcher for `prefix` over the given target base names.
    pub fn new<I, S>(prefix: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefix: prefix.into(),
            targets: targets
                .into_iter()
                .map(|t| normalize_name(t.as_ref()))
                .collect(),
        }
    }

    /// Returns the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the number of distinct normalized targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Returns the normalized base name if `remote_name` is in the group and
    /// its base name is one of the targets.
    pub fn match_name(&self, remote_name: &str) -> Option<String> {
        let (candidate, base) = matches(remote_name, &self.prefix);
        if !candidate {
            return None;
        }
        let base = normalize_name(base);
        self.targets.contains(&base).then_some(base)
    }
}
