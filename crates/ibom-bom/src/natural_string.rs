use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Reference designator with natural ordering (R2 < R9 < R10).
///
/// Digit runs compare numerically and letters case-insensitively; the raw
/// string breaks remaining ties so the order stays total.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NaturalString(String);

impl NaturalString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading run of ASCII capitals, e.g. `SW` for `SW12`.
    pub fn prefix(&self) -> &str {
        let end = self
            .0
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl From<String> for NaturalString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NaturalString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for NaturalString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NaturalString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for NaturalString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NaturalString {
    fn cmp(&self, other: &Self) -> Ordering {
        natord::compare_ignore_case(&self.0, &other.0).then_with(|| self.0.cmp(&other.0))
    }
}
