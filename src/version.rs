//! Dotted version numbers as reported by distribution probes.
//!
//! Versions such as `"6"`, `"6.5"` or `"2016.03"` are compared
//! component-wise with missing trailing components treated as zero,
//! so `"7"` and `"7.0"` are equal.

use std::cmp::Ordering;
use std::fmt;

/// A parsed dot-separated numeric version.
#[derive(Debug, Clone)]
pub struct DottedVersion {
    components: Vec<u64>,
}

impl DottedVersion {
    /// Parses a version string.
    ///
    /// Returns `None` for empty input or any component that is not a plain
    /// non-negative integer (e.g. `"7.x"`, `"rolling"`).
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let components = input
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    part.parse::<u64>().ok()
                }
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { components })
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

/// Half-open version range `[min, max)` over literal bounds.
#[derive(Debug, Clone, Copy)]
pub struct VersionRange {
    min: &'static str,
    max: &'static str,
}

impl VersionRange {
    pub const fn new(min: &'static str, max: &'static str) -> Self {
        Self { min, max }
    }

    /// Returns true if `version` parses and lies within the range.
    ///
    /// A missing or unparsable version never matches.
    pub fn contains(&self, version: Option<&str>) -> bool {
        let bounds = (DottedVersion::parse(self.min), DottedVersion::parse(self.max));
        let (Some(min), Some(max)) = bounds else {
            return false;
        };
        version
            .and_then(DottedVersion::parse)
            .is_some_and(|v| v >= min && v < max)
    }
}
