//! Platform resolution: picks the swap strategy for a host.
//!
//! Resolution is an ordered table of `(family, distribution, version)`
//! rules; the first matching rule wins and anything unmatched resolves to
//! [`Strategy::Unsupported`]. Resolving never fails by itself. The
//! unsupported strategy reports the error the first time it is used.

use strum::Display;
use tracing::debug;

use crate::host::HostDescriptor;
use crate::swap::Strategy;
use crate::version::VersionRange;

/// The closed set of provisioning strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum StrategyKind {
    /// Extent-based allocation with `fallocate`.
    Generic,
    /// Zero-filled allocation with `dd`.
    LegacyDd,
    /// Every operation fails.
    Unsupported,
}

/// Version predicate of a resolution rule.
#[derive(Debug, Clone, Copy)]
enum VersionMatch {
    Any,
    Within(VersionRange),
}

struct Rule {
    family: &'static str,
    distribution: &'static str,
    version: VersionMatch,
    kind: StrategyKind,
}

// Order matters: first match wins.
const RULES: &[Rule] = &[
    Rule {
        family: "Linux",
        distribution: "Centos",
        version: VersionMatch::Within(VersionRange::new("6", "7")),
        kind: StrategyKind::Generic,
    },
    Rule {
        family: "Linux",
        distribution: "Centos",
        version: VersionMatch::Within(VersionRange::new("5", "6")),
        kind: StrategyKind::LegacyDd,
    },
    // Version 7 hosts report "Centos linux" and get the zero-fill path.
    Rule {
        family: "Linux",
        distribution: "Centos linux",
        version: VersionMatch::Any,
        kind: StrategyKind::LegacyDd,
    },
    Rule {
        family: "Linux",
        distribution: "Amazon",
        version: VersionMatch::Any,
        kind: StrategyKind::Generic,
    },
    Rule {
        family: "Linux",
        distribution: "Ubuntu",
        version: VersionMatch::Any,
        kind: StrategyKind::Generic,
    },
];

impl Rule {
    fn matches(&self, host: &HostDescriptor) -> bool {
        host.platform_family == self.family
            && host.distribution.as_deref() == Some(self.distribution)
            && match self.version {
                VersionMatch::Any => true,
                VersionMatch::Within(range) => {
                    range.contains(host.distribution_version.as_deref())
                }
            }
    }
}

/// Returns the strategy kind for a host.
pub fn resolve_kind(host: &HostDescriptor) -> StrategyKind {
    RULES
        .iter()
        .find(|rule| rule.matches(host))
        .map_or(StrategyKind::Unsupported, |rule| rule.kind)
}

/// Resolves the strategy bound to a host for this invocation.
pub fn resolve(host: &HostDescriptor) -> Strategy {
    let kind = resolve_kind(host);
    debug!(
        platform = %host.platform_family,
        distribution = host.distribution.as_deref().unwrap_or("-"),
        version = host.distribution_version.as_deref().unwrap_or("-"),
        strategy = %kind,
        "resolved swap strategy"
    );
    match kind {
        StrategyKind::Generic => Strategy::Generic,
        StrategyKind::LegacyDd => Strategy::LegacyDd,
        StrategyKind::Unsupported => Strategy::Unsupported {
            name: host.display_name().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux(distribution: &str, version: Option<&str>) -> HostDescriptor {
        HostDescriptor::new("Linux", Some(distribution), version)
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(StrategyKind::Generic.to_string(), "generic");
        assert_eq!(StrategyKind::LegacyDd.to_string(), "legacy-dd");
        assert_eq!(StrategyKind::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_centos_version_ranges() {
        assert_eq!(resolve_kind(&linux("Centos", Some("6.5"))), StrategyKind::Generic);
        assert_eq!(resolve_kind(&linux("Centos", Some("5.11"))), StrategyKind::LegacyDd);
        assert_eq!(resolve_kind(&linux("Centos", Some("7"))), StrategyKind::Unsupported);
        assert_eq!(resolve_kind(&linux("Centos", None)), StrategyKind::Unsupported);
    }

    #[test]
    fn test_unsupported_carries_display_name() {
        let host = HostDescriptor::new("Darwin", None, Some("14.5"));
        assert_eq!(
            resolve(&host),
            Strategy::Unsupported {
                name: "Darwin".to_string()
            }
        );
    }

    #[test]
    fn test_family_must_match() {
        let host = HostDescriptor::new("FreeBSD", Some("Ubuntu"), Some("14.04"));
        assert_eq!(resolve_kind(&host), StrategyKind::Unsupported);
    }
}
