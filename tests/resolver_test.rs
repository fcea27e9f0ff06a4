//! Tests for platform resolution.

use swapctl::host::HostDescriptor;
use swapctl::platform::{StrategyKind, resolve, resolve_kind};
use swapctl::swap::Strategy;

fn host(family: &str, distribution: Option<&str>, version: Option<&str>) -> HostDescriptor {
    HostDescriptor::new(family, distribution, version)
}

#[test]
fn test_resolution_table() {
    let cases = [
        (host("Linux", Some("Centos"), Some("6")), StrategyKind::Generic),
        (host("Linux", Some("Centos"), Some("6.5")), StrategyKind::Generic),
        (host("Linux", Some("Centos"), Some("5")), StrategyKind::LegacyDd),
        (host("Linux", Some("Centos"), Some("5.11")), StrategyKind::LegacyDd),
        (host("Linux", Some("Centos linux"), Some("7.2.1511")), StrategyKind::LegacyDd),
        (host("Linux", Some("Centos linux"), None), StrategyKind::LegacyDd),
        (host("Linux", Some("Amazon"), Some("2016.03")), StrategyKind::Generic),
        (host("Linux", Some("Amazon"), None), StrategyKind::Generic),
        (host("Linux", Some("Ubuntu"), Some("14.04")), StrategyKind::Generic),
        (host("Linux", Some("Ubuntu"), Some("rolling")), StrategyKind::Generic),
        (host("Linux", Some("Debian"), Some("8")), StrategyKind::Unsupported),
        (host("Linux", None, None), StrategyKind::Unsupported),
        (host("Darwin", None, Some("14.5.0")), StrategyKind::Unsupported),
    ];

    for (descriptor, expected) in cases {
        assert_eq!(resolve_kind(&descriptor), expected, "unexpected strategy for {:?}", descriptor);
        assert_eq!(resolve(&descriptor).kind(), expected);
    }
}

#[test]
fn test_centos_version_boundaries() {
    let centos = |version: &str| resolve_kind(&host("Linux", Some("Centos"), Some(version)));

    assert_eq!(centos("6.99"), StrategyKind::Generic);
    assert_eq!(centos("7.0"), StrategyKind::Unsupported);
    assert_eq!(centos("5.0"), StrategyKind::LegacyDd);
    assert_eq!(centos("4.9"), StrategyKind::Unsupported);
}

#[test]
fn test_centos_without_usable_version_is_unsupported() {
    assert_eq!(
        resolve_kind(&host("Linux", Some("Centos"), None)),
        StrategyKind::Unsupported
    );
    assert_eq!(
        resolve_kind(&host("Linux", Some("Centos"), Some("six"))),
        StrategyKind::Unsupported
    );
}

#[test]
fn test_distribution_match_is_exact() {
    for name in ["centos", "CentOS", "ubuntu", "Amazon Linux"] {
        assert_eq!(
            resolve_kind(&host("Linux", Some(name), Some("6.5"))),
            StrategyKind::Unsupported,
            "{name:?} should not match"
        );
    }
}

#[test]
fn test_unsupported_names_distribution_or_platform() {
    assert_eq!(
        resolve(&host("Linux", Some("Gentoo"), None)),
        Strategy::Unsupported {
            name: "Gentoo".to_string()
        }
    );
    assert_eq!(
        resolve(&host("Darwin", None, None)),
        Strategy::Unsupported {
            name: "Darwin".to_string()
        }
    );
}

#[test]
fn test_unsupported_error_message() {
    let err = resolve(&host("Darwin", None, None))
        .ensure_supported()
        .unwrap_err();
    assert_eq!(err.to_string(), "swap module cannot be used on Darwin");
}

#[test]
fn test_empty_distribution_names_platform() {
    let strategy = resolve(&host("Linux", Some(""), None));
    assert_eq!(
        strategy,
        Strategy::Unsupported {
            name: "Linux".to_string()
        }
    );
    assert_eq!(
        strategy.ensure_supported().unwrap_err().to_string(),
        "swap module cannot be used on Linux"
    );
}
