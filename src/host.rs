//! Host description: platform family, distribution and version.
//!
//! [`HostProbe`] is the seam through which the resolver learns what it is
//! running on. [`SystemHostProbe`] reads the live system; [`StaticHostProbe`]
//! returns a fixed answer for CLI overrides and tests.

use std::fs;
use std::io;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::debug;

use crate::error::SwapError;

const OS_RELEASE_PATH: &str = "/etc/os-release";
const REDHAT_RELEASE_PATH: &str = "/etc/redhat-release";

static REDHAT_RELEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)\s+release\s+(?P<version>[0-9][0-9.]*)")
        .expect("redhat-release pattern is valid")
});

/// What the host says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    /// Kernel name, e.g. `Linux` or `Darwin`.
    pub platform_family: String,
    /// Normalized distribution name, e.g. `Centos`, `Centos linux`, `Ubuntu`.
    pub distribution: Option<String>,
    /// Distribution version, e.g. `6.5`.
    pub distribution_version: Option<String>,
}

impl HostDescriptor {
    pub fn new(
        platform_family: impl Into<String>,
        distribution: Option<&str>,
        distribution_version: Option<&str>,
    ) -> Self {
        Self {
            platform_family: platform_family.into(),
            distribution: non_empty(distribution),
            distribution_version: non_empty(distribution_version),
        }
    }

    /// The distribution if known and non-empty, otherwise the platform family.
    pub fn display_name(&self) -> &str {
        self.distribution
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.platform_family)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

/// Source of the [`HostDescriptor`] for one invocation.
pub trait HostProbe {
    fn describe(&self) -> Result<HostDescriptor, SwapError>;
}

/// Probe that always returns the same descriptor.
#[derive(Debug, Clone)]
pub struct StaticHostProbe(pub HostDescriptor);

impl HostProbe for StaticHostProbe {
    fn describe(&self) -> Result<HostDescriptor, SwapError> {
        Ok(self.0.clone())
    }
}

/// Probe backed by `uname(2)` and the distribution release files.
#[derive(Debug, Clone)]
pub struct SystemHostProbe {
    pub os_release: Utf8PathBuf,
    pub redhat_release: Utf8PathBuf,
}

impl Default for SystemHostProbe {
    fn default() -> Self {
        Self {
            os_release: Utf8PathBuf::from(OS_RELEASE_PATH),
            redhat_release: Utf8PathBuf::from(REDHAT_RELEASE_PATH),
        }
    }
}

impl SystemHostProbe {
    /// Reads distribution name and version from the release files.
    ///
    /// `/etc/os-release` wins; `/etc/redhat-release` covers older RHEL
    /// derivatives that predate it. Missing files are not an error.
    pub fn distribution(&self) -> Result<(Option<String>, Option<String>), SwapError> {
        if let Some(contents) = read_optional(&self.os_release)? {
            let name = os_release_field(&contents, "NAME");
            let version = os_release_field(&contents, "VERSION_ID");
            if name.is_some() {
                return Ok((name.map(|n| normalize_distribution(&n)), version));
            }
        }

        if let Some(contents) = read_optional(&self.redhat_release)? {
            if let Some(caps) = REDHAT_RELEASE_RE.captures(contents.trim()) {
                return Ok((
                    Some(normalize_distribution(&caps["name"])),
                    Some(caps["version"].to_string()),
                ));
            }
        }

        Ok((None, None))
    }
}

impl HostProbe for SystemHostProbe {
    fn describe(&self) -> Result<HostDescriptor, SwapError> {
        let uname = rustix::system::uname();
        let platform_family = uname.sysname().to_string_lossy().into_owned();
        let (distribution, distribution_version) = self.distribution()?;

        let descriptor = HostDescriptor {
            platform_family,
            distribution,
            distribution_version,
        };
        debug!(?descriptor, "described host");
        Ok(descriptor)
    }
}

fn read_optional(path: &Utf8Path) -> Result<Option<String>, SwapError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SwapError::io(format!("failed to read {}", path), e)),
    }
}

/// Extracts `KEY=value` from os-release content, stripping surrounding quotes.
fn os_release_field(contents: &str, key: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k != key {
            return None;
        }
        let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
        (!v.is_empty()).then(|| v.to_string())
    })
}

/// Normalizes a distribution name to the capitalized form used by the
/// resolution table: `CentOS Linux` → `Centos linux`, any Amazon flavour → `Amazon`.
fn normalize_distribution(name: &str) -> String {
    if name.contains("Amazon") {
        return "Amazon".to_string();
    }
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
