//! Swap file provisioning.
//!
//! This module provides the [`Strategy`] enum, the closed set of
//! platform-specific behaviours chosen by [`crate::platform::resolve`], and
//! [`SwapProvisioner`], which drives the four idempotent steps:
//!
//! 1. **create** the file (`fallocate` or `dd`), then `chmod 0600`
//! 2. **format** it with `mkswap` unless `file` already reports a swap file
//! 3. **register** it in `/etc/fstab` unless a line already starts with the path
//! 4. **activate** it with `swapon` unless `/proc/swaps` already lists it
//!
//! Each step re-observes host state immediately before acting, so the whole
//! pipeline can be re-run safely after a failure or an out-of-band change.

mod files;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::error::SwapError;
use crate::executor::{CommandExecutor, CommandSpec, ExecutionResult};
use crate::platform::StrategyKind;
use crate::size::{self, BLOCK_SIZE};

const FALLOCATE_CMD: &str = "/usr/bin/fallocate";
const DD_CMD: &str = "/bin/dd";
const FILE_CMD: &str = "/usr/bin/file";
const MKSWAP_CMD: &str = "/sbin/mkswap";
const SWAPON_CMD: &str = "/sbin/swapon";

/// Marker in brief (`file -b`) output identifying a formatted swap area.
const SWAP_SIGNATURE: &str = "swap file";

/// Platform-specific provisioning behaviour.
///
/// Only the allocation step differs between the supported variants; the
/// unsupported variant fails every step before touching the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Extent-based allocation with `fallocate -l <size>`.
    Generic,
    /// Zero-filled allocation with `dd` in 1 MiB blocks.
    LegacyDd,
    /// No provisioning is possible on this host.
    Unsupported {
        /// Distribution name, or platform family when the distribution is unknown.
        name: String,
    },
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Generic => StrategyKind::Generic,
            Self::LegacyDd => StrategyKind::LegacyDd,
            Self::Unsupported { .. } => StrategyKind::Unsupported,
        }
    }

    /// Fails with [`SwapError::UnsupportedPlatform`] for the unsupported variant.
    pub fn ensure_supported(&self) -> Result<(), SwapError> {
        match self {
            Self::Generic | Self::LegacyDd => Ok(()),
            Self::Unsupported { name } => Err(SwapError::UnsupportedPlatform { name: name.clone() }),
        }
    }

    /// Builds the command that allocates `size` bytes at `filepath`.
    pub fn allocation_command(
        &self,
        size: &str,
        filepath: &Utf8Path,
    ) -> Result<CommandSpec, SwapError> {
        match self {
            Self::Generic => Ok(CommandSpec::new(
                FALLOCATE_CMD,
                vec!["-l".to_string(), size.to_string(), filepath.to_string()],
            )),
            Self::LegacyDd => {
                let bytes = size::parse_size(size)?;
                let count = size::block_count(bytes);
                debug!(size, bytes, count, "computed zero-fill block count");
                Ok(CommandSpec::new(
                    DD_CMD,
                    vec![
                        "if=/dev/zero".to_string(),
                        format!("of={}", filepath),
                        format!("bs={}", BLOCK_SIZE),
                        format!("count={}", count),
                    ],
                ))
            }
            Self::Unsupported { name } => {
                Err(SwapError::UnsupportedPlatform { name: name.clone() })
            }
        }
    }
}

/// `file -b` prints the type without the leading path.
fn file_type_command(filepath: &Utf8Path) -> CommandSpec {
    CommandSpec::new(FILE_CMD, vec!["-b".to_string(), filepath.to_string()]).read_only()
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    /// Human-readable size (`"1G"`, `"512000k"`); derived from memory when absent.
    pub size: Option<String>,
    /// Absolute path of the swap file.
    pub filepath: Utf8PathBuf,
}

impl ProvisionRequest {
    pub fn new(size: Option<String>, filepath: impl Into<Utf8PathBuf>) -> Self {
        Self {
            size,
            filepath: filepath.into(),
        }
    }

    /// Validates the request before any host state is touched.
    pub fn validate(&self) -> Result<(), SwapError> {
        if self.filepath.as_str().trim().is_empty() {
            return Err(SwapError::Validation("filepath must not be empty".to_string()));
        }
        if !self.filepath.is_absolute() {
            return Err(SwapError::Validation(format!(
                "filepath must be absolute: {}",
                self.filepath
            )));
        }
        if let Some(size) = &self.size {
            if size.trim().is_empty() {
                return Err(SwapError::Validation("size must not be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Host files the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct SwapPaths {
    /// Persistent mount table.
    pub fstab: Utf8PathBuf,
    /// Live list of active swap areas.
    pub proc_swaps: Utf8PathBuf,
    /// Memory information used to derive the default size.
    pub meminfo: Utf8PathBuf,
}

impl Default for SwapPaths {
    fn default() -> Self {
        Self {
            fstab: Utf8PathBuf::from("/etc/fstab"),
            proc_swaps: Utf8PathBuf::from("/proc/swaps"),
            meminfo: Utf8PathBuf::from("/proc/meminfo"),
        }
    }
}

/// Per-step results of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionOutcome {
    pub created: bool,
    pub formatted: bool,
    pub registered: bool,
    pub activated: bool,
}

impl ProvisionOutcome {
    /// True if any step altered host state.
    pub fn changed(&self) -> bool {
        self.created || self.formatted || self.registered || self.activated
    }
}

/// Runs the swap provisioning pipeline through a bound [`Strategy`].
pub struct SwapProvisioner<'a> {
    strategy: Strategy,
    request: ProvisionRequest,
    executor: &'a dyn CommandExecutor,
    paths: SwapPaths,
    dry_run: bool,
}

impl<'a> SwapProvisioner<'a> {
    pub fn new(
        strategy: Strategy,
        request: ProvisionRequest,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            strategy,
            request,
            executor,
            paths: SwapPaths::default(),
            dry_run: false,
        }
    }

    /// Overrides the host file locations.
    #[must_use]
    pub fn with_paths(mut self, paths: SwapPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Logs file mutations instead of performing them.
    ///
    /// Commands are still handed to the executor, which decides whether to run them.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    fn filepath(&self) -> &Utf8Path {
        &self.request.filepath
    }

    /// Runs all four steps in order.
    ///
    /// Every step runs even when earlier ones report no change; the first
    /// error aborts the rest.
    /// The request is validated before the strategy is checked, so a bad
    /// request is reported as such on every host.
    pub fn run(&self) -> Result<ProvisionOutcome, SwapError> {
        self.request.validate()?;
        self.strategy.ensure_supported()?;

        info!(
            filepath = %self.filepath(),
            strategy = %self.strategy.kind(),
            "provisioning swap file"
        );

        let outcome = ProvisionOutcome {
            created: self.create_swapfile()?,
            formatted: self.make_swap()?,
            registered: self.register_fstab()?,
            activated: self.activate_swap()?,
        };

        info!(changed = outcome.changed(), "swap provisioning finished");
        Ok(outcome)
    }

    /// Step 1: allocates the swap file if it does not exist yet.
    pub fn create_swapfile(&self) -> Result<bool, SwapError> {
        self.strategy.ensure_supported()?;
        let filepath = self.filepath();

        if filepath.exists() {
            debug!("swap file already exists: {}", filepath);
            return Ok(false);
        }

        let size = match &self.request.size {
            Some(size) => size.clone(),
            None => {
                let size = size::memory_size(&self.paths.meminfo)?;
                debug!(size = %size, "derived swap size from total memory");
                size
            }
        };

        let spec = self.strategy.allocation_command(&size, filepath)?;
        self.run_checked(&spec)?;

        if self.dry_run {
            info!("dry run: would chmod {:o} {}", files::SWAPFILE_MODE, filepath);
        } else {
            files::set_file_mode(filepath, files::SWAPFILE_MODE)?;
        }

        info!(size = %size, "created swap file {}", filepath);
        Ok(true)
    }

    /// Step 2: formats the file as swap unless it already is.
    pub fn make_swap(&self) -> Result<bool, SwapError> {
        self.strategy.ensure_supported()?;
        let filepath = self.filepath();

        let result = self.run_checked(&file_type_command(filepath))?;
        if result.stdout.contains(SWAP_SIGNATURE) {
            debug!("already formatted as swap: {}", filepath);
            return Ok(false);
        }

        self.run_checked(&CommandSpec::new(MKSWAP_CMD, vec![filepath.to_string()]))?;
        info!("formatted swap file {}", filepath);
        Ok(true)
    }

    /// Step 3: registers the file in the persistent mount table.
    pub fn register_fstab(&self) -> Result<bool, SwapError> {
        self.strategy.ensure_supported()?;
        let filepath = self.filepath();
        let fstab = &self.paths.fstab;

        if files::table_has_entry(fstab, filepath.as_str(), true)? {
            debug!("{} already has an entry for {}", fstab, filepath);
            return Ok(false);
        }

        if self.dry_run {
            info!("dry run: would append to {}: {}", fstab, files::fstab_entry(filepath).trim_end());
        } else {
            files::append_fstab_entry(fstab, filepath)?;
            info!("registered {} in {}", filepath, fstab);
        }
        Ok(true)
    }

    /// Step 4: activates the swap file unless the kernel already uses it.
    pub fn activate_swap(&self) -> Result<bool, SwapError> {
        self.strategy.ensure_supported()?;
        let filepath = self.filepath();

        if files::table_has_entry(&self.paths.proc_swaps, filepath.as_str(), false)? {
            debug!("swap already active: {}", filepath);
            return Ok(false);
        }

        self.run_checked(&CommandSpec::new(SWAPON_CMD, vec![filepath.to_string()]))?;
        info!("activated swap file {}", filepath);
        Ok(true)
    }

    /// Executes a command, turning a non-zero exit into [`SwapError::CommandFailed`].
    fn run_checked(&self, spec: &CommandSpec) -> Result<ExecutionResult, SwapError> {
        let result = self.executor.execute(spec).map_err(|e| match e.downcast::<SwapError>() {
            Ok(typed) => typed,
            Err(other) => SwapError::Execution {
                command: spec.command.clone(),
                status: format!("{:#}", other),
            },
        })?;

        if !result.success() {
            return Err(SwapError::CommandFailed {
                command: spec.command.clone(),
                code: result.code().unwrap_or(-1),
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }
}
