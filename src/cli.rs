use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, format, register and activate a swap file
    Apply(ApplyArgs),

    /// Show the detected host and the swap strategy it resolves to
    Resolve(ResolveArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Absolute path of the swap file
    #[arg(long)]
    pub filepath: Utf8PathBuf,

    /// Swap size such as 1G, 512M or 512000k (defaults to total memory)
    #[arg(short, long)]
    pub size: Option<String>,

    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Do not change anything, just show what would be done
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// Overrides for the detected host description.
///
/// When `--platform` is given the host is not probed at all.
#[derive(Args, Debug, Default, Clone)]
pub struct HostArgs {
    /// Platform family to assume instead of probing (e.g. Linux)
    #[arg(long)]
    pub platform: Option<String>,

    /// Distribution name to assume (e.g. Centos, Ubuntu)
    #[arg(long, requires = "platform")]
    pub distribution: Option<String>,

    /// Distribution version to assume (e.g. 6.5)
    #[arg(long, requires = "platform")]
    pub distribution_version: Option<String>,
}

/// Represents log levels for controlling the verbosity of logging output.
///
/// This enum maps directly to the log levels used by the `tracing` crate.
/// Specifying `--log-level debug` shows every host observation each step
/// makes before deciding whether to act.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}
