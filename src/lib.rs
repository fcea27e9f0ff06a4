pub mod cli;
pub mod error;
pub mod executor;
pub mod host;
pub mod platform;
pub mod size;
pub mod swap;
pub mod version;

pub use error::SwapError;

use std::io::Write;

use anyhow::{Context, Result};
use clap::CommandFactory;
use tracing::info;
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::executor::CommandExecutor;
use crate::host::{HostDescriptor, HostProbe, StaticHostProbe, SystemHostProbe};
use crate::swap::{ProvisionOutcome, ProvisionRequest, SwapProvisioner};

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .context("failed to set global default tracing subscriber")
}

/// Picks the host probe: the CLI overrides when `--platform` is set, the live system otherwise.
pub fn host_probe(args: &cli::HostArgs) -> Box<dyn HostProbe> {
    match &args.platform {
        Some(platform) => Box::new(StaticHostProbe(HostDescriptor::new(
            platform.as_str(),
            args.distribution.as_deref(),
            args.distribution_version.as_deref(),
        ))),
        None => Box::new(SystemHostProbe::default()),
    }
}

/// Resolves the host's strategy and runs the provisioning pipeline.
pub fn run_apply(
    opts: &cli::ApplyArgs,
    probe: &dyn HostProbe,
    executor: &dyn CommandExecutor,
) -> Result<ProvisionOutcome> {
    let request = ProvisionRequest::new(opts.size.clone(), opts.filepath.clone());
    let host = probe.describe().context("failed to describe host")?;
    let strategy = platform::resolve(&host);

    let outcome = SwapProvisioner::new(strategy, request, executor)
        .with_dry_run(opts.dry_run)
        .run()
        .with_context(|| format!("failed to provision swap file {}", opts.filepath))?;

    Ok(outcome)
}

/// Prints the host description and the strategy it resolves to.
pub fn run_resolve(probe: &dyn HostProbe, out: &mut dyn Write) -> Result<()> {
    let host = probe.describe().context("failed to describe host")?;
    let strategy = platform::resolve(&host);
    info!("resolved {} to {}", host.display_name(), strategy.kind());

    writeln!(out, "platform={}", host.platform_family)?;
    writeln!(out, "distribution={}", host.distribution.as_deref().unwrap_or(""))?;
    writeln!(out, "version={}", host.distribution_version.as_deref().unwrap_or(""))?;
    writeln!(out, "strategy={}", strategy.kind())?;
    Ok(())
}

/// Writes a completion script for `shell`.
pub fn run_completions(opts: &cli::CompletionsArgs, out: &mut dyn Write) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(opts.shell, &mut cmd, name, out);
}
