use std::io;

use anyhow::Result;
use swapctl::cli::{self, Commands};
use swapctl::executor::RealCommandExecutor;

fn main() -> Result<()> {
    let args = cli::parse_args()?;

    match &args.command {
        Commands::Apply(opts) => {
            swapctl::init_logging(opts.log_level)?;
            let probe = swapctl::host_probe(&opts.host);
            let executor = RealCommandExecutor {
                dry_run: opts.dry_run,
            };
            let outcome = swapctl::run_apply(opts, probe.as_ref(), &executor)?;
            println!("changed={}", outcome.changed());
        }
        Commands::Resolve(opts) => {
            swapctl::init_logging(opts.log_level)?;
            let probe = swapctl::host_probe(&opts.host);
            swapctl::run_resolve(probe.as_ref(), &mut io::stdout())?;
        }
        Commands::Completions(opts) => {
            swapctl::run_completions(opts, &mut io::stdout());
        }
    }

    Ok(())
}
