use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pulse_cli::{init_logging, run_demo, LogConfig, LogFormat, Pacing, RunOptions};
use pulse_core::config::{StartPolicy, StoreConfig};
use pulse_dom::controls::ControlScript;
use std::io::IsTerminal;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "pulse", version, about = "Observable store demo")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the displays and drive the store's timers.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Length of one time unit in milliseconds
    #[arg(long, default_value_t = 1000)]
    unit_ms: u64,
    /// Cheap entity refresh cadence, in units
    #[arg(long, default_value_t = 1)]
    cheap_every: u32,
    /// Expensive entity refresh cadence, in units
    #[arg(long, default_value_t = 10)]
    expensive_every: u32,
    /// Units to run for
    #[arg(long, default_value_t = 20)]
    duration: u64,
    /// Control presses, e.g. "start@0,stop@10,start@15"
    #[arg(long, default_value = "start@0")]
    script: ControlScript,
    /// Pacing of virtual time
    #[arg(long, value_enum, default_value_t = Pacing::Instant)]
    pacing: Pacing,
    /// Shorthand for --pacing realtime
    #[arg(long)]
    realtime: bool,
    /// Let a second start() stack another timer pair
    #[arg(long)]
    allow_duplicate_timers: bool,
    /// Deterministic sequential ids instead of random UUIDs
    #[arg(long)]
    seed_ids: bool,
}

impl RunArgs {
    fn into_options(self) -> RunOptions {
        let policy = if self.allow_duplicate_timers {
            StartPolicy::StackTimers
        } else {
            StartPolicy::Idempotent
        };
        RunOptions {
            config: StoreConfig::default()
                .with_unit(Duration::from_millis(self.unit_ms))
                .with_cheap_every(self.cheap_every)
                .with_expensive_every(self.expensive_every)
                .with_start_policy(policy),
            duration: self.duration,
            script: self.script,
            pacing: if self.realtime {
                Pacing::Realtime
            } else {
                self.pacing
            },
            sequential_ids: self.seed_ids,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(std::io::stderr().is_terminal());
    init_logging(&log_config).context("failed to install log subscriber")?;

    match cli.command {
        Commands::Run(args) => {
            let opts = args.into_options();
            let stdout = std::io::stdout();
            run_demo(&opts, &mut stdout.lock())?;
        }
    }
    Ok(())
}
