mod catalog_check;
mod dtw;
mod logging;
mod replay;
mod trace;
#[cfg(test)]
mod replay_tests;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use logging::Logger;
use signmotion::SequenceMatcherConfig;

use dtw::DtwOptions;
use replay::ReplayOptions;

#[derive(Debug, Parser)]
#[command(name = "gesture_replay")]
#[command(about = "Replays recorded hand traces through the gesture engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Replay(ReplayArgs),
    Dtw(DtwArgs),
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
struct ReplayArgs {
    trace: PathBuf,
    /// Custom catalog; the built-in one is used otherwise.
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long)]
    expect: Option<PathBuf>,
    #[arg(long = "tail-ms", default_value_t = 0)]
    tail_ms: u64,
}

#[derive(Debug, Args)]
struct DtwArgs {
    reference: PathBuf,
    live: PathBuf,
    #[arg(long)]
    start: usize,
    #[arg(long)]
    end: usize,
    #[arg(long)]
    threshold: f32,
    #[arg(long = "sample-rate", default_value_t = 30.0)]
    sample_rate_hz: f32,
    #[arg(long = "max-duration", default_value_t = 3.0)]
    max_duration_s: f32,
    #[arg(long)]
    band: Option<usize>,
}

#[derive(Debug, Args)]
struct CatalogArgs {
    path: PathBuf,
}

fn run(cli: Cli) -> Result<()> {
    let mut logger = Logger::from_env()?;

    match cli.command {
        Commands::Replay(args) => replay::run_replay(
            &mut logger,
            ReplayOptions {
                trace_path: args.trace,
                catalog_path: args.catalog,
                expect_path: args.expect,
                tail_ms: args.tail_ms,
            },
        ),
        Commands::Dtw(args) => dtw::run_dtw(
            &mut logger,
            DtwOptions {
                reference_path: args.reference,
                live_path: args.live,
                start: args.start,
                end: args.end,
                config: SequenceMatcherConfig {
                    sample_rate_hz: args.sample_rate_hz,
                    max_duration_s: args.max_duration_s,
                    threshold: args.threshold,
                    band: args.band,
                },
            },
        ),
        Commands::Catalog(args) => catalog_check::run_catalog(&mut logger, &args.path),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
