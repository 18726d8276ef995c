use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use parallel_pi::config::{convergence_rate, limits, PiConfig, Strategy};
use parallel_pi::{compute_coefficient, compute_pi_parallel};

#[derive(Parser)]
#[command(name = "parallel_pi")]
#[command(version, about = "Compute digits of pi with a parallel Chudnovsky series")]
struct Cli {
    /// Number of decimal digits to compute
    #[arg(short, long, default_value_t = 10_000, allow_negative_numbers = true)]
    digits: i64,

    /// Worker pool size (defaults to the available hardware parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Reduction strategy: sequential, rayon, tokio or kanal
    #[arg(short, long, default_value_t = Strategy::Rayon)]
    strategy: Strategy,

    /// Extra fractional digits carried to absorb rounding in the last places
    #[arg(long, default_value_t = limits::DEFAULT_GUARD_DIGITS)]
    guard_digits: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    let mut config = PiConfig::new(cli.digits)?
        .with_strategy(cli.strategy)
        .with_guard_digits(cli.guard_digits);
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers)?;
    }

    info!(
        "{} digits of pi using a {} term Chudnovsky series converging at {} digits/term",
        config.digits(),
        config.series_terms(),
        convergence_rate()
    );

    let start = Instant::now();
    let coefficient = compute_coefficient(&config)?;
    info!(
        "Calculating constants took {} seconds.",
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    let pi = compute_pi_parallel(&config, &coefficient)?;
    let elapsed = start.elapsed().as_secs_f64();

    println!("{}", pi.to_plain_string());
    info!(
        "Calculating pi concurrently on {} workers ({}) took {} seconds.",
        config.workers(),
        config.strategy(),
        elapsed
    );

    Ok(())
}
