//! framescan-bench: TPC-H latency of DuckDB over in-memory snapshots.
//!
//! Usage:
//!   framescan-bench                                   # SF1, 10 runs, row frames, stdout
//!   framescan-bench --threads=4 --nruns=5 --out-file=out.tsv
//!   framescan-bench --representation=row-frame,columnar-batch --verbose

use clap::Parser;
use framescan_bench::{pipeline, BenchResult, Cli, RunConfig, Suite, TpchGenerator};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> BenchResult<()> {
    let config = RunConfig::try_from(Cli::parse())?;

    // stdout carries samples; logs go to stderr
    let filter = if config.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let generator = TpchGenerator::new(config.scale_factor);
    info!("TPC-H scale factor {}", generator.scale_factor());
    pipeline::run(&config, &generator, &Suite::tpch())?;
    Ok(())
}
