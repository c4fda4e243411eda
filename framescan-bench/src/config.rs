//! Command line and run configuration.

use crate::frames::Representation;
use crate::{BenchError, BenchResult};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "framescan-bench",
    about = "TPC-H latency of DuckDB scanning in-memory row frames and columnar batches"
)]
pub struct Cli {
    /// Log phases plus each benchmark name and query text (stderr).
    #[arg(long)]
    pub verbose: bool,

    /// Worker threads per session; engine default when omitted.
    #[arg(long)]
    pub threads: Option<usize>,

    /// Repetitions of every query.
    #[arg(long, default_value = "10")]
    pub nruns: usize,

    /// Write samples to this file instead of stdout.
    #[arg(long)]
    pub out_file: Option<PathBuf>,

    /// TPC-H scale factor.
    #[arg(long, default_value = "1")]
    pub scale_factor: f64,

    /// Representations to benchmark, in order (comma-separated).
    #[arg(long, value_enum, value_delimiter = ',', default_value = "row-frame")]
    pub representation: Vec<Representation>,
}

/// Validated, read-only settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub verbose: bool,
    pub threads: Option<usize>,
    pub nruns: usize,
    pub out_file: Option<PathBuf>,
    pub scale_factor: f64,
    pub representations: Vec<Representation>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            threads: None,
            nruns: 10,
            out_file: None,
            scale_factor: 1.0,
            representations: vec![Representation::RowFrame],
        }
    }
}

impl TryFrom<Cli> for RunConfig {
    type Error = BenchError;

    fn try_from(cli: Cli) -> BenchResult<Self> {
        if cli.nruns == 0 {
            return Err(BenchError::Config("--nruns must be at least 1".into()));
        }
        if cli.threads == Some(0) {
            return Err(BenchError::Config("--threads must be at least 1".into()));
        }
        if !(cli.scale_factor.is_finite() && cli.scale_factor > 0.0) {
            return Err(BenchError::Config(format!(
                "--scale-factor must be positive, got {}",
                cli.scale_factor
            )));
        }
        for (i, repr) in cli.representation.iter().enumerate() {
            if cli.representation[..i].contains(repr) {
                return Err(BenchError::Config(format!(
                    "--representation lists {} twice",
                    repr
                )));
            }
        }

        Ok(Self {
            verbose: cli.verbose,
            threads: cli.threads,
            nruns: cli.nruns,
            out_file: cli.out_file,
            scale_factor: cli.scale_factor,
            representations: cli.representation,
        })
    }
}

impl RunConfig {
    pub fn from_args<I, T>(args: I) -> BenchResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| BenchError::Config(e.to_string()))?;
        Self::try_from(cli)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::from_args(["framescan-bench"]).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_equals_style_flags() {
        let config = RunConfig::from_args([
            "framescan-bench",
            "--verbose",
            "--threads=4",
            "--nruns=3",
            "--out-file=out.tsv",
            "--scale-factor=0.1",
            "--representation=columnar-batch,row-frame",
        ])
        .unwrap();
        assert!(config.verbose);
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.nruns, 3);
        assert_eq!(config.out_file, Some(PathBuf::from("out.tsv")));
        assert_eq!(config.scale_factor, 0.1);
        assert_eq!(
            config.representations,
            vec![Representation::ColumnarBatch, Representation::RowFrame]
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        for bad in [
            "--nruns=0",
            "--threads=0",
            "--threads=many",
            "--scale-factor=0",
            "--scale-factor=-1",
            "--representation=row-frame,row-frame",
            "--representation=parquet",
        ] {
            let result = RunConfig::from_args(["framescan-bench", bad]);
            assert!(matches!(result, Err(BenchError::Config(_))), "{} accepted", bad);
        }
    }
}
