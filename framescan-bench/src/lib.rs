//! Shared types, error handling and the measurement pipeline for framescan-bench.
//!
//! The harness generates a dataset once, snapshots every table into an
//! in-memory representation, binds the snapshots into fresh DuckDB sessions
//! and times a fixed query suite against them:
//!
//! ```text
//! generator -> materialize -> register -> run_suite -> sink
//! ```

pub mod config;
pub mod frames;
pub mod generator;
pub mod pipeline;
pub mod runner;
pub mod session;
pub mod sink;
pub mod suite;

pub use config::{Cli, RunConfig};
pub use frames::{materialize, register, FrameSet, MaterializedTable, Representation};
pub use generator::{DatasetGenerator, ScriptGenerator, TpchGenerator, TPCH_TABLES};
pub use runner::{run_suite, SuiteRun};
pub use session::{Session, SessionFactory};
pub use sink::{OutputSink, ResultSink};
pub use suite::{benchmark_name, Suite, SuiteEntry};

// ────────────────────────────────────────────────────────────────────────────────
// Error type
// ────────────────────────────────────────────────────────────────────────────────

pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// Every failure is fatal to the run; the variants only say which phase died.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("setup error: {0}")]
    Setup(String),
    #[error("registration error: {0}")]
    Registration(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("sink error: {0}")]
    Sink(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ────────────────────────────────────────────────────────────────────────────────
// Benchmark output types
// ────────────────────────────────────────────────────────────────────────────────

/// One timed repetition of one suite entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub name: String,
    pub repetition: usize,
    pub elapsed_secs: f64,
}
