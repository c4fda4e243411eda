//! Dataset generators: populate a source session with named tables.

use crate::session::Session;
use crate::{BenchError, BenchResult};
use tracing::info;

/// TPC-H tables in registration order.
pub const TPCH_TABLES: [&str; 8] = [
    "customer", "lineitem", "nation", "orders", "part", "partsupp", "region", "supplier",
];

pub trait DatasetGenerator {
    fn name(&self) -> &str;

    /// Tables `generate` creates, in the order they should be materialized.
    fn tables(&self) -> &[String];

    fn generate(&self, session: &Session) -> BenchResult<()>;
}

// ────────────────────────────────────────────────────────────────────────────────
// TPC-H via the engine's dbgen
// ────────────────────────────────────────────────────────────────────────────────

pub struct TpchGenerator {
    scale_factor: f64,
    tables: Vec<String>,
}

impl TpchGenerator {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            tables: TPCH_TABLES.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }
}

impl DatasetGenerator for TpchGenerator {
    fn name(&self) -> &str {
        "TPC-H"
    }

    fn tables(&self) -> &[String] {
        &self.tables
    }

    fn generate(&self, session: &Session) -> BenchResult<()> {
        info!("Generating TPC-H data (sf={})", self.scale_factor);
        session
            .execute_batch("INSTALL tpch; LOAD tpch;")
            .map_err(|e| BenchError::Setup(format!("load tpch: {}", e)))?;
        session
            .execute_batch(&format!("CALL dbgen(sf = {});", self.scale_factor))
            .map_err(|e| BenchError::Setup(format!("dbgen: {}", e)))?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// SQL script
// ────────────────────────────────────────────────────────────────────────────────

/// Populates tables by running a SQL script, e.g. small fixed datasets.
pub struct ScriptGenerator {
    script: String,
    tables: Vec<String>,
}

impl ScriptGenerator {
    pub fn new<I, S>(script: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: script.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

impl DatasetGenerator for ScriptGenerator {
    fn name(&self) -> &str {
        "script"
    }

    fn tables(&self) -> &[String] {
        &self.tables
    }

    fn generate(&self, session: &Session) -> BenchResult<()> {
        info!("Generating data from script ({} tables)", self.tables.len());
        session
            .execute_batch(&self.script)
            .map_err(|e| BenchError::Setup(format!("generator script: {}", e)))
    }
}
