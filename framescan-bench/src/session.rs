//! DuckDB session handles and the factory that opens them.
//!
//! Every session is its own in-memory database, so thread limits, loaded
//! extensions and registered frames never leak between sessions.

use crate::frames::scan::{FrameCatalog, FrameScan, FRAME_SCAN_FUNCTION};
use crate::{BenchError, BenchResult};
use duckdb::arrow::datatypes::SchemaRef;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::Connection;
use tracing::{debug, info};

/// Opens independent sessions, applying the configured thread limit to each.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFactory {
    threads: Option<usize>,
}

impl SessionFactory {
    pub fn new(threads: Option<usize>) -> Self {
        Self { threads }
    }

    pub fn open_session(&self) -> BenchResult<Session> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BenchError::Setup(format!("DuckDB open: {}", e)))?;

        if let Some(threads) = self.threads {
            info!("Limiting threads to {}", threads);
            conn.execute_batch(&format!("SET threads = {};", threads))
                .map_err(|e| BenchError::Setup(format!("DuckDB config: {}", e)))?;
        }

        Session::new(conn)
    }
}

/// One engine instance. Closed when dropped.
pub struct Session {
    conn: Connection,
    frames: FrameCatalog,
}

impl Session {
    fn new(conn: Connection) -> BenchResult<Self> {
        let frames = FrameCatalog::default();
        conn.register_table_function_with_extra_info::<FrameScan, FrameCatalog>(
            FRAME_SCAN_FUNCTION,
            &frames,
        )
        .map_err(|e| BenchError::Setup(format!("register {}: {}", FRAME_SCAN_FUNCTION, e)))?;
        Ok(Self { conn, frames })
    }

    pub fn execute_batch(&self, sql: &str) -> duckdb::Result<()> {
        self.conn.execute_batch(sql)
    }

    /// Run `sql` and collect the full result set as Arrow batches.
    ///
    /// Errors raised while the statement executes are returned here. duckdb's
    /// Arrow iterator ends without an error if fetching a later batch of an
    /// already materialized result fails, so such a result would come back
    /// short rather than as `Err`.
    pub fn query_batches(&self, sql: &str) -> duckdb::Result<Vec<RecordBatch>> {
        let mut stmt = self.conn.prepare(sql)?;
        let batches = stmt.query_arrow([])?.collect();
        Ok(batches)
    }

    /// Like [`Session::query_batches`], but also returns the result schema so
    /// empty results keep their column types.
    pub fn query_table(&self, sql: &str) -> duckdb::Result<(SchemaRef, Vec<RecordBatch>)> {
        let mut stmt = self.conn.prepare(sql)?;
        let arrow = stmt.query_arrow([])?;
        let schema = arrow.get_schema();
        Ok((schema, arrow.collect()))
    }

    pub fn load_extensions(&self, extensions: &[String]) -> BenchResult<()> {
        for ext in extensions {
            debug!("Loading extension {}", ext);
            self.conn
                .execute_batch(&format!("LOAD {};", ext))
                .map_err(|e| BenchError::Setup(format!("load extension {}: {}", ext, e)))?;
        }
        Ok(())
    }

    /// The effective `threads` setting of this session.
    pub fn threads(&self) -> BenchResult<i64> {
        self.conn
            .query_row("SELECT current_setting('threads')", [], |row| row.get(0))
            .map_err(|e| BenchError::Setup(format!("read threads setting: {}", e)))
    }

    pub(crate) fn frames(&self) -> &FrameCatalog {
        &self.frames
    }
}
