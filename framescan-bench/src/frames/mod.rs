//! In-memory table snapshots and their binding into sessions.
//!
//! A snapshot is taken once per representation and never mutated, so the same
//! [`FrameSet`] can be bound into any number of sessions.

pub mod columnar;
pub mod row_frame;
pub(crate) mod scan;

pub use columnar::ColumnarBatch;
pub use row_frame::RowFrame;

use crate::session::Session;
use crate::{BenchError, BenchResult};
use duckdb::arrow::datatypes::SchemaRef;
use duckdb::arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tracing::{debug, info};

/// Rows handed to DuckDB per scan call; one standard vector.
pub const SCAN_CHUNK_ROWS: usize = 2048;

// ────────────────────────────────────────────────────────────────────────────────
// Representation
// ────────────────────────────────────────────────────────────────────────────────

/// How a snapshot is held in memory while the engine scans it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Representation {
    /// Row-major encoded rows, decoded into columns on every scan.
    RowFrame,
    /// Arrow record batches, handed to the engine as-is.
    ColumnarBatch,
}

impl Representation {
    /// Benchmark name prefix; kept compatible with existing result archives.
    pub fn name_prefix(self) -> &'static str {
        match self {
            Self::RowFrame => "pandas_",
            Self::ColumnarBatch => "arrow_",
        }
    }
}

impl std::fmt::Display for Representation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowFrame => write!(f, "row-frame"),
            Self::ColumnarBatch => write!(f, "columnar-batch"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Materialized tables
// ────────────────────────────────────────────────────────────────────────────────

pub enum MaterializedTable {
    RowFrame(RowFrame),
    ColumnarBatch(ColumnarBatch),
}

impl MaterializedTable {
    pub fn build(
        representation: Representation,
        schema: SchemaRef,
        batches: Vec<RecordBatch>,
    ) -> BenchResult<Self> {
        Ok(match representation {
            Representation::RowFrame => Self::RowFrame(RowFrame::from_batches(schema, &batches)?),
            Representation::ColumnarBatch => {
                Self::ColumnarBatch(ColumnarBatch::new(schema, batches))
            }
        })
    }

    pub fn representation(&self) -> Representation {
        match self {
            Self::RowFrame(_) => Representation::RowFrame,
            Self::ColumnarBatch(_) => Representation::ColumnarBatch,
        }
    }

    pub fn schema(&self) -> SchemaRef {
        match self {
            Self::RowFrame(t) => t.schema(),
            Self::ColumnarBatch(t) => t.schema(),
        }
    }

    pub fn num_rows(&self) -> usize {
        match self {
            Self::RowFrame(t) => t.num_rows(),
            Self::ColumnarBatch(t) => t.num_rows(),
        }
    }

    /// The `index`-th scan chunk, at most [`SCAN_CHUNK_ROWS`] rows, or `None`
    /// past the end.
    pub fn chunk(&self, index: usize) -> BenchResult<Option<RecordBatch>> {
        match self {
            Self::RowFrame(t) => t.chunk(index),
            Self::ColumnarBatch(t) => Ok(t.chunk(index).cloned()),
        }
    }
}

/// Snapshots keyed by table name, in declaration order.
#[derive(Default, Clone)]
pub struct FrameSet {
    tables: Vec<(String, Arc<MaterializedTable>)>,
}

impl FrameSet {
    pub fn insert(&mut self, name: impl Into<String>, table: MaterializedTable) {
        let name = name.into();
        let table = Arc::new(table);
        match self.tables.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = table,
            None => self.tables.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<MaterializedTable>> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<MaterializedTable>)> {
        self.tables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────────
// Materializer / registrar
// ────────────────────────────────────────────────────────────────────────────────

/// Read every table out of `source` into standalone snapshots.
///
/// Tables are read in the order given. A failed read fails the whole step.
pub fn materialize(
    source: &Session,
    tables: &[String],
    representation: Representation,
) -> BenchResult<FrameSet> {
    info!("Materializing {} tables as {}", tables.len(), representation);
    let mut frames = FrameSet::default();
    for name in tables {
        let (schema, batches) = source
            .query_table(&format!("SELECT * FROM {}", quote_ident(name)))
            .map_err(|e| BenchError::Setup(format!("read table {}: {}", name, e)))?;
        let table = MaterializedTable::build(representation, schema, batches)?;
        debug!(table = %name, rows = table.num_rows(), "materialized");
        frames.insert(name.as_str(), table);
    }
    Ok(frames)
}

/// Bind every snapshot in `frames` into `session` under its table name,
/// replacing earlier bindings of the same name.
pub fn register(session: &Session, frames: &FrameSet) -> BenchResult<()> {
    for (name, table) in frames.iter() {
        scan::bind_view(session, name, Arc::clone(table))?;
        debug!(table = %name, representation = %table.representation(), "registered");
    }
    Ok(())
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionFactory;
    use duckdb::arrow::compute::concat_batches;

    const SCRIPT: &str = "
        CREATE TABLE items AS
        SELECT i::INTEGER AS id,
               'item-' || i AS label,
               (i * 1.25)::DECIMAL(15,2) AS price,
               DATE '1995-01-01' + (i % 365)::INTEGER AS shipped,
               CASE WHEN i % 7 = 0 THEN NULL ELSE i % 10 END AS bucket
        FROM range(5000) t(i);
        CREATE TABLE empty_table (a INTEGER, b VARCHAR);
    ";

    fn source() -> Session {
        let session = SessionFactory::default().open_session().unwrap();
        session.execute_batch(SCRIPT).unwrap();
        session
    }

    fn tables() -> Vec<String> {
        vec!["items".to_string(), "empty_table".to_string()]
    }

    fn collect(session: &Session, sql: &str) -> RecordBatch {
        let (schema, batches) = session.query_table(sql).unwrap();
        concat_batches(&schema, &batches).unwrap()
    }

    #[test]
    fn test_materialize_keeps_declared_order() {
        let frames = materialize(&source(), &tables(), Representation::ColumnarBatch).unwrap();
        assert_eq!(frames.names().collect::<Vec<_>>(), vec!["items", "empty_table"]);
        assert_eq!(frames.get("items").unwrap().num_rows(), 5000);
        assert_eq!(frames.get("empty_table").unwrap().num_rows(), 0);
    }

    #[test]
    fn test_materialize_missing_table_fails() {
        let err = materialize(
            &source(),
            &["items".to_string(), "nope".to_string()],
            Representation::RowFrame,
        )
        .err()
        .unwrap();
        assert!(matches!(err, BenchError::Setup(_)));
    }

    #[test]
    fn test_snapshot_outlives_source_session() {
        let frames = {
            let src = source();
            materialize(&src, &tables(), Representation::RowFrame).unwrap()
        };
        let target = SessionFactory::default().open_session().unwrap();
        register(&target, &frames).unwrap();
        let batch = collect(&target, "SELECT count(*) AS n FROM items");
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_representations_return_identical_results() {
        let src = source();
        let sql = "SELECT bucket, count(*) AS n, sum(price) AS total, max(label) AS top, min(shipped) AS first
                   FROM items GROUP BY bucket ORDER BY bucket NULLS FIRST";

        let rows = materialize(&src, &tables(), Representation::RowFrame).unwrap();
        let cols = materialize(&src, &tables(), Representation::ColumnarBatch).unwrap();

        let row_session = SessionFactory::new(Some(2)).open_session().unwrap();
        let col_session = SessionFactory::new(Some(2)).open_session().unwrap();
        register(&row_session, &rows).unwrap();
        register(&col_session, &cols).unwrap();

        let native = collect(&src, sql);
        assert_eq!(collect(&row_session, sql), native);
        assert_eq!(collect(&col_session, sql), native);
    }

    #[test]
    fn test_same_snapshot_in_two_sessions() {
        let frames = materialize(&source(), &tables(), Representation::ColumnarBatch).unwrap();
        let a = SessionFactory::default().open_session().unwrap();
        let b = SessionFactory::default().open_session().unwrap();
        register(&a, &frames).unwrap();
        register(&b, &frames).unwrap();
        let sql = "SELECT id, label FROM items WHERE id % 1000 = 0 ORDER BY id";
        assert_eq!(collect(&a, sql), collect(&b, sql));
    }

    #[test]
    fn test_register_replaces_prior_binding() {
        let src = source();
        let session = SessionFactory::default().open_session().unwrap();
        register(&session, &materialize(&src, &tables(), Representation::RowFrame).unwrap())
            .unwrap();

        src.execute_batch("DELETE FROM items WHERE id >= 10;").unwrap();
        let smaller = materialize(&src, &tables(), Representation::ColumnarBatch).unwrap();
        register(&session, &smaller).unwrap();

        let batch = collect(&session, "SELECT id FROM items");
        assert_eq!(batch.num_rows(), 10);
    }

    #[test]
    fn test_frame_set_insert_replaces() {
        let src = source();
        let mut frames = materialize(&src, &tables(), Representation::RowFrame).unwrap();
        let (schema, batches) = src.query_table("SELECT * FROM items LIMIT 3").unwrap();
        frames.insert(
            "items",
            MaterializedTable::build(Representation::ColumnarBatch, schema, batches).unwrap(),
        );
        assert_eq!(frames.len(), 2);
        let items = frames.get("items").unwrap();
        assert_eq!(items.num_rows(), 3);
        assert_eq!(items.representation(), Representation::ColumnarBatch);
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }
}
