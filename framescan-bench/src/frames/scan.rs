//! `frame_scan(name)` table function and the per-session catalog behind it.
//!
//! Registration never copies data into DuckDB storage: each table name becomes
//! a temporary view over `frame_scan('<name>')`, and the table function streams
//! chunks straight out of the snapshot on every query.

use super::{quote_ident, quote_literal, MaterializedTable};
use crate::session::Session;
use crate::{BenchError, BenchResult};
use duckdb::core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId};
use duckdb::vtab::{
    record_batch_to_duckdb_data_chunk, to_duckdb_logical_type, BindInfo, InitInfo,
    TableFunctionInfo, VTab,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) const FRAME_SCAN_FUNCTION: &str = "frame_scan";

/// Snapshots bound into one session, shared with its table function.
#[derive(Clone, Default)]
pub(crate) struct FrameCatalog(Arc<RwLock<HashMap<String, Arc<MaterializedTable>>>>);

impl FrameCatalog {
    fn bind(&self, name: &str, table: Arc<MaterializedTable>) -> Option<Arc<MaterializedTable>> {
        self.0.write().insert(name.to_string(), table)
    }

    fn get(&self, name: &str) -> Option<Arc<MaterializedTable>> {
        self.0.read().get(name).cloned()
    }

    fn unbind(&self, name: &str) {
        self.0.write().remove(name);
    }
}

/// Put `table` into the session catalog and (re)create the view `name`.
pub(crate) fn bind_view(
    session: &Session,
    name: &str,
    table: Arc<MaterializedTable>,
) -> BenchResult<()> {
    let previous = session.frames().bind(name, table);
    let sql = format!(
        "CREATE OR REPLACE TEMP VIEW {} AS SELECT * FROM {}({});",
        quote_ident(name),
        FRAME_SCAN_FUNCTION,
        quote_literal(name)
    );
    if let Err(e) = session.execute_batch(&sql) {
        match previous {
            Some(previous) => {
                session.frames().bind(name, previous);
            }
            None => session.frames().unbind(name),
        }
        return Err(BenchError::Registration(format!("bind {}: {}", name, e)));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────────
// Table function
// ────────────────────────────────────────────────────────────────────────────────

pub(crate) struct FrameScan;

pub(crate) struct FrameScanBind {
    table: Arc<MaterializedTable>,
}

pub(crate) struct FrameScanInit {
    next_chunk: AtomicUsize,
}

impl VTab for FrameScan {
    type InitData = FrameScanInit;
    type BindData = FrameScanBind;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn Error>> {
        let name = bind.get_parameter(0).to_string();
        // SAFETY: the extra info is the FrameCatalog handed to
        // register_table_function_with_extra_info; DuckDB owns the clone for
        // the lifetime of the connection.
        let catalog = unsafe { &*bind.get_extra_info::<FrameCatalog>() };
        let table = catalog
            .get(&name)
            .ok_or_else(|| format!("no frame registered as {:?}", name))?;

        for field in table.schema().fields() {
            bind.add_result_column(field.name(), to_duckdb_logical_type(field.data_type())?);
        }
        Ok(FrameScanBind { table })
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn Error>> {
        Ok(FrameScanInit {
            next_chunk: AtomicUsize::new(0),
        })
    }

    fn func(
        func: &TableFunctionInfo<Self>,
        output: &mut DataChunkHandle,
    ) -> Result<(), Box<dyn Error>> {
        let table = &func.get_bind_data().table;
        let index = func.get_init_data().next_chunk.fetch_add(1, Ordering::Relaxed);
        match table.chunk(index)? {
            Some(batch) => {
                record_batch_to_duckdb_data_chunk(&batch, output)?;
                output.set_len(batch.num_rows());
            }
            None => output.set_len(0),
        }
        Ok(())
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)])
    }
}
