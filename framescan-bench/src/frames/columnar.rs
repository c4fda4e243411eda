//! Columnar snapshot: Arrow record batches cut into scan-sized slices.

use super::SCAN_CHUNK_ROWS;
use duckdb::arrow::datatypes::SchemaRef;
use duckdb::arrow::record_batch::RecordBatch;

pub struct ColumnarBatch {
    schema: SchemaRef,
    chunks: Vec<RecordBatch>,
    num_rows: usize,
}

impl ColumnarBatch {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        let mut chunks = Vec::new();
        let mut num_rows = 0;
        for batch in batches {
            num_rows += batch.num_rows();
            if batch.num_rows() <= SCAN_CHUNK_ROWS {
                if batch.num_rows() > 0 {
                    chunks.push(batch);
                }
                continue;
            }
            let mut offset = 0;
            while offset < batch.num_rows() {
                let len = SCAN_CHUNK_ROWS.min(batch.num_rows() - offset);
                // zero-copy
                chunks.push(batch.slice(offset, len));
                offset += len;
            }
        }
        Self {
            schema,
            chunks,
            num_rows,
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn chunk(&self, index: usize) -> Option<&RecordBatch> {
        self.chunks.get(index)
    }
}
