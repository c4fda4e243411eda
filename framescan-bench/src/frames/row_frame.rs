//! Row-major snapshot.
//!
//! Rows are stored in the Arrow row format and decoded back into columns every
//! time the engine pulls a chunk, so scans pay a row-to-column conversion on
//! each query.

use super::SCAN_CHUNK_ROWS;
use crate::{BenchError, BenchResult};
use duckdb::arrow::datatypes::SchemaRef;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::row::{RowConverter, Rows, SortField};

pub struct RowFrame {
    schema: SchemaRef,
    converter: RowConverter,
    rows: Rows,
}

impl RowFrame {
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> BenchResult<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|f| SortField::new(f.data_type().clone()))
            .collect();
        let converter = RowConverter::new(fields)
            .map_err(|e| BenchError::Setup(format!("row converter: {}", e)))?;

        let row_count = batches.iter().map(|b| b.num_rows()).sum();
        let mut rows = converter.empty_rows(row_count, 0);
        for batch in batches {
            converter
                .append(&mut rows, batch.columns())
                .map_err(|e| BenchError::Setup(format!("encode rows: {}", e)))?;
        }

        Ok(Self {
            schema,
            converter,
            rows,
        })
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.num_rows()
    }

    /// Decode rows `[index * SCAN_CHUNK_ROWS, ..)` into a column batch.
    pub fn chunk(&self, index: usize) -> BenchResult<Option<RecordBatch>> {
        let start = index.saturating_mul(SCAN_CHUNK_ROWS);
        if start >= self.num_rows() {
            return Ok(None);
        }
        let end = (start + SCAN_CHUNK_ROWS).min(self.num_rows());
        let columns = self
            .converter
            .convert_rows((start..end).map(|i| self.rows.row(i)))
            .map_err(|e| BenchError::Query(format!("decode rows: {}", e)))?;
        let batch = RecordBatch::try_new(self.schema.clone(), columns)
            .map_err(|e| BenchError::Query(format!("rebuild batch: {}", e)))?;
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::arrow::array::{ArrayRef, Int64Array, StringArray};
    use duckdb::arrow::compute::concat_batches;
    use duckdb::arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    fn source(rows: i64) -> (SchemaRef, Vec<RecordBatch>) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("name", DataType::Utf8, true),
        ]));
        let ids: ArrayRef = Arc::new(Int64Array::from_iter(
            (0..rows).map(|i| if i % 5 == 0 { None } else { Some(i) }),
        ));
        let names: ArrayRef = Arc::new(StringArray::from_iter_values(
            (0..rows).map(|i| format!("row-{}", i)),
        ));
        let batch = RecordBatch::try_new(schema.clone(), vec![ids, names]).unwrap();
        (schema, vec![batch.slice(0, 1000), batch.slice(1000, rows as usize - 1000)])
    }

    #[test]
    fn test_chunks_decode_to_original_columns() {
        let (schema, batches) = source(4500);
        let frame = RowFrame::from_batches(schema.clone(), &batches).unwrap();
        assert_eq!(frame.num_rows(), 4500);

        let mut decoded = Vec::new();
        let mut index = 0;
        while let Some(chunk) = frame.chunk(index).unwrap() {
            assert!(chunk.num_rows() <= SCAN_CHUNK_ROWS);
            decoded.push(chunk);
            index += 1;
        }
        assert_eq!(index, 3);

        let original = concat_batches(&schema, &batches).unwrap();
        let roundtrip = concat_batches(&schema, &decoded).unwrap();
        assert_eq!(roundtrip, original);
    }

    #[test]
    fn test_chunk_past_end_is_none() {
        let (schema, batches) = source(1500);
        let frame = RowFrame::from_batches(schema, &batches).unwrap();
        assert!(frame.chunk(1).unwrap().is_none());
        assert!(frame.chunk(usize::MAX).unwrap().is_none());
    }
}
