//! Tab-separated sample output.
//!
//! One line per sample: `name\trepetition\telapsed_secs`, no header. Each
//! record is flushed to the underlying stream as soon as it is emitted.

use crate::{BenchError, BenchResult, TimingSample};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub struct ResultSink<W: Write> {
    writer: csv::Writer<W>,
}

/// The sink `main` uses: stdout or a file picked at runtime.
pub type OutputSink = ResultSink<Box<dyn Write>>;

impl OutputSink {
    /// Create (or truncate) `path`, or fall back to stdout when `None`.
    pub fn open(path: Option<&Path>) -> BenchResult<Self> {
        match path {
            Some(path) => {
                let file = File::create(path).map_err(|e| {
                    BenchError::Sink(format!("create {}: {}", path.display(), e))
                })?;
                info!("Writing samples to {}", path.display());
                Ok(ResultSink::new(Box::new(file) as Box<dyn Write>))
            }
            None => Ok(ResultSink::new(Box::new(io::stdout()) as Box<dyn Write>)),
        }
    }
}

impl<W: Write> ResultSink<W> {
    pub fn new(out: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(out);
        Self { writer }
    }

    pub fn emit(&mut self, sample: &TimingSample) -> BenchResult<()> {
        let repetition = sample.repetition.to_string();
        let elapsed = sample.elapsed_secs.to_string();
        self.writer
            .write_record([sample.name.as_str(), repetition.as_str(), elapsed.as_str()])
            .map_err(|e| BenchError::Sink(format!("write {}: {}", sample.name, e)))?;
        self.writer
            .flush()
            .map_err(|e| BenchError::Sink(format!("flush: {}", e)))
    }

    /// Flush and hand back the underlying stream.
    pub fn finish(self) -> BenchResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| BenchError::Sink(format!("close: {}", e.error())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, repetition: usize, elapsed_secs: f64) -> TimingSample {
        TimingSample {
            name: name.to_string(),
            repetition,
            elapsed_secs,
        }
    }

    #[test]
    fn test_emit_writes_tab_separated_lines() {
        let mut sink = ResultSink::new(Vec::new());
        sink.emit(&sample("pandas_tpch_q01", 0, 0.25)).unwrap();
        sink.emit(&sample("pandas_tpch_q01", 1, 1.5)).unwrap();
        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(out, "pandas_tpch_q01\t0\t0.25\npandas_tpch_q01\t1\t1.5\n");
    }

    #[test]
    fn test_emit_flushes_each_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut sink = OutputSink::open(Some(path.as_path())).unwrap();
        sink.emit(&sample("a_q01", 0, 0.1)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a_q01\t0\t0.1\n");
        drop(sink);
    }

    #[test]
    fn test_open_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        std::fs::write(&path, "stale\n").unwrap();
        let sink = OutputSink::open(Some(path.as_path())).unwrap();
        sink.finish().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("out.tsv");
        assert!(matches!(OutputSink::open(Some(path.as_path())), Err(BenchError::Sink(_))));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut sink = ResultSink::new(FailingWriter);
        assert!(matches!(sink.emit(&sample("x", 0, 0.0)), Err(BenchError::Sink(_))));
    }
}
