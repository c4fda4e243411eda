//! Suite execution.
//!
//! [`run_suite`] returns a lazy iterator: each `next()` dispatches exactly one
//! query, waits for its full result set and yields the timing sample. Nothing
//! runs concurrently, so a sample measures one query in isolation.

use crate::session::Session;
use crate::suite::{benchmark_name, Suite};
use crate::{BenchError, BenchResult, TimingSample};
use std::time::Instant;
use tracing::info;

pub fn run_suite<'a>(
    session: &'a Session,
    suite: &'a Suite,
    name_prefix: &'a str,
    repetitions: usize,
) -> SuiteRun<'a> {
    SuiteRun {
        session,
        suite,
        name_prefix,
        repetitions,
        entry: 0,
        repetition: 0,
        current_name: String::new(),
        halted: repetitions == 0,
    }
}

pub struct SuiteRun<'a> {
    session: &'a Session,
    suite: &'a Suite,
    name_prefix: &'a str,
    repetitions: usize,
    entry: usize,
    repetition: usize,
    current_name: String,
    halted: bool,
}

impl SuiteRun<'_> {
    /// Samples still to come if every query succeeds.
    fn remaining(&self) -> usize {
        if self.halted {
            return 0;
        }
        let entries_left = self.suite.len().saturating_sub(self.entry);
        (entries_left * self.repetitions).saturating_sub(self.repetition)
    }
}

impl Iterator for SuiteRun<'_> {
    type Item = BenchResult<TimingSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        if self.repetition == self.repetitions {
            self.entry += 1;
            self.repetition = 0;
        }
        let Some(entry) = self.suite.entries().get(self.entry) else {
            self.halted = true;
            return None;
        };

        if self.repetition == 0 {
            self.current_name = benchmark_name(self.name_prefix, self.suite.tag(), entry.ordinal);
            info!("{} ({})", self.current_name, entry.name);
            info!("{}", entry.query);
        }

        let start = Instant::now();
        let result = self.session.query_batches(&entry.query);
        let elapsed = start.elapsed();

        match result {
            Ok(_batches) => {
                let sample = TimingSample {
                    name: self.current_name.clone(),
                    repetition: self.repetition,
                    elapsed_secs: elapsed.as_secs_f64(),
                };
                self.repetition += 1;
                Some(Ok(sample))
            }
            Err(e) => {
                self.halted = true;
                Some(Err(BenchError::Query(format!(
                    "{} (run {}): {}",
                    self.current_name, self.repetition, e
                ))))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}
