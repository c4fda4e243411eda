//! The full measurement protocol for one run.

use crate::config::RunConfig;
use crate::frames::{materialize, register, FrameSet, Representation};
use crate::generator::DatasetGenerator;
use crate::runner::run_suite;
use crate::session::{Session, SessionFactory};
use crate::sink::OutputSink;
use crate::suite::Suite;
use crate::{BenchError, BenchResult};
use tracing::info;

/// Generate, snapshot, then run `suite` once per configured representation.
///
/// Returns the number of samples emitted. The output destination is opened
/// only after every bench session has its extensions loaded and its frames
/// registered, so a failed setup never touches it.
pub fn run(
    config: &RunConfig,
    generator: &dyn DatasetGenerator,
    suite: &Suite,
) -> BenchResult<usize> {
    let factory = SessionFactory::new(config.threads);

    let snapshots: Vec<(Representation, FrameSet)> = {
        let source = factory.open_session()?;
        info!("Generating {} dataset", generator.name());
        generator.generate(&source)?;
        config
            .representations
            .iter()
            .map(|&repr| -> BenchResult<_> {
                Ok((repr, materialize(&source, generator.tables(), repr)?))
            })
            .collect::<BenchResult<_>>()?
    };

    let sessions: Vec<(Representation, Session)> = snapshots
        .iter()
        .map(|(repr, frames)| -> BenchResult<_> {
            if frames.is_empty() {
                return Err(BenchError::Config(format!(
                    "{} dataset has no tables",
                    generator.name()
                )));
            }
            let session = factory.open_session()?;
            session.load_extensions(suite.extensions())?;
            register(&session, frames)?;
            info!(
                "Registered {} tables: {}",
                repr,
                frames.names().collect::<Vec<_>>().join(", ")
            );
            Ok((*repr, session))
        })
        .collect::<BenchResult<_>>()?;

    let mut sink = OutputSink::open(config.out_file.as_deref())?;
    let mut emitted = 0;

    for (repr, session) in &sessions {
        info!("Running {} suite over {} tables", suite.tag(), repr);
        for sample in run_suite(session, suite, repr.name_prefix(), config.nruns) {
            sink.emit(&sample?)?;
            emitted += 1;
        }
    }

    sink.finish()?;
    info!("Emitted {} samples", emitted);
    Ok(emitted)
}
