use std::any::Any;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use pbp_core::{
    aggregate, partition, AggregateResult, Assignment, FailureRecord, PartialResult,
    TournamentLink, WorkUnit, WORKER_TERMINATED_REASON,
};

use crate::extract::Extractor;
use crate::navigator::{Navigator, SessionFactory};
use crate::stages::Stage;
use crate::worker::CrawlWorker;
use crate::ExtractError;

/// Shared, read-only context every worker of one stage run receives.
pub struct RunContext<'a, St, F> {
    pub stage: &'a St,
    pub factory: &'a F,
}

/// Parallel slots of the host, at least one.
pub fn available_workers() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

fn current_thread_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Run one stage over `units` with as many workers as the stage policy
/// allows on `available` slots, and merge their results in worker order.
///
/// A worker that dies takes its chunk with it: every unit of that chunk is
/// reported as a failure, and the other workers are unaffected.
pub fn run_stage<St, F>(
    stage: &St,
    factory: &F,
    units: Vec<St::Unit>,
    available: usize,
) -> AggregateResult<St::Row>
where
    St: Stage,
    F: SessionFactory,
{
    let total = units.len();
    let context = Arc::new(RunContext { stage, factory });
    let assignments = partition(units, stage.policy(), available, context);
    engine_info!(
        "{}: {} units across {} workers",
        St::NAME,
        total,
        assignments.len()
    );

    let partials = thread::scope(|scope| {
        let spawned: Vec<_> = assignments
            .into_iter()
            .map(|assignment| {
                let worker_id = assignment.worker_id;
                let identifiers: Vec<String> = assignment
                    .units
                    .iter()
                    .map(|unit| unit.identifier().to_string())
                    .collect();
                let handle = thread::Builder::new()
                    .name(format!("worker-{worker_id}"))
                    .spawn_scoped(scope, move || run_assignment(assignment));
                (worker_id, identifiers, handle)
            })
            .collect();

        spawned
            .into_iter()
            .map(|(worker_id, identifiers, handle)| {
                let outcome = handle
                    .map_err(|err| format!("could not spawn: {err}"))
                    .and_then(|handle| handle.join().map_err(panic_message))
                    .and_then(|result| result.map_err(|err| format!("runtime: {err}")));
                outcome.unwrap_or_else(|cause| {
                    engine_error!(
                        "{}: worker {} terminated abnormally ({}), {} units lost",
                        St::NAME,
                        worker_id,
                        cause,
                        identifiers.len()
                    );
                    lost_chunk(worker_id, identifiers)
                })
            })
            .collect::<Vec<_>>()
    });

    let result = aggregate(partials);
    engine_info!(
        "{}: {} rows, {} failures",
        St::NAME,
        result.successes.len(),
        result.failures.len()
    );
    result
}

fn run_assignment<St, F>(
    assignment: Assignment<St::Unit, RunContext<'_, St, F>>,
) -> std::io::Result<PartialResult<St::Row>>
where
    St: Stage,
    F: SessionFactory,
{
    engine_logging::set_worker_id(assignment.worker_id);
    let runtime = current_thread_runtime()?;
    let worker = CrawlWorker::new(
        assignment.worker_id,
        assignment.config.stage,
        assignment.config.factory,
    );
    Ok(runtime.block_on(worker.run(assignment.units)))
}

fn lost_chunk<R>(worker_id: usize, identifiers: Vec<String>) -> PartialResult<R> {
    let mut partial = PartialResult::new(worker_id);
    partial.failures = identifiers
        .into_iter()
        .map(|identifier| FailureRecord::new(identifier, WORKER_TERMINATED_REASON))
        .collect();
    partial
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

/// Read the tournament links of the root listing on the calling thread.
pub fn list_tournaments<F: SessionFactory>(
    factory: &F,
    root_url: &str,
    wait_timeout: Duration,
) -> Result<Vec<TournamentLink>, ExtractError> {
    let runtime = current_thread_runtime().map_err(|err| ExtractError::Session(err.to_string()))?;
    runtime.block_on(async {
        let mut session = factory.create().await?;
        let links = Extractor::new(wait_timeout)
            .tournament_links(&mut session, root_url)
            .await;
        session.quit().await;
        let links = links?;
        engine_info!("{} tournaments listed on {}", links.len(), root_url);
        Ok::<_, ExtractError>(links)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(7_u8)), "panic");
    }

    #[test]
    fn lost_chunk_fails_every_unit() {
        let partial: PartialResult<()> = lost_chunk(3, vec!["a".into(), "b".into()]);
        assert_eq!(partial.worker_id, 3);
        assert_eq!(
            partial.failures,
            vec![
                FailureRecord::new("a", WORKER_TERMINATED_REASON),
                FailureRecord::new("b", WORKER_TERMINATED_REASON),
            ]
        );
    }
}
