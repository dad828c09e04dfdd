use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pbp_core::{ParallelismPolicy, TournamentLink, WORKER_TERMINATED_REASON};
use pbp_engine::{
    run_stage, CrawlWorker, DomSession, ExtractError, MemorySite, NavError, Navigator,
    SessionFactory, Stage, UnitOutcome,
};
use pretty_assertions::assert_eq;

/// Acts on the unit href: `ok:<row>`, `skip`, `broken`, `timeout`, `panic`.
struct ScriptedStage;

#[async_trait::async_trait]
impl Stage for ScriptedStage {
    type Unit = TournamentLink;
    type Row = String;

    const NAME: &'static str = "scripted";

    fn policy(&self) -> ParallelismPolicy {
        ParallelismPolicy::SINGLE_VIEW
    }

    async fn process(
        &self,
        _nav: &mut dyn Navigator,
        unit: &TournamentLink,
    ) -> Result<UnitOutcome<String>, ExtractError> {
        match unit.href.as_str() {
            "skip" => Ok(UnitOutcome::Ineligible {
                reason: "nothing here",
            }),
            "broken" => Err(ExtractError::DataShape("no rows".into())),
            "timeout" => Err(NavError::Timeout {
                condition: "presence of .x".into(),
                timeout: Duration::from_millis(5),
            }
            .into()),
            "panic" => panic!("scripted panic"),
            other => Ok(UnitOutcome::Extracted(vec![other
                .trim_start_matches("ok:")
                .to_string()])),
        }
    }
}

/// Counts sessions and refuses to create more than `limit`.
#[derive(Clone)]
struct CountingFactory {
    created: Arc<AtomicUsize>,
    limit: usize,
}

impl CountingFactory {
    fn new(limit: usize) -> Self {
        Self {
            created: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SessionFactory for CountingFactory {
    type Session = DomSession<MemorySite>;

    async fn create(&self) -> Result<Self::Session, NavError> {
        if self.created.fetch_add(1, Ordering::SeqCst) >= self.limit {
            return Err(NavError::Network("browser refused to start".into()));
        }
        Ok(DomSession::new(MemorySite::default(), Duration::from_millis(1)))
    }
}

fn units(hrefs: &[&str]) -> Vec<TournamentLink> {
    hrefs
        .iter()
        .map(|href| TournamentLink {
            href: href.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn failed_unit_keeps_earlier_and_later_results() {
    engine_logging::initialize_for_tests();
    let factory = CountingFactory::new(usize::MAX);
    let worker = CrawlWorker::new(1, &ScriptedStage, &factory);

    let result = worker
        .run(units(&["ok:a", "broken", "skip", "ok:b"]))
        .await;

    assert_eq!(result.worker_id, 1);
    assert_eq!(result.successes, vec!["a", "b"]);
    let failures: Vec<(&str, &str)> = result
        .failures
        .iter()
        .map(|f| (f.unit_identifier.as_str(), f.reason.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![
            ("broken", "unexpected page shape: no rows"),
            ("skip", "nothing here"),
        ]
    );
    // Unit-specific failures keep the session.
    assert_eq!(factory.created(), 1);
}

#[tokio::test]
async fn timeout_replaces_the_session() {
    let factory = CountingFactory::new(usize::MAX);
    let worker = CrawlWorker::new(2, &ScriptedStage, &factory);

    let result = worker.run(units(&["timeout", "ok:a"])).await;

    assert_eq!(result.successes, vec!["a"]);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].reason.starts_with("timed out"));
    assert_eq!(factory.created(), 2);
}

#[tokio::test]
async fn units_after_a_lost_session_are_reported() {
    let factory = CountingFactory::new(1);
    let worker = CrawlWorker::new(1, &ScriptedStage, &factory);

    let result = worker.run(units(&["timeout", "ok:a", "ok:b"])).await;

    assert!(result.successes.is_empty());
    let identifiers: Vec<&str> = result
        .failures
        .iter()
        .map(|f| f.unit_identifier.as_str())
        .collect();
    assert_eq!(identifiers, vec!["timeout", "ok:a", "ok:b"]);
    assert_eq!(
        result.failures[1].reason,
        "session unavailable: network error: browser refused to start"
    );
    assert_eq!(result.failures[1].reason, result.failures[2].reason);
}

#[test]
fn results_follow_input_order_across_workers() {
    let factory = CountingFactory::new(usize::MAX);
    // Four slots minus two reserved leaves two workers.
    let result = run_stage(
        &ScriptedStage,
        &factory,
        units(&["ok:1", "ok:2", "ok:3", "ok:4", "ok:5"]),
        4,
    );

    assert_eq!(result.successes, vec!["1", "2", "3", "4", "5"]);
    assert!(result.failures.is_empty());
    assert_eq!(factory.created(), 2);
}

#[test]
fn panicking_worker_loses_only_its_chunk() {
    let factory = CountingFactory::new(usize::MAX);
    let result = run_stage(
        &ScriptedStage,
        &factory,
        units(&["ok:a", "panic", "ok:c", "ok:d"]),
        4,
    );

    assert_eq!(result.successes, vec!["c", "d"]);
    let failures: Vec<(&str, &str)> = result
        .failures
        .iter()
        .map(|f| (f.unit_identifier.as_str(), f.reason.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![
            ("ok:a", WORKER_TERMINATED_REASON),
            ("panic", WORKER_TERMINATED_REASON),
        ]
    );
}

#[test]
fn no_units_means_no_workers() {
    let factory = CountingFactory::new(usize::MAX);
    let result = run_stage(&ScriptedStage, &factory, Vec::new(), 8);
    assert!(result.successes.is_empty());
    assert!(result.failures.is_empty());
    assert_eq!(factory.created(), 0);
}
