use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use pbp_core::{ParallelismPolicy, TournamentLink};
use pbp_engine::{CrawlWorker, ExtractError, MemorySite, Navigator, Stage, UnitOutcome};
use pretty_assertions::assert_eq;

/// Keeps every record that passes the level filter.
struct CaptureLogger {
    events: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.events
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: CaptureLogger = CaptureLogger {
    events: Mutex::new(Vec::new()),
};

struct ListedStage;

#[async_trait::async_trait]
impl Stage for ListedStage {
    type Unit = TournamentLink;
    type Row = String;

    const NAME: &'static str = "listed";

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
            other => Ok(UnitOutcome::Extracted(vec![other.to_string()])),
        }
    }
}

#[tokio::test]
async fn chunk_events_reach_an_info_level_sink() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Info);
    engine_logging::set_worker_id(3);

    let factory = MemorySite::default();
    let worker = CrawlWorker::new(3, &ListedStage, &factory);
    let units = ["a", "skip", "broken"]
        .into_iter()
        .map(|href| TournamentLink {
            href: href.to_string(),
        })
        .collect();
    let result = worker.run(units).await;
    assert_eq!(result.successes, vec!["a"]);

    let events = CAPTURE.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (Level::Info, "[worker 3] listed: starting chunk of 3 units".to_string()),
            (Level::Info, "[worker 3] listed: processing a".to_string()),
            (Level::Info, "[worker 3] listed: processing skip".to_string()),
            (Level::Warn, "[worker 3] listed: skipping skip: nothing here".to_string()),
            (Level::Info, "[worker 3] listed: processing broken".to_string()),
            (
                Level::Error,
                "[worker 3] listed: broken failed: unexpected page shape: no rows".to_string()
            ),
            (
                Level::Info,
                "[worker 3] listed: chunk finished with 1 rows and 2 failures".to_string()
            ),
        ]
    );
}
