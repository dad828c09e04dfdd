use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use pbp_core::{FailureRecord, PartialResult, WorkUnit};

use crate::navigator::{Navigator, SessionFactory};
use crate::stages::Stage;
use crate::{ExtractError, NavError, Recovery, UnitOutcome};

/// The navigation session owned by one worker.
///
/// Holds the creation error when no session could be opened, so the units
/// that could not be attempted carry it as their failure reason.
struct SessionSlot<S> {
    session: Option<S>,
    error: Option<NavError>,
}

impl<S: Navigator> SessionSlot<S> {
    async fn acquire<F>(factory: &F) -> Self
    where
        F: SessionFactory<Session = S>,
    {
        match factory.create().await {
            Ok(session) => Self {
                session: Some(session),
                error: None,
            },
            Err(err) => {
                engine_error!("could not open a navigation session: {}", err);
                Self {
                    session: None,
                    error: Some(err),
                }
            }
        }
    }

    async fn replace<F>(&mut self, factory: &F)
    where
        F: SessionFactory<Session = S>,
    {
        self.release().await;
        *self = Self::acquire(factory).await;
        if self.session.is_some() {
            engine_info!("navigation session replaced");
        }
    }

    fn get(&mut self) -> Result<&mut S, ExtractError> {
        self.session.as_mut().ok_or_else(|| {
            ExtractError::Session(
                self.error
                    .as_ref()
                    .map_or_else(|| "no session".to_string(), ToString::to_string),
            )
        })
    }

    async fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.quit().await;
        }
    }
}

/// Processes one chunk of units sequentially with its own session.
///
/// A failed unit is recorded and the worker moves on; errors that may have
/// left the session unusable get it replaced first.
pub struct CrawlWorker<'a, St, F> {
    id: usize,
    stage: &'a St,
    factory: &'a F,
}

impl<'a, St, F> CrawlWorker<'a, St, F>
where
    St: Stage,
    F: SessionFactory,
{
    pub fn new(id: usize, stage: &'a St, factory: &'a F) -> Self {
        Self { id, stage, factory }
    }

    pub async fn run(&self, units: Vec<St::Unit>) -> PartialResult<St::Row> {
        let mut result = PartialResult::new(self.id);
        engine_info!("{}: starting chunk of {} units", St::NAME, units.len());

        let mut slot = SessionSlot::acquire(self.factory).await;
        let mut pending = units.into_iter();
        while let Some(unit) = pending.next() {
            let session = match slot.get() {
                Ok(session) => session,
                Err(err) => {
                    let reason = err.to_string();
                    engine_error!(
                        "{}: abandoning {} units: {}",
                        St::NAME,
                        pending.len() + 1,
                        reason
                    );
                    result
                        .failures
                        .push(FailureRecord::new(unit.identifier(), reason.clone()));
                    result.failures.extend(
                        pending.map(|unit| FailureRecord::new(unit.identifier(), reason.clone())),
                    );
                    break;
                }
            };

            engine_info!("{}: processing {}", St::NAME, unit.identifier());
            match self.stage.process(session, &unit).await {
                Ok(UnitOutcome::Extracted(rows)) => {
                    engine_debug!("{}: {} rows from {}", St::NAME, rows.len(), unit.identifier());
                    result.successes.extend(rows);
                }
                Ok(UnitOutcome::Ineligible { reason }) => {
                    engine_warn!("{}: skipping {}: {}", St::NAME, unit.identifier(), reason);
                    result
                        .failures
                        .push(FailureRecord::new(unit.identifier(), reason));
                }
                Err(err) => {
                    engine_error!("{}: {} failed: {}", St::NAME, unit.identifier(), err);
                    result
                        .failures
                        .push(FailureRecord::new(unit.identifier(), err.to_string()));
                    if err.recovery() == Recovery::RestartSession {
                        slot.replace(self.factory).await;
                    }
                }
            }
        }
        slot.release().await;

        engine_info!(
            "{}: chunk finished with {} rows and {} failures",
            St::NAME,
            result.successes.len(),
            result.failures.len()
        );
        result
    }
}
