use std::time::Duration;

use pbp_core::{
    AssembledMatchRecord, MatchListing, ParallelismPolicy, TournamentLink, TournamentSeason,
    WorkUnit,
};

use crate::extract::Extractor;
use crate::navigator::Navigator;
use crate::{ExtractError, UnitOutcome};

/// One level of the crawl: turns units of one kind into rows of the next.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    type Unit: WorkUnit + Send + Sync + 'static;
    type Row: Send + 'static;

    /// Short name used in logs and output file names.
    const NAME: &'static str;

    fn policy(&self) -> ParallelismPolicy;

    async fn process(
        &self,
        nav: &mut dyn Navigator,
        unit: &Self::Unit,
    ) -> Result<UnitOutcome<Self::Row>, ExtractError>;
}

/// Tournament link to its archived seasons.
#[derive(Debug, Clone, Copy)]
pub struct SeasonStage {
    extractor: Extractor,
    policy: ParallelismPolicy,
}

impl SeasonStage {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            extractor: Extractor::new(wait_timeout),
            policy: ParallelismPolicy::SINGLE_VIEW,
        }
    }

    pub fn with_reserve(mut self, reserve: usize) -> Self {
        self.policy.reserve = reserve;
        self
    }
}

#[async_trait::async_trait]
impl Stage for SeasonStage {
    type Unit = TournamentLink;
    type Row = TournamentSeason;

    const NAME: &'static str = "seasons";

    fn policy(&self) -> ParallelismPolicy {
        self.policy
    }

    async fn process(
        &self,
        nav: &mut dyn Navigator,
        unit: &TournamentLink,
    ) -> Result<UnitOutcome<TournamentSeason>, ExtractError> {
        self.extractor
            .seasons(nav, unit)
            .await
            .map(UnitOutcome::Extracted)
    }
}

/// Season results page to its main draw matches. Each match is opened in a
/// secondary view, so this stage reserves more capacity.
#[derive(Debug, Clone, Copy)]
pub struct MatchStage {
    extractor: Extractor,
    policy: ParallelismPolicy,
}

impl MatchStage {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            extractor: Extractor::new(wait_timeout),
            policy: ParallelismPolicy::DUAL_VIEW,
        }
    }

    pub fn with_reserve(mut self, reserve: usize) -> Self {
        self.policy.reserve = reserve;
        self
    }
}

#[async_trait::async_trait]
impl Stage for MatchStage {
    type Unit = TournamentSeason;
    type Row = MatchListing;

    const NAME: &'static str = "matches";

    fn policy(&self) -> ParallelismPolicy {
        self.policy
    }

    async fn process(
        &self,
        nav: &mut dyn Navigator,
        unit: &TournamentSeason,
    ) -> Result<UnitOutcome<MatchListing>, ExtractError> {
        self.extractor
            .matches(nav, unit)
            .await
            .map(UnitOutcome::Extracted)
    }
}

/// Match listing to its assembled point-by-point rows.
#[derive(Debug, Clone, Copy)]
pub struct PointStage {
    extractor: Extractor,
    policy: ParallelismPolicy,
}

impl PointStage {
    pub fn new(wait_timeout: Duration) -> Self {
        Self {
            extractor: Extractor::new(wait_timeout),
            policy: ParallelismPolicy::SINGLE_VIEW,
        }
    }

    pub fn with_reserve(mut self, reserve: usize) -> Self {
        self.policy.reserve = reserve;
        self
    }
}

#[async_trait::async_trait]
impl Stage for PointStage {
    type Unit = MatchListing;
    type Row = AssembledMatchRecord;

    const NAME: &'static str = "points";

    fn policy(&self) -> ParallelismPolicy {
        self.policy
    }

    async fn process(
        &self,
        nav: &mut dyn Navigator,
        unit: &MatchListing,
    ) -> Result<UnitOutcome<AssembledMatchRecord>, ExtractError> {
        self.extractor.match_detail(nav, unit).await
    }
}
