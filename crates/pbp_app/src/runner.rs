use std::path::Path;

use anyhow::{anyhow, Context, Result};
use engine_logging::{engine_info, engine_warn};
use pbp_core::{FromTable, TableRow, TournamentLink};
use pbp_engine::{
    available_workers, export_stage, list_tournaments, read_units, run_stage, ExportSummary,
    MatchStage, PointStage, SeasonStage, SessionFactory, Stage,
};

use crate::config::{CrawlConfig, StageKind};

/// Stages to run: the requested one alone, or the configured chain.
pub fn plan(config: &CrawlConfig, requested: Option<StageKind>) -> Vec<StageKind> {
    requested.map_or_else(|| config.stages.clone(), |stage| vec![stage])
}

/// Run `stages` in order, each on the previous stage's successes. The first
/// stage reads its units from `input`; without one, seasons start from the
/// root listing and the other stages cannot start.
pub fn run<F: SessionFactory>(
    factory: &F,
    config: &CrawlConfig,
    stages: &[StageKind],
    input: Option<&Path>,
) -> Result<Vec<ExportSummary>> {
    let available = config
        .max_workers
        .map_or_else(available_workers, |max| max.min(available_workers()).max(1));
    let runner = Runner {
        factory,
        config,
        available,
    };

    let wait = config.wait_timeout();
    let reserve = config.reserve_workers;

    let mut summaries = Vec::with_capacity(stages.len());
    let mut seasons = None;
    let mut matches = None;
    for (position, kind) in stages.iter().enumerate() {
        let input = input.filter(|_| position == 0);
        match kind {
            StageKind::Seasons => {
                let links = match input {
                    Some(path) => load_units::<TournamentLink>(path)?,
                    None => list_tournaments(factory, &config.root_url, wait)
                        .with_context(|| format!("listing tournaments on {}", config.root_url))?,
                };
                let stage = SeasonStage::new(wait).with_reserve(reserve);
                let (rows, summary) = runner.run_and_export(&stage, links)?;
                seasons = Some(rows);
                summaries.push(summary);
            }
            StageKind::Matches => {
                let units = previous_or_input(seasons.take(), input, *kind)?;
                let stage = MatchStage::new(wait).with_reserve(reserve);
                let (rows, summary) = runner.run_and_export(&stage, units)?;
                matches = Some(rows);
                summaries.push(summary);
            }
            StageKind::Points => {
                let units = previous_or_input(matches.take(), input, *kind)?;
                let stage = PointStage::new(wait).with_reserve(reserve);
                let (_, summary) = runner.run_and_export(&stage, units)?;
                summaries.push(summary);
            }
        }
    }
    Ok(summaries)
}

struct Runner<'a, F> {
    factory: &'a F,
    config: &'a CrawlConfig,
    available: usize,
}

impl<F: SessionFactory> Runner<'_, F> {
    fn run_and_export<St>(
        &self,
        stage: &St,
        units: Vec<St::Unit>,
    ) -> Result<(Vec<St::Row>, ExportSummary)>
    where
        St: Stage,
        St::Row: TableRow,
    {
        if units.is_empty() {
            engine_warn!("{}: no units to process", St::NAME);
        }
        let result = run_stage(stage, self.factory, units, self.available);
        let summary = export_stage(&self.config.output_dir, St::NAME, &result)
            .with_context(|| format!("exporting {} tables", St::NAME))?;
        engine_info!(
            "{}: {} rows written to {}",
            St::NAME,
            summary.success_rows,
            summary.success_path.display()
        );
        Ok((result.successes, summary))
    }
}

fn previous_or_input<U: FromTable>(
    previous: Option<Vec<U>>,
    input: Option<&Path>,
    kind: StageKind,
) -> Result<Vec<U>> {
    match (previous, input) {
        (Some(units), _) => Ok(units),
        (None, Some(path)) => load_units(path),
        (None, None) => Err(anyhow!(
            "the {kind:?} stage needs --input with the previous stage's export"
        )),
    }
}

fn load_units<U: FromTable>(path: &Path) -> Result<Vec<U>> {
    read_units(path).with_context(|| format!("reading units from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbp_engine::{read_table, to_csv, MemorySite};
    use pretty_assertions::assert_eq;

    #[test]
    fn requested_stage_replaces_the_chain() {
        let config = CrawlConfig::default();
        assert_eq!(plan(&config, Some(StageKind::Points)), vec![StageKind::Points]);
        assert_eq!(plan(&config, None), config.stages);
    }

    #[test]
    fn later_stage_without_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlConfig {
            output_dir: dir.path().to_path_buf(),
            ..CrawlConfig::default()
        };
        let err = run(&MemorySite::default(), &config, &[StageKind::Matches], None).unwrap_err();
        assert!(err.to_string().contains("--input"));
    }

    #[test]
    fn points_stage_from_exported_matches() {
        let dir = tempfile::tempdir().unwrap();
        let match_url = "https://site.test/match/a/#/point-by-point/0";
        let site = MemorySite::new([(match_url, "<div class=\"duelParticipant__home\"></div>")]);
        let input = dir.path().join("matches_in.csv");
        let table = pbp_core::Table::from_records(&[pbp_core::MatchListing {
            tournament_name: "Halle - 2023".into(),
            tournament_url: "https://site.test/halle-2023/results/".into(),
            round: "Final".into(),
            match_url: match_url.into(),
            match_date: "25.06. 13:00".into(),
        }]);
        std::fs::write(&input, to_csv(&table)).unwrap();

        let config = CrawlConfig {
            output_dir: dir.path().join("out"),
            max_workers: Some(1),
            ..CrawlConfig::default()
        };
        let summaries = run(&site, &config, &[StageKind::Points], Some(&input)).unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].success_rows, 0);
        let failures = read_table(&summaries[0].failure_path).unwrap();
        assert_eq!(
            failures.rows,
            vec![vec![match_url.to_string(), "Missing pbp data".to_string()]]
        );
    }
}
