use std::fs;

use pbp_core::{
    AggregateResult, AssembledMatchRecord, FailureRecord, MatchListing, TournamentSeason,
};
use pbp_engine::{export_stage, read_table, read_units, AtomicFileWriter, ExportError};
use pretty_assertions::assert_eq;

fn listing(url: &str) -> MatchListing {
    MatchListing {
        tournament_name: "Halle - 2023".into(),
        tournament_url: "https://site.test/halle-2023/results/".into(),
        round: "Quarter-finals, \"day 5\"".into(),
        match_url: url.into(),
        match_date: "23.06. 12:00".into(),
    }
}

#[test]
fn stage_export_writes_tables_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let result = AggregateResult {
        successes: vec![
            listing("https://site.test/match/a/#/point-by-point/0"),
            listing("https://site.test/match/b/#/point-by-point/0"),
        ],
        failures: vec![FailureRecord::new(
            "https://site.test/halle-2022/results/",
            "element not found: .heading__name",
        )],
    };

    let summary = export_stage(dir.path(), "matches", &result).unwrap();

    assert_eq!(summary.success_rows, 2);
    assert_eq!(summary.failure_rows, 1);
    assert_eq!(summary.success_path, dir.path().join("matches.csv"));

    let back: Vec<MatchListing> = read_units(&summary.success_path).unwrap();
    assert_eq!(back, result.successes);

    let failures = read_table(&summary.failure_path).unwrap();
    assert_eq!(failures.columns, vec!["unit_identifier", "reason"]);
    assert_eq!(failures.rows.len(), 1);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary.manifest_path).unwrap()).unwrap();
    assert_eq!(manifest["stage"], "matches");
    assert_eq!(manifest["success"]["rows"], 2);
    assert_eq!(manifest["failure"]["file"], "matches_failures.csv");
}

#[test]
fn empty_stage_still_carries_its_schema() {
    let dir = tempfile::tempdir().unwrap();
    let result: AggregateResult<AssembledMatchRecord> = AggregateResult::default();

    let summary = export_stage(dir.path(), "points", &result).unwrap();

    let text = fs::read_to_string(&summary.success_path).unwrap();
    assert!(text.starts_with("match_url,tournament_name,tournament_url,round,match_date,set_id,"));
    assert_eq!(text.lines().count(), 1);
    let failures = fs::read_to_string(&summary.failure_path).unwrap();
    assert_eq!(failures, "unit_identifier,reason\n");
}

#[test]
fn units_are_read_by_column_name() {
    let dir = tempfile::tempdir().unwrap();
    let writer = AtomicFileWriter::new(dir.path()).unwrap();
    let path = writer
        .write(
            "seasons.csv",
            "href,year,name,tournament_url,image_url,city_and_surface,extra\n\
             https://site.test/halle-2023/results/,2023,Halle,https://site.test/halle/,,\"Halle (Germany), grass\",x\n",
        )
        .unwrap();

    let seasons: Vec<TournamentSeason> = read_units(&path).unwrap();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0].year, "2023");
    assert_eq!(seasons[0].city_and_surface, "Halle (Germany), grass");
}

#[test]
fn missing_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let writer = AtomicFileWriter::new(dir.path()).unwrap();
    let path = writer.write("links.csv", "url\nhttps://a.test/\n").unwrap();

    let err = read_units::<pbp_core::TournamentLink>(&path).unwrap_err();
    assert!(matches!(err, ExportError::Table(_)), "got {err:?}");
}

#[test]
fn rewriting_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let writer = AtomicFileWriter::new(dir.path().join("nested")).unwrap();
    writer.write("a.csv", "old\n").unwrap();
    let path = writer.write("a.csv", "new\n").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), "new\n");
}
