//! Command-line interface of the crawler binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::StageKind;
use crate::logging::LogDestination;

/// Crawl tennis point-by-point data: tournaments, seasons, matches, points.
///
/// ```sh
/// # full chain from the root listing, settings from ./pbp_crawler.ron if present
/// pbp_crawler
///
/// # only the points stage, for matches exported by an earlier run
/// pbp_crawler --stage points --input output/matches.csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// RON config file; defaults apply when omitted and ./pbp_crawler.ron is absent
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run a single stage instead of the configured chain
    #[arg(short, long, value_enum)]
    pub stage: Option<StageKind>,

    /// CSV of units for the first stage that runs (the previous stage's export)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for exported tables, overrides the config
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Where log events go
    #[arg(long, value_enum, default_value_t = LogDestination::Both)]
    pub log_to: LogDestination,
}
