//! PBP engine: navigation sessions, hierarchical extraction and the parallel
//! stage runner.
mod dom;
mod export;
mod extract;
mod http;
pub mod locators;
mod memory;
mod navigator;
mod orchestrator;
mod persist;
mod stages;
mod types;
mod worker;

pub use dom::{DomSession, LoadedPage, PageSource};
pub use export::{
    export_stage, failure_filename, manifest_filename, parse_csv, read_table, read_units,
    success_filename, to_csv, ExportError, ExportSummary,
};
pub use extract::{Extractor, SetTab};
pub use http::{decode_page, HttpSessionFactory, HttpSettings, HttpSource};
pub use memory::MemorySite;
pub use navigator::{Element, Navigator, SessionFactory, ViewHandle};
pub use orchestrator::{available_workers, list_tournaments, run_stage, RunContext};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use stages::{MatchStage, PointStage, SeasonStage, Stage};
pub use types::{ExtractError, NavError, Recovery, UnitOutcome, WaitCondition};
pub use worker::CrawlWorker;
