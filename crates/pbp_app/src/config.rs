use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use pbp_engine::HttpSettings;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "pbp_crawler.ron";

/// Crawl levels in chain order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum StageKind {
    Seasons,
    Matches,
    Points,
}

impl StageKind {
    pub fn next(self) -> Option<StageKind> {
        match self {
            StageKind::Seasons => Some(StageKind::Matches),
            StageKind::Matches => Some(StageKind::Points),
            StageKind::Points => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub root_url: String,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub wait_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_page_bytes: u64,
    /// Parallel slots kept free per concurrent view of a unit.
    pub reserve_workers: usize,
    /// Upper bound on parallel slots; the host's parallelism when unset.
    pub max_workers: Option<usize>,
    pub user_agent: Option<String>,
    /// Stages run when no single stage is requested, in chain order.
    pub stages: Vec<StageKind>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            root_url: "https://www.flashscore.com/tennis/".to_string(),
            output_dir: PathBuf::from("output"),
            log_file: PathBuf::from("logs/pbp_crawler.log"),
            wait_timeout_secs: 10,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_page_bytes: 5 * 1024 * 1024,
            reserve_workers: 2,
            max_workers: None,
            user_agent: None,
            stages: vec![StageKind::Seasons, StageKind::Matches, StageKind::Points],
        }
    }
}

impl CrawlConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_page_bytes,
            user_agent: self.user_agent.clone(),
            ..HttpSettings::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.wait_timeout_secs == 0 || self.request_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }
        if self.max_workers == Some(0) {
            bail!("max_workers must be positive");
        }
        if self.stages.is_empty() {
            bail!("no stages configured");
        }
        for pair in self.stages.windows(2) {
            if pair[0].next() != Some(pair[1]) {
                bail!(
                    "stages must follow the chain order without gaps, found {:?} then {:?}",
                    pair[0],
                    pair[1]
                );
            }
        }
        Ok(())
    }
}

/// Read the config from `path`, or from [`DEFAULT_CONFIG_FILE`] when no path
/// is given. Only the implicit file may be absent.
pub fn load(path: Option<&Path>) -> Result<CrawlConfig> {
    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if !explicit && err.kind() == ErrorKind::NotFound => {
            return Ok(CrawlConfig::default())
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading config {}", path.display()))
        }
    };
    parse(&text).with_context(|| format!("loading config {}", path.display()))
}

pub fn parse(text: &str) -> Result<CrawlConfig> {
    let config: CrawlConfig = ron::from_str(text)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse(
            r#"(
                root_url: "https://results.test/tennis/",
                wait_timeout_secs: 3,
                stages: [Matches, Points],
            )"#,
        )
        .unwrap();
        assert_eq!(config.root_url, "https://results.test/tennis/");
        assert_eq!(config.wait_timeout(), Duration::from_secs(3));
        assert_eq!(config.stages, vec![StageKind::Matches, StageKind::Points]);
        assert_eq!(config.reserve_workers, 2);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn gaps_in_the_chain_are_rejected() {
        let err = parse("(stages: [Seasons, Points])").unwrap_err();
        assert!(err.to_string().contains("chain order"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("absent.ron");
        assert!(load(Some(&explicit)).is_err());
    }

    #[test]
    fn settings_carry_into_http() {
        let config = CrawlConfig {
            request_timeout_secs: 7,
            max_page_bytes: 1024,
            ..CrawlConfig::default()
        };
        let settings = config.http_settings();
        assert_eq!(settings.request_timeout, Duration::from_secs(7));
        assert_eq!(settings.max_bytes, 1024);
    }
}
