mod cli;
mod config;
mod logging;
mod runner;

use anyhow::Result;
use clap::Parser;
use engine_logging::engine_info;
use pbp_engine::HttpSessionFactory;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    logging::initialize(cli.log_to, &config.log_file);
    let stages = runner::plan(&config, cli.stage);
    engine_info!(
        "crawl starting: stages {:?}, output {}",
        stages,
        config.output_dir.display()
    );

    let factory = HttpSessionFactory::new(config.http_settings());
    let summaries = runner::run(&factory, &config, &stages, cli.input.as_deref())?;
    for summary in &summaries {
        engine_info!(
            "{}: {} rows, {} failures",
            summary.stage,
            summary.success_rows,
            summary.failure_rows
        );
    }
    Ok(())
}
