pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{
    etl::{EtlEngine, EtlRun},
    feed::CsvGameFeed,
    fetcher::HttpPageFetcher,
    pipeline::EventsPipeline,
};
pub use domain::model::{Event, Match, RunReport, Side, Venue};
pub use utils::error::{EtlError, ExtractionError, Result};

use crate::core::ConfigProvider;
use std::time::Duration;

/// Runs the whole extraction against the live feed and pages described by `config`.
pub async fn run_with_config<C: ConfigProvider>(config: C) -> Result<EtlRun> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let feed = CsvGameFeed::new(config.feed_source());
    let fetcher = HttpPageFetcher::new(
        config.base_url(),
        Duration::from_secs(config.request_timeout_secs()),
        config.user_agent(),
    )?;

    let pipeline = EventsPipeline::new(storage, config, feed, fetcher)?;
    EtlEngine::new(pipeline).run().await
}
