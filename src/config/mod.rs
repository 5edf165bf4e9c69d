pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::feed::DEFAULT_FEED_URL;
#[cfg(feature = "cli")]
use crate::core::fetcher::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_feed_source, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, validate_url,
};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_PATH: &str = "./data";
pub const DEFAULT_OUTPUT_FILE: &str = "subs-and-reds.csv";

/// Upper bound accepted for `max_concurrency`.
pub const MAX_CONCURRENCY_LIMIT: usize = 100;

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_feed_source("feed", config.feed_source())?;
    validate_url("base_url", config.base_url())?;
    validate_range(
        "max_concurrency",
        config.max_concurrency(),
        1,
        MAX_CONCURRENCY_LIMIT,
    )?;
    validate_positive_number("timeout_seconds", config.request_timeout_secs(), 1)?;
    validate_non_empty_string("user_agent", config.user_agent())?;
    validate_path("output_path", config.output_path())?;
    validate_non_empty_string("output_file", config.output_file())?;
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "subs-and-reds")]
#[command(about = "Extract substitutions and red cards from soccerbase match pages")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_FEED_URL, help = "Feed CSV (URL or local path) with sb_game_id and venue columns")]
    pub feed: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    #[arg(long, help = "Append the raw event_details column")]
    pub with_details: bool,

    #[arg(long, help = "Write run_report.json next to the output")]
    pub report: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn feed_source(&self) -> &str {
        &self.feed
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_seconds
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn include_details(&self) -> bool {
        self.with_details
    }

    fn write_report(&self) -> bool {
        self.report
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
