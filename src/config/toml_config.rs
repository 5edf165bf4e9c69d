use crate::config::{validate_provider, DEFAULT_OUTPUT_FILE};
use crate::core::feed::DEFAULT_FEED_URL;
use crate::core::fetcher::{
    DEFAULT_BASE_URL, DEFAULT_MAX_CONCURRENCY, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedConfig {
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    pub base_url: Option<String>,
    pub max_concurrency: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_file: Option<String>,
    pub include_details: Option<bool>,
    pub write_report: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FEED_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn feed_source(&self) -> &str {
        self.feed.source.as_deref().unwrap_or(DEFAULT_FEED_URL)
    }

    fn base_url(&self) -> &str {
        self.fetch.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    fn max_concurrency(&self) -> usize {
        self.fetch.max_concurrency.unwrap_or(DEFAULT_MAX_CONCURRENCY)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.fetch.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    fn user_agent(&self) -> &str {
        self.fetch.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_file(&self) -> &str {
        self.load.output_file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    fn include_details(&self) -> bool {
        self.load.include_details.unwrap_or(false)
    }

    fn write_report(&self) -> bool {
        self.load.write_report.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[feed]
source = "./data/players_df.csv"

[fetch]
base_url = "http://localhost:8080"
max_concurrency = 10
timeout_seconds = 15
user_agent = "test-agent"

[load]
output_path = "./out"
output_file = "events.csv"
include_details = true
write_report = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.feed_source(), "./data/players_df.csv");
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.max_concurrency(), 10);
        assert_eq!(config.request_timeout_secs(), 15);
        assert_eq!(config.user_agent(), "test-agent");
        assert_eq!(config.output_file(), "events.csv");
        assert!(config.include_details());
        assert!(config.write_report());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("[load]\noutput_path = \"./data\"\n").unwrap();

        assert_eq!(config.feed_source(), DEFAULT_FEED_URL);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrency(), 30);
        assert_eq!(config.output_file(), "subs-and-reds.csv");
        assert!(!config.write_report());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SUBS_TEST_FEED", "https://feeds.example.com/players.csv");

        let toml_content = r#"
[feed]
source = "${SUBS_TEST_FEED}"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.feed_source(), "https://feeds.example.com/players.csv");

        std::env::remove_var("SUBS_TEST_FEED");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[fetch]
base_url = "invalid-url"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_load_section_is_error() {
        assert!(TomlConfig::from_toml_str("[feed]\nsource = \"x.csv\"\n").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[fetch]\nmax_concurrency = 4\n\n[load]\noutput_path = \"./output\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.max_concurrency(), 4);
    }
}
