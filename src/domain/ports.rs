use crate::domain::model::{Match, MatchOutcome, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn feed_source(&self) -> &str;
    fn base_url(&self) -> &str;
    fn max_concurrency(&self) -> usize;
    fn request_timeout_secs(&self) -> u64;
    fn user_agent(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn include_details(&self) -> bool;
    fn write_report(&self) -> bool;
}

/// Supplies the deduplicated list of fixtures for a run.
pub trait GameFeed: Send + Sync {
    fn list_matches(&self) -> impl std::future::Future<Output = Result<Vec<Match>>> + Send;
}

/// Retrieves the raw additional-information page for one game id.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, game_id: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MatchOutcome>>;
    async fn transform(&self, outcomes: Vec<MatchOutcome>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
