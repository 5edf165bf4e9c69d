use crate::domain::model::Match;
use crate::domain::ports::PageFetcher;
use crate::utils::error::{EtlError, Result};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.soccerbase.com";
pub const DEFAULT_MAX_CONCURRENCY: usize = 30;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("subs-and-reds/", env!("CARGO_PKG_VERSION"));

const PAGE_PATH: &str = "/matches/additional_information.sd";

pub fn page_url(base_url: &str, game_id: &str) -> String {
    format!(
        "{}{}?id_game={}",
        base_url.trim_end_matches('/'),
        PAGE_PATH,
        game_id
    )
}

/// Number of workers for a batch: never more than the batch itself, never zero.
pub fn pool_size(max_concurrency: usize, jobs: usize) -> usize {
    max_concurrency.min(jobs).max(1)
}

pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
}

impl HttpPageFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn fetch_error(game_id: &str, err: reqwest::Error) -> EtlError {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        EtlError::FetchError {
            game_id: game_id.to_string(),
            message,
        }
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, game_id: &str) -> Result<String> {
        let url = page_url(&self.base_url, game_id);
        tracing::debug!(game_id, %url, "fetching match page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::fetch_error(game_id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::FetchError {
                game_id: game_id.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Self::fetch_error(game_id, e))
    }
}

/// Fetches every match on a bounded pool and hands each page (or failure) to
/// `handle` on the same worker. Results come back in input order.
pub async fn fetch_each<F, H, T>(
    fetcher: &F,
    matches: Vec<Match>,
    max_concurrency: usize,
    handle: H,
) -> Vec<T>
where
    F: PageFetcher,
    H: Fn(Match, Result<String>) -> T + Sync,
    T: Send,
{
    if matches.is_empty() {
        return Vec::new();
    }

    let workers = pool_size(max_concurrency, matches.len());
    tracing::debug!(workers, matches = matches.len(), "starting page fetches");

    let handle = &handle;
    let mut results: Vec<(usize, T)> = stream::iter(matches.into_iter().enumerate())
        .map(|(index, game)| async move {
            let page = fetcher.fetch(&game.game_id).await;
            (index, handle(game, page))
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}

pub async fn fetch_all<F: PageFetcher>(
    fetcher: &F,
    matches: Vec<Match>,
    max_concurrency: usize,
) -> Vec<(Match, Result<String>)> {
    fetch_each(fetcher, matches, max_concurrency, |game, page| (game, page)).await
}
