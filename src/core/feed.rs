use crate::domain::model::{Match, Venue};
use crate::domain::ports::GameFeed;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/petebrown/update-player-stats/main/data/players_df.csv";

const GAME_ID_COLUMN: &str = "sb_game_id";
const VENUE_COLUMN: &str = "venue";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote(String),
    Local(PathBuf),
}

impl FeedSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            FeedSource::Remote(source.to_string())
        } else {
            FeedSource::Local(PathBuf::from(source))
        }
    }

    fn name(&self) -> String {
        match self {
            FeedSource::Remote(url) => url.clone(),
            FeedSource::Local(path) => path.display().to_string(),
        }
    }
}

/// Drops the non-numeric prefix upstream puts on game ids (`tpg812345` → `812345`).
pub fn normalize_game_id(raw: &str) -> Option<&str> {
    let id = raw.trim().trim_start_matches(|c: char| !c.is_ascii_digit());
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Reads the feed CSV, keeping the first occurrence of each `(game id, venue)` pair.
pub fn parse_feed(data: &[u8], source_name: &str) -> Result<Vec<Match>> {
    let unavailable = |reason: String| EtlError::FeedUnavailable {
        source_name: source_name.to_string(),
        reason,
    };

    let mut reader = csv::Reader::from_reader(data);
    let headers = reader
        .headers()
        .map_err(|e| unavailable(format!("unreadable header row: {}", e)))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| unavailable(format!("missing column {}", name)))
    };
    let id_idx = column(GAME_ID_COLUMN)?;
    let venue_idx = column(VENUE_COLUMN)?;

    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| unavailable(format!("row {}: {}", row + 1, e)))?;

        let raw_id = record.get(id_idx).unwrap_or_default();
        let Some(game_id) = normalize_game_id(raw_id) else {
            tracing::warn!(row = row + 1, raw_id, "skipping feed row without a numeric game id");
            continue;
        };
        let venue = Venue::from_code(record.get(venue_idx).unwrap_or_default());

        let game = Match::new(game_id, venue);
        if seen.insert(game.clone()) {
            matches.push(game);
        }
    }

    tracing::debug!(matches = matches.len(), source_name, "parsed game feed");
    Ok(matches)
}

pub struct CsvGameFeed {
    source: FeedSource,
    client: Client,
}

impl CsvGameFeed {
    pub fn new(source: &str) -> Self {
        Self {
            source: FeedSource::parse(source),
            client: Client::new(),
        }
    }

    async fn read_source(&self) -> Result<Vec<u8>> {
        let unavailable = |reason: String| EtlError::FeedUnavailable {
            source_name: self.source.name(),
            reason,
        };

        match &self.source {
            FeedSource::Remote(url) => {
                tracing::debug!(%url, "downloading game feed");
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| unavailable(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(unavailable(format!("HTTP {}", response.status())));
                }
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| unavailable(e.to_string()))?;
                Ok(body.to_vec())
            }
            FeedSource::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| unavailable(e.to_string())),
        }
    }
}

impl GameFeed for CsvGameFeed {
    async fn list_matches(&self) -> Result<Vec<Match>> {
        let data = self.read_source().await?;
        parse_feed(&data, &self.source.name())
    }
}
