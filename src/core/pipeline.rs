use crate::core::fetcher::fetch_each;
use crate::core::lineup::LineupExtractor;
use crate::core::parser::parse_node;
use crate::core::sink::encode_events_csv;
use crate::core::{
    ConfigProvider, GameFeed, Match, MatchOutcome, MatchStatus, PageFetcher, Pipeline,
    RunReport, Storage, TransformResult,
};
use crate::domain::model::{FailureKind, FetchFailure, Side, Venue};
use crate::utils::error::Result;

pub const REPORT_FILE: &str = "run_report.json";

pub struct EventsPipeline<S: Storage, C: ConfigProvider, G: GameFeed, F: PageFetcher> {
    storage: S,
    config: C,
    feed: G,
    fetcher: F,
    extractor: LineupExtractor,
}

impl<S: Storage, C: ConfigProvider, G: GameFeed, F: PageFetcher> EventsPipeline<S, C, G, F> {
    pub fn new(storage: S, config: C, feed: G, fetcher: F) -> Result<Self> {
        Ok(Self {
            storage,
            config,
            feed,
            fetcher,
            extractor: LineupExtractor::new()?,
        })
    }

    /// Extraction for one fetched page. Pure in the page body and side.
    pub fn process_page(&self, game: Match, side: Side, body: &str) -> MatchOutcome {
        let nodes = self.extractor.extract_from_str(body, side);

        let mut events = Vec::new();
        let mut issues = Vec::new();

        for node in &nodes {
            match parse_node(&game.game_id, node) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {
                    tracing::warn!(
                        game_id = %game.game_id,
                        text = %node.text,
                        "unrecognised substitute format, skipping"
                    );
                    issues.push(FailureKind::UnrecognizedFormat);
                }
                Err(e) => {
                    tracing::warn!(
                        game_id = %game.game_id,
                        text = %node.text,
                        error = %e,
                        "skipping lineup entry"
                    );
                    issues.push(e.kind());
                }
            }
        }

        tracing::debug!(
            game_id = %game.game_id,
            nodes = nodes.len(),
            events = events.len(),
            "extracted match events"
        );
        MatchOutcome::extracted(game, events, issues)
    }

    fn handle_page(&self, game: Match, page: Result<String>) -> MatchOutcome {
        let Some(side) = Side::from_venue(game.venue) else {
            return MatchOutcome::skipped(game);
        };

        match page {
            Ok(body) => self.process_page(game, side, &body),
            Err(e) => {
                tracing::warn!(game_id = %game.game_id, error = %e, "fetch failed");
                MatchOutcome::fetch_failed(game, e.to_string())
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: GameFeed, F: PageFetcher> Pipeline
    for EventsPipeline<S, C, G, F>
{
    async fn extract(&self) -> Result<Vec<MatchOutcome>> {
        let matches = self.feed.list_matches().await?;
        tracing::info!("📋 {} matches in feed", matches.len());

        let (resolvable, unresolved): (Vec<Match>, Vec<Match>) = matches
            .into_iter()
            .partition(|game| game.venue != Venue::Unknown);

        if !unresolved.is_empty() {
            tracing::info!(
                "⏭️  Skipping {} matches with no home/away venue",
                unresolved.len()
            );
        }

        let mut outcomes = fetch_each(
            &self.fetcher,
            resolvable,
            self.config.max_concurrency(),
            |game, page| self.handle_page(game, page),
        )
        .await;

        outcomes.extend(unresolved.into_iter().map(MatchOutcome::skipped));
        Ok(outcomes)
    }

    async fn transform(&self, outcomes: Vec<MatchOutcome>) -> Result<TransformResult> {
        let mut report = RunReport::new();
        let mut events = Vec::new();
        report.matches_total = outcomes.len();

        for outcome in outcomes {
            match outcome.status {
                MatchStatus::Skipped => report.matches_skipped += 1,
                MatchStatus::FetchFailed { message } => {
                    report.record_issue(FailureKind::FetchError);
                    report.fetch_failures.push(FetchFailure {
                        game_id: outcome.game.game_id,
                        message,
                    });
                }
                MatchStatus::Extracted {
                    events: match_events,
                    issues,
                } => {
                    report.matches_processed += 1;
                    for kind in issues {
                        report.record_issue(kind);
                    }
                    events.extend(match_events);
                }
            }
        }

        report.events_written = events.len();
        let csv_output = encode_events_csv(&events, self.config.include_details())?;

        Ok(TransformResult {
            events,
            csv_output,
            report,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let output_path = format!("{}/{}", self.config.output_path(), self.config.output_file());

        tracing::debug!(
            "Writing {} events ({} bytes) to storage",
            result.events.len(),
            result.csv_output.len()
        );
        self.storage
            .write_file(self.config.output_file(), result.csv_output.as_bytes())
            .await?;

        if self.config.write_report() {
            let report = serde_json::to_vec_pretty(&result.report)?;
            self.storage.write_file(REPORT_FILE, &report).await?;
            tracing::debug!("Run report written to {}", REPORT_FILE);
        }

        Ok(output_path)
    }
}
