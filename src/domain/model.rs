use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where the subject club played the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
    Unknown,
}

impl Venue {
    /// Maps the feed's venue column. Anything other than `H` or `A` is a
    /// neutral or unrecorded venue.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "H" => Venue::Home,
            "A" => Venue::Away,
            _ => Venue::Unknown,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => write!(f, "H"),
            Venue::Away => write!(f, "A"),
            Venue::Unknown => write!(f, "?"),
        }
    }
}

/// A fixture to process, keyed by the upstream game id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub game_id: String,
    pub venue: Venue,
}

impl Match {
    pub fn new(game_id: impl Into<String>, venue: Venue) -> Self {
        Self {
            game_id: game_id.into(),
            venue,
        }
    }
}

/// Lineup column on the match page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    TeamA,
    TeamB,
}

impl Side {
    pub fn from_venue(venue: Venue) -> Option<Self> {
        match venue {
            Venue::Home => Some(Side::TeamA),
            Venue::Away => Some(Side::TeamB),
            Venue::Unknown => None,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Side::TeamA => "teamA",
            Side::TeamB => "teamB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Starter,
    Substitute,
}

/// Lineup entry lifted out of the DOM: normalised text plus the first link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventNode {
    pub kind: NodeKind,
    pub text: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StarterMinutes {
    pub min_off: Option<u32>,
    pub min_so: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstituteMinutes {
    pub min_on: u32,
    pub min_off: Option<u32>,
    pub min_so: Option<u32>,
}

/// One substitution or sending-off row of the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub game_id: String,
    pub player_id: String,
    pub min_on: Option<u32>,
    pub min_off: Option<u32>,
    pub min_so: Option<u32>,
    pub event_details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    FetchError,
    MalformedLink,
    NoMinuteFound,
    InvalidMinuteFormat,
    UnrecognizedFormat,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::FetchError => "fetch_error",
            FailureKind::MalformedLink => "malformed_link",
            FailureKind::NoMinuteFound => "no_minute_found",
            FailureKind::InvalidMinuteFormat => "invalid_minute_format",
            FailureKind::UnrecognizedFormat => "unrecognized_format",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    /// No side could be derived from the venue.
    Skipped,
    FetchFailed { message: String },
    Extracted {
        events: Vec<Event>,
        issues: Vec<FailureKind>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub game: Match,
    pub status: MatchStatus,
}

impl MatchOutcome {
    pub fn skipped(game: Match) -> Self {
        Self {
            game,
            status: MatchStatus::Skipped,
        }
    }

    pub fn fetch_failed(game: Match, message: impl Into<String>) -> Self {
        Self {
            game,
            status: MatchStatus::FetchFailed {
                message: message.into(),
            },
        }
    }

    pub fn extracted(game: Match, events: Vec<Event>, issues: Vec<FailureKind>) -> Self {
        Self {
            game,
            status: MatchStatus::Extracted { events, issues },
        }
    }

    pub fn events(&self) -> &[Event] {
        match &self.status {
            MatchStatus::Extracted { events, .. } => events,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub game_id: String,
    pub message: String,
}

/// Per-run accounting, written next to the dataset so page-format drift shows
/// up without reading logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub matches_total: usize,
    pub matches_processed: usize,
    pub matches_skipped: usize,
    pub events_written: usize,
    pub fetch_failures: Vec<FetchFailure>,
    pub issue_counts: BTreeMap<FailureKind, usize>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            matches_total: 0,
            matches_processed: 0,
            matches_skipped: 0,
            events_written: 0,
            fetch_failures: Vec::new(),
            issue_counts: BTreeMap::new(),
        }
    }

    pub fn record_issue(&mut self, kind: FailureKind) {
        *self.issue_counts.entry(kind).or_insert(0) += 1;
    }

    pub fn issue_count(&self, kind: FailureKind) -> usize {
        self.issue_counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        let issues = if self.issue_counts.is_empty() {
            "none".to_string()
        } else {
            self.issue_counts
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} matches ({} processed, {} skipped), {} events, issues: {}",
            self.matches_total,
            self.matches_processed,
            self.matches_skipped,
            self.events_written,
            issues
        )
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub events: Vec<Event>,
    pub csv_output: String,
    pub report: RunReport,
}
