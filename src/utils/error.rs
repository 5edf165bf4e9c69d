use crate::domain::model::FailureKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Game feed unavailable ({source_name}): {reason}")]
    FeedUnavailable { source_name: String, reason: String },

    #[error("Fetch failed for game {game_id}: {message}")]
    FetchError { game_id: String, message: String },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value {value:?} for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Selector error: {message}")]
    SelectorError { message: String },
}

impl EtlError {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::FeedUnavailable { .. } => {
                "Check that the feed source is reachable and has sb_game_id and venue columns"
            }
            EtlError::FetchError { .. } | EtlError::ApiError(_) => {
                "Check network connectivity or raise --timeout-seconds"
            }
            EtlError::Extraction(_) | EtlError::SelectorError { .. } => {
                "The page layout may have changed; run with --verbose to see the raw text"
            }
            EtlError::CsvError(_) | EtlError::IoError(_) | EtlError::SerializationError(_) => {
                "Check that the output directory exists and is writable"
            }
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Fix the configuration value and rerun",
        }
    }
}

/// Failures scoped to a single lineup node. The pipeline logs these and skips
/// the node; they never abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no minute found in {text:?}")]
    NoMinuteFound { text: String },

    #[error("invalid minute {value:?} in {text:?}")]
    InvalidMinuteFormat { value: String, text: String },

    #[error("malformed player link: {reason}")]
    MalformedLink { reason: String },
}

impl ExtractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::NoMinuteFound { .. } => FailureKind::NoMinuteFound,
            ExtractionError::InvalidMinuteFormat { .. } => FailureKind::InvalidMinuteFormat,
            ExtractionError::MalformedLink { .. } => FailureKind::MalformedLink,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
