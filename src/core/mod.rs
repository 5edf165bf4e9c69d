pub mod etl;
pub mod feed;
pub mod fetcher;
pub mod lineup;
pub mod parser;
pub mod pipeline;
pub mod sink;

pub use crate::domain::model::{Event, Match, MatchOutcome, MatchStatus, RunReport, TransformResult};
pub use crate::domain::ports::{ConfigProvider, GameFeed, PageFetcher, Pipeline, Storage};
pub use crate::utils::error::Result;
