use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct EtlRun {
    pub output_path: String,
    pub report: RunReport,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlRun> {
        tracing::info!("Starting substitution and red card extraction");

        // Extract
        let outcomes = self.pipeline.extract().await?;
        tracing::info!("Processed {} matches", outcomes.len());

        // Transform
        let transformed = self.pipeline.transform(outcomes).await?;
        let report = transformed.report.clone();
        tracing::info!("Collected {} events", transformed.events.len());

        for failure in &report.fetch_failures {
            tracing::warn!(game_id = %failure.game_id, "fetch failed: {}", failure.message);
        }

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("📊 {}", report.summary());

        Ok(EtlRun {
            output_path,
            report,
        })
    }
}
