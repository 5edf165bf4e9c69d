use clap::Parser;
use subs_and_reds::utils::{logger, validation::Validate};
use subs_and_reds::{run_with_config, CliConfig, EtlError, EtlRun, Result, TomlConfig};

async fn run(config: CliConfig) -> Result<EtlRun> {
    match &config.config {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            let file_config = TomlConfig::from_file(path)?;
            file_config.validate()?;
            run_with_config(file_config).await
        }
        None => {
            config.validate()?;
            run_with_config(config).await
        }
    }
}

fn report_failure(e: &EtlError) -> ! {
    tracing::error!("❌ Run failed: {}", e);
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.json_logs);

    tracing::info!("Starting subs-and-reds");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(config).await {
        Ok(finished) => {
            tracing::info!("✅ Extraction completed");
            println!("✅ {}", finished.report.summary());
            println!("📁 Output saved to: {}", finished.output_path);
            if !finished.report.fetch_failures.is_empty() {
                println!(
                    "⚠️  {} matches could not be fetched",
                    finished.report.fetch_failures.len()
                );
            }
        }
        Err(e) => report_failure(&e),
    }
}
