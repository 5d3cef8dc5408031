mod config;
mod logging;

use anyhow::{Context, Result};
use repeater_core::RepeaterDataset;
use std::time::Duration;

use config::IngestConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let arg = std::env::args().nth(1);
    let config = IngestConfig::resolve(arg.as_deref())?;

    let _logging_guard = logging::init_logging(
        &config.log_dir,
        "repeater-ingest",
        &config.log_level,
        Duration::from_secs(60 * 60 * 24 * config.max_age_days),
    )?;

    tracing::info!("Repeater ingest starting...");
    tracing::info!("Reading export from {}", config.input_path.display());

    let dataset = RepeaterDataset::load_export(&config.input_path)
        .await
        .with_context(|| format!("Failed to build dataset from {}", config.input_path.display()))?;
    tracing::info!("{}", dataset.stats());

    dataset
        .write_snapshot(&config.snapshot_path)
        .await
        .with_context(|| format!("Failed to write snapshot {}", config.snapshot_path.display()))?;
    tracing::info!(
        "Snapshot with {} repeaters written to {}",
        dataset.len(),
        config.snapshot_path.display()
    );

    Ok(())
}
