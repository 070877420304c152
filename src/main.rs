use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use roundkeeper::config::BaseConfig;
use roundkeeper::telemetry;
use roundkeeper::RoundKeeper;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    info!("Starting roundkeeper");

    let config = BaseConfig::parse();
    info!(
        operator = %config.operator_address,
        indexer = %config.indexer_url,
        poll_interval_secs = config.poll_interval_secs,
        "Configuration loaded"
    );

    let keeper = RoundKeeper::initialize(config)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    keeper.run(shutdown_rx).await?;

    info!("Roundkeeper shutdown complete");
    Ok(())
}
