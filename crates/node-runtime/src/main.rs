//! # Tip-Notify Node
//!
//! Runs the chain state, the signal bus and the chain-tip notification
//! loop until Ctrl+C or a fatal internal error.

use anyhow::Result;
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("[node] Starting on {:?}", config.network);
    let mut runtime = NodeRuntime::new(config);
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("[node] Ctrl+C received");
        }
        _ = runtime.stopped() => {
            info!("[node] Shutdown requested internally");
        }
    }

    runtime.shutdown().await
}
