//! Property Valuator - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.log_level, config.log_json)?;

    info!("=== Property Valuator v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model.path);

    run_server(config).await
}
