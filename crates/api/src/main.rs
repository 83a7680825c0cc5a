//! Basalt Discrimination Pipeline - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config file path as the only argument
    let config_path = std::env::args().nth(1);
    let config = AppConfig::load(config_path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== Basalt Discrimination Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(config).await
}
