//! Yelb application server binary

use anyhow::Result;
use tracing::info;
use yelb_appserver::{config::load_config, Server};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = load_config()?;

    #[cfg(feature = "tracing")]
    yelb_appserver::logging::init(&config.logging)?;

    info!("Starting Yelb appserver v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config).await?;
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}
