use anyhow::Context;
use partselect_server::{ServerConfig, logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("failed to load configuration")?;
    logging::init();

    run_server(config).await
}
