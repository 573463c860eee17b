use anyhow::Result;
use librecloud_api::setup;
use librecloud_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    setup::telemetry::init_telemetry();

    let config = Config::from_env()?;
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;
    Ok(())
}
