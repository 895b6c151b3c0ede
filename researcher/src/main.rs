use nitro_research::{init, init_tracing, server::run_server, Configuration};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment variables from .env
    init();
    init_tracing();

    let config = match Configuration::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    info!(?config, "Successfully loaded configuration");

    run_server(config).await
}
