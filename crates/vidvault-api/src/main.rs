mod auth;
mod error;
mod handlers;
mod setup;
mod state;
mod telemetry;

use vidvault_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env if present; real environments set variables directly.
    dotenvy::dotenv().ok();

    telemetry::init_telemetry();

    let config = Config::from_env()?;

    // Initialize the application (database, storage, pipelines, routes)
    let (_state, router) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
