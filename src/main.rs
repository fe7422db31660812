//! Service entry-point: config, database, seeding, and the HTTP listener.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use enrollment_api::inbound::http::health::HealthState;
use enrollment_api::server::{self, AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    let http_state = server::init_state(&config).await?;
    let health_state = web::Data::new(HealthState::new());

    info!(addr = %config.bind_addr, "starting enrollment service");
    let server = server::create_server(http_state, health_state, &config)?;
    server.await
}
