#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::config::Config;
use crate::database::Database;
use crate::replication::Coordinator;
use crate::utils::env_var_or_else;

mod api;
mod config;
mod database;
mod graceful_shutdown;
mod notes;
mod replication;
mod seed;
mod tags;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "jotter=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app(Config::from_env()).await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection and schema
/// - Seed data
/// - Replication tier setup
pub async fn setup_app(config: Config) -> Result<Router> {
    let database = Database::from_config(config.database).await?;

    if config.seed {
        seed::ensure_seed_data(&database).await?;
    }

    let coordinator = Coordinator::from_config(&config.replication)?;

    Ok(create_router(database, coordinator))
}

/// Create the router for Jotter
fn create_router(database: Database, coordinator: Coordinator) -> Router {
    Router::new()
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(database))
        .layer(Extension(coordinator))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;
    use tracing_subscriber::EnvFilter;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
