//! Products API - REST catalog server

use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use migration::Migrator;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = match config.database.clone() {
        Some(database) => {
            let db = connect_from_config_with_retry(database, None).await?;
            run_migrations::<Migrator>(&db, config.app.name).await?;
            Some(db)
        }
        None => {
            info!("DATABASE_URL not set, storing products in memory");
            None
        }
    };

    let state = AppState::new(config, db);

    let router = create_router::<openapi::ApiDoc>(api::routes(&state)).await?;
    let app = router.merge(api::probes(&state));

    info!(
        "Starting {} v{} on port {} ({} storage)",
        state.config.app.name,
        state.config.app.version,
        state.config.server.port,
        state.storage()
    );

    let db = state.db.clone();
    create_production_app(
        app,
        &state.config.server,
        state.config.shutdown_timeout,
        async move {
            if let Some(db) = db {
                info!("Shutting down: closing PostgreSQL pool");
                if let Err(e) = db.close().await {
                    tracing::warn!("Failed to close PostgreSQL pool: {}", e);
                }
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
