mod api_doc;
mod auth;
mod error;
mod handlers;
mod routes;
mod setup;
mod state;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vitrina_core::Config;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The public root must exist before the storage layer hands out paths
    // under it.
    if !config.public_dir.exists() {
        std::fs::create_dir_all(&config.public_dir)?;
        tracing::info!(
            "Created public directory at {}",
            config.public_dir.display()
        );
    }

    let pool = vitrina_db::connect(&config.database_url).await?;
    vitrina_db::init_schema(&pool).await?;

    let state = Arc::new(AppState::new(config.clone(), pool));
    setup::seed_super_user(&state).await?;

    let router = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}
