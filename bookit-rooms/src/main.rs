use anyhow::{Context, Result};
use axum::Router;

use bookit_rooms::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config)?;

    let app = build_app(&config).await?;

    Server::new(config).serve(app).await?;
    Ok(())
}

#[cfg(feature = "surrealdb")]
async fn build_app(config: &Config) -> Result<Router> {
    if let Some(surreal) = &config.surrealdb {
        let store = SurrealStore::<Room>::connect(surreal)
            .await
            .context("connecting to SurrealDB")?;
        tracing::info!(table = %surreal.table, "Using SurrealDB room store");
        return Ok(router(AppState::new(config.clone(), store)));
    }
    memory_app(config).await
}

#[cfg(not(feature = "surrealdb"))]
async fn build_app(config: &Config) -> Result<Router> {
    if config.surrealdb.is_some() {
        tracing::warn!("SurrealDB configured but the surrealdb feature is disabled, using the in-memory store");
    }
    memory_app(config).await
}

async fn memory_app(config: &Config) -> Result<Router> {
    let store = match &config.store.seed_path {
        Some(path) => MemoryStore::<Room>::from_seed_file(path)
            .await
            .with_context(|| format!("seeding rooms from {}", path.display()))?,
        None => MemoryStore::<Room>::new(),
    };
    tracing::info!(rooms = store.count_all().await?, "Using in-memory room store");
    Ok(router(AppState::new(config.clone(), store)))
}
