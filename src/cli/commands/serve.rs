use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{MemoryStorage, Storage};
use crate::geo::Geography;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let storage: Arc<dyn Storage> = if memory {
        tracing::warn!("Using in-memory storage; data is lost on exit");
        Arc::new(MemoryStorage::new())
    } else {
        super::postgres_storage(&config).await? as Arc<dyn Storage>
    };

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.uploads.dir.display()))?;

    let geography = Geography::embedded().context("failed to load geography data")?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = crate::app(AppState::new(config, storage, geography));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
