use std::sync::Arc;

use gatepass_core::RecordWriter;
use gatepass_store::{InMemoryRedemptionStore, JournalRedemptionStore, RedemptionStore};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{ServerConfig, StoreConfig};
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Gatepass HTTP server.
pub struct GatepassServer {
    config: ServerConfig,
}

impl GatepassServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the configured redemption store.
    pub async fn open_store(&self) -> ServerResult<Arc<dyn RedemptionStore>> {
        let store: Arc<dyn RedemptionStore> = match &self.config.store {
            StoreConfig::Memory => {
                info!("using in-memory redemption store; records are lost on exit");
                Arc::new(InMemoryRedemptionStore::new())
            }
            StoreConfig::Journal { root } => Arc::new(JournalRedemptionStore::open(root).await?),
        };
        Ok(store)
    }

    /// Start serving requests until Ctrl-C, then drain pending record writes
    /// and close the store.
    pub async fn serve(self) -> ServerResult<()> {
        self.config.validate()?;
        let store = self.open_store().await?;
        let state = AppState::new(&self.config, Arc::clone(&store))?;
        let writer = state.issuance.writer().clone();
        let app = build_router(state, &self.config);

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Gatepass server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        shutdown(&writer, store.as_ref()).await?;
        info!("Gatepass server stopped");
        Ok(())
    }
}

/// Let detached record writes land, then release the store.
async fn shutdown(writer: &RecordWriter, store: &dyn RedemptionStore) -> ServerResult<()> {
    let pending = writer.in_flight();
    if pending > 0 {
        info!(pending, "waiting for redemption record writes");
    }
    writer.drain().await;
    store.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
