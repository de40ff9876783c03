use crate::config::ServerConfig;
use crate::error::ServerResult;
use index::CatalogRecord;
use matcher::SearchEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Search engine (shared across requests)
    pub engine: Arc<SearchEngine>,

    /// Prometheus render handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Load the catalog from `config.catalog_path` and build the engine.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let records = load_records(&config).await?;
        let engine =
            SearchEngine::from_config(records, &config.semantic, config.search.clone()).await?;
        Ok(Self::with_engine(config, Arc::new(engine)))
    }

    /// Wrap an engine that was built elsewhere.
    pub fn with_engine(config: ServerConfig, engine: Arc<SearchEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Re-read the configured catalog file.
    pub async fn load_records(&self) -> ServerResult<Vec<CatalogRecord>> {
        load_records(&self.config).await
    }
}

async fn load_records(config: &ServerConfig) -> ServerResult<Vec<CatalogRecord>> {
    let path = config.catalog_path.clone();
    let records = tokio::task::spawn_blocking(move || index::load_catalog(path)).await??;
    Ok(records)
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
