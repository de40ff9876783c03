//! semsearch server - HTTP REST API for semantic catalog search
//!
//! This crate exposes a [`matcher::SearchEngine`] over HTTP. It supports:
//!
//! - **Search**: free-text queries ranked by embedding similarity
//! - **Catalog Management**: reload the catalog file and swap in a new index
//!   without interrupting in-flight searches
//! - **Health & Metrics**: liveness/readiness probes and Prometheus metrics
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: JSON error bodies with error codes
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics
//! - `GET /api/search?q=...` - Top-K catalog items for a query
//! - `POST /api/v1/catalog/rebuild` - Reload and re-embed the catalog
//! - `GET /api/v1/catalog/stats` - Current index snapshot details
//! - `GET /api/v1/metadata` - Server version and uptime
//!
//! Search responses always carry `results`; failures add
//! `error: { code, message }` with `code` one of `provider_unavailable`,
//! `degenerate_query`, or `internal_error`.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
