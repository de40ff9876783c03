//! semsearch server - HTTP API for semantic catalog search
//!
//! Loads the catalog named in the configuration, embeds it, and serves
//! `GET /api/search?q=...` until shut down.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    server::start_server(config).await?;

    Ok(())
}
