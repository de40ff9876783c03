use std::error::Error;

use semsearch::{SearchConfig, SemanticConfig, build_engine_from_path};
use tracing_subscriber::EnvFilter;

/// One-shot search: `semsearch <catalog.json> <query words...>`.
///
/// Uses the offline stub provider unless `SEMSEARCH_API_URL` points at a
/// feature-extraction endpoint (`SEMSEARCH_API_TOKEN` becomes the bearer token).
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(catalog) = args.next() else {
        eprintln!("usage: semsearch <catalog.json> <query...>");
        std::process::exit(2);
    };
    let query = args.collect::<Vec<_>>().join(" ");

    let mut cfg = SemanticConfig::default();
    if let Ok(url) = std::env::var("SEMSEARCH_API_URL") {
        cfg.mode = "api".into();
        cfg.api_url = Some(url);
        cfg.api_auth_header = std::env::var("SEMSEARCH_API_TOKEN")
            .ok()
            .map(|token| format!("Bearer {token}"));
    }

    let engine = build_engine_from_path(&catalog, &cfg, SearchConfig::default()).await?;
    let response = engine.search(&query).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
