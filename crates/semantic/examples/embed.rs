use std::{env, error::Error};

use semantic::{Embedder, SemanticConfig};

/// Embed two texts and print their similarity.
///
/// Uses the stub provider unless `SEMSEARCH_API_URL` points at a
/// feature-extraction endpoint (`SEMSEARCH_API_TOKEN` is sent as a bearer token).
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let left = args.next().unwrap_or_else(|| "running shoes".into());
    let right = args.next().unwrap_or_else(|| "red running shoes".into());

    let mut cfg = SemanticConfig::default();
    if let Ok(url) = env::var("SEMSEARCH_API_URL") {
        cfg.mode = "api".into();
        cfg.api_url = Some(url);
        cfg.api_auth_header = env::var("SEMSEARCH_API_TOKEN")
            .ok()
            .map(|token| format!("Bearer {token}"));
    }
    println!("provider mode: {}", cfg.mode);

    let embedder = Embedder::lazy(cfg);
    let a = embedder.embed(&left).await?;
    let b = embedder.embed(&right).await?;

    let score: f32 = a.values.iter().zip(&b.values).map(|(x, y)| x * y).sum();
    println!("dim = {}", a.dim());
    println!("sim({left:?}, {right:?}) = {score:.4}");
    Ok(())
}
