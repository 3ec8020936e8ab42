use std::env;

use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mock_server=debug,tower_http=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let collections = match env::var("SEED_FILE") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)?;
            let collections = mock_server::load_seed(serde_json::from_str(&raw)?)?;
            tracing::info!("seeded {} collections from {path}", collections.len());
            collections
        }
        Err(_) => mock_server::default_collections(),
    };

    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    mock_server::serve(listener, collections).await?;
    Ok(())
}
