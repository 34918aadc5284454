mod config;

use std::sync::Arc;

use infra::SqliteCatalogStore;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = config::load()?;

    let _ = Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let store = SqliteCatalogStore::connect(&settings.db_connection_string).await?;
    store.migrate().await?;
    store.initialize(None).await?;

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = serve::AppState::new(Arc::new(store), settings);
    let router = serve::router(state);

    tracing::info!(%addr, "starting rslv");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
