use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tripsnap::config::loader::Config;
use tripsnap::datasource::storage::init_storage;
use tripsnap::routes::router::{create_routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = match env::var("TRIPSNAP_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::new()?,
    };

    let storage = init_storage(&config.storage).await;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_routes(AppState::new(config, storage));

    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
