use clawhub_registry::config::RegistryConfig;
use clawhub_registry::db::{build_pool, run_migrations};
use clawhub_registry::identity::IdentityClient;
use clawhub_registry::observability::init_tracing;
use clawhub_registry::storage::StorageAdapter;
use clawhub_registry::web::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = RegistryConfig::from_env()?;
    tracing::info!(bind_addr = %config.bind_addr, "starting clawhub-registry");

    run_migrations(&config.database).await?;
    let pool = build_pool(&config.database)?;
    let storage = StorageAdapter::new(&config.storage);
    let identity = IdentityClient::new();

    let bind_addr = config.bind_addr;
    let state = AppState {
        pool,
        storage,
        identity,
        config: std::sync::Arc::new(config),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
