//! Persistence layer: connection pool, embedded migrations, and one query
//! module per aggregate (§10.4), using raw parameterized SQL with one
//! method per query.

pub mod categories;
pub mod models;
pub mod skills;
pub mod stars;
pub mod users;
pub mod versions;

use std::str::FromStr;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use rustls::ClientConfig;
use tokio_postgres::Config as PgConfig;
use tokio_postgres_rustls::MakeRustlsConnect;

use crate::config::{DatabaseConfig, SslMode};
use crate::error::DatabaseError;

/// The connection pool type shared across handlers. A single rustls-backed
/// connector is used regardless of `SslMode`; `tokio_postgres` itself decides
/// whether to negotiate TLS at connect time based on the config's ssl mode,
/// so `Disable` still connects in plaintext over the same connector type.
pub type DbPool = Pool<MakeRustlsConnect>;

fn tls_client_config() -> ClientConfig {
    let mut roots = rustls::RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        tracing::warn!(error = %e, "error loading system root certificate");
    }
    for cert in native.certs {
        if let Err(e) = roots.add(cert) {
            tracing::warn!(error = %e, "skipping invalid system root cert");
        }
    }
    if roots.is_empty() {
        tracing::warn!("no system root certificates found, falling back to webpki-roots");
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Build the connection pool from resolved configuration.
pub fn build_pool(config: &DatabaseConfig) -> Result<DbPool, DatabaseError> {
    let mut pg_config =
        PgConfig::from_str(config.url()).map_err(|e| DatabaseError::Query(e.to_string()))?;
    pg_config.ssl_mode(match config.ssl_mode {
        SslMode::Disable => tokio_postgres::config::SslMode::Disable,
        SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
        SslMode::Require => tokio_postgres::config::SslMode::Require,
    });

    let connector = MakeRustlsConnect::new(tls_client_config());
    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let manager = Manager::from_config(pg_config, connector, manager_config);

    Pool::builder(manager)
        .max_size(config.pool_size)
        .build()
        .map_err(DatabaseError::from)
}

/// `SELECT 1` against the pool, backing `GET /health`'s `database` field.
pub async fn health_check(pool: &DbPool) -> bool {
    match pool.get().await {
        Ok(client) => client.query_one("SELECT 1", &[]).await.is_ok(),
        Err(_) => false,
    }
}

refinery::embed_migrations!("migrations");

/// Run embedded schema migrations once at startup.
///
/// Uses a single dedicated connection rather than the pool: migrations run
/// once per process and refinery needs an owned `tokio_postgres::Client`.
pub async fn run_migrations(config: &DatabaseConfig) -> Result<(), DatabaseError> {
    let mut pg_config =
        PgConfig::from_str(config.url()).map_err(|e| DatabaseError::Query(e.to_string()))?;
    pg_config.ssl_mode(match config.ssl_mode {
        SslMode::Disable => tokio_postgres::config::SslMode::Disable,
        SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
        SslMode::Require => tokio_postgres::config::SslMode::Require,
    });

    let connector = MakeRustlsConnect::new(tls_client_config());
    let (mut client, connection) = pg_config
        .connect(connector)
        .await
        .map_err(DatabaseError::Postgres)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "migration connection closed with error");
        }
    });

    migrations::runner()
        .run_async(&mut client)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    Ok(())
}
