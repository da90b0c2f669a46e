//! Shared application state handed to every handler via `axum::State`.

use std::sync::Arc;

use crate::config::RegistryConfig;
use crate::db::DbPool;
use crate::identity::IdentityClient;
use crate::storage::StorageAdapter;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub storage: StorageAdapter,
    pub identity: IdentityClient,
    pub config: Arc<RegistryConfig>,
}
