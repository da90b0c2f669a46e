//! HTTP transport layer: router assembly, auth extractors, and handlers
//! (§4.5-4.8, §6, §10.1).

pub mod auth;
pub mod handlers;
pub mod server;
pub mod state;

pub use server::build_router;
pub use state::AppState;
