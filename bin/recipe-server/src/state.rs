//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;

/// State shared across all HTTP handlers.
///
/// Nothing in here is mutated after startup; per-request storage access goes
/// through the store's connection pool.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Recipe persistence.
    pub store: Arc<SqliteStore>,
}
