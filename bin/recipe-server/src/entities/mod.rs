//! Database abstraction layer.
//!
//! [`RecipeStore`] defines the interface for persisting recipes.  The default
//! implementation lives on [`SqliteStore`].  To swap to another database,
//! implement [`RecipeStore`] for your new type and change the concrete type
//! in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since Rust
//! 1.75) so no extra `async-trait` crate is required.

pub mod dao;
pub mod recipe;

pub use dao::{NewRecipe, Recipe, RecipeUpdate};

pub use recipe::RecipeStore;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// SQLite-backed store.
///
/// Holds a connection pool, never a single connection: every statement
/// checks a connection out and returns it when the statement finishes,
/// whether it succeeded or not.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url`.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://recipes.db"`.
    /// The schema is not touched here; call [`RecipeStore::initialize`] next.
    ///
    /// An in-memory database lives only as long as its connection, so it is
    /// accepted only with a single-connection pool, and that connection is
    /// kept open for the lifetime of the store.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if is_in_memory(url) {
            if max_connections > 1 {
                return Err(sqlx::Error::Configuration(
                    format!(
                        "in-memory database {url:?} requires a single connection \
                         (got max_connections = {max_connections})"
                    )
                    .into(),
                ));
            }
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
