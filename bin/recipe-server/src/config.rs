//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for recipe-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://recipes.db"`).
    /// The file is created on first start if it does not exist.
    pub database_url: String,

    /// Upper bound on pooled SQLite connections.
    pub db_max_connections: u32,

    /// Drop, recreate and reseed the `recipes` table on every start.
    ///
    /// Defaults to `true`. Set `RECIPE_RESET_ON_START=false` to keep rows
    /// across restarts.
    pub reset_on_start: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui` and the spec at `/api-docs/openapi.json`.
    pub enable_swagger: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("RECIPE_BIND", "0.0.0.0:3000"),
            database_url: env_or("RECIPE_DATABASE_URL", "sqlite://recipes.db"),
            db_max_connections: parse_env("RECIPE_DB_MAX_CONNECTIONS", 5),
            reset_on_start: env_flag("RECIPE_RESET_ON_START", true),
            log_level: env_or("RECIPE_LOG", "info"),
            log_json: env_flag("RECIPE_LOG_JSON", false),
            enable_swagger: env_flag("RECIPE_ENABLE_SWAGGER", true),
            cors_allowed_origins: std::env::var("RECIPE_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    let v = value.trim();
    if v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if v == "0" || v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}
