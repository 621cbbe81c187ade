use std::env;
use std::path::PathBuf;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::security_headers;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SQLITE_PATH: &str = "tickets.db";
const DEFAULT_ORGANIZER_ID: i64 = 1;

/// Storage engine selection, made once at process start. `DATABASE_URL`
/// selects the client/server engine; otherwise the embedded engine is used
/// at `DATABASE_PATH`.
#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Postgres { url: String },
    Sqlite { path: PathBuf },
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => DatabaseConfig::Postgres { url },
            _ => DatabaseConfig::Sqlite {
                path: PathBuf::from(
                    env::var("DATABASE_PATH")
                        .unwrap_or_else(|_| DEFAULT_SQLITE_PATH.to_string()),
                ),
            },
        }
    }
}

pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    /// Organizer that inherits visibility of unowned legacy events.
    pub default_organizer_id: i64,
    /// Emit the Strict-Transport-Security header; set in production where
    /// the API sits behind HTTPS.
    pub hsts_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let hsts_enabled = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);
        if hsts_enabled {
            tracing::info!("Security: HSTS header enabled (production mode)");
        } else {
            tracing::info!("Security: HSTS header disabled (development mode)");
        }

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            database: DatabaseConfig::from_env(),
            default_organizer_id: env::var("DEFAULT_ORGANIZER_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ORGANIZER_ID),
            hsts_enabled,
        }
    }
}
