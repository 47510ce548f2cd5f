//! Data directory and `config.toml` loading for Roost.
//!
//! The data directory defaults to `~/.roost/` and can be redirected with
//! `ROOST_DATA_DIR`. A missing or malformed `config.toml` falls back to
//! [`ServerConfig::default()`] so the server always starts.

use std::path::{Path, PathBuf};

use roost_types::config::ServerConfig;

use crate::sqlite::pool::default_database_url;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ROOST_DATA_DIR";

/// Resolve the data directory: `$ROOST_DATA_DIR`, else `~/.roost`, else `./.roost`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".roost")
}

/// Load server configuration from `{data_dir}/config.toml`.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ServerConfig::default()
        }
    }
}

/// The database URL to connect to: the configured one, or `roost.db` in the data directory.
pub fn resolve_database_url(config: &ServerConfig, data_dir: &Path) -> String {
    match &config.database_url {
        Some(url) if !url.trim().is_empty() => url.clone(),
        _ => default_database_url(data_dir),
    }
}
