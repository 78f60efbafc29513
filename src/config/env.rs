//! Server settings from environment variables (`.env` is loaded first when present).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// `AUTOCRUD_BIND`
    pub bind: SocketAddr,
    /// `DATABASE_URL`; Postgres-backed resources are mounted only when set.
    pub database_url: Option<String>,
    /// `AUTOCRUD_MAX_CONNECTIONS`
    pub max_connections: u32,
    /// `AUTOCRUD_BODY_LIMIT`, in bytes.
    pub body_limit: usize,
    /// `AUTOCRUD_SCHEMA_PATH`: JSON model schema for a dynamic resource.
    pub schema_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("AUTOCRUD_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let bind = bind_raw.parse().map_err(|_| ConfigError::Env {
            var: "AUTOCRUD_BIND",
            message: format!("invalid socket address '{}'", bind_raw),
        })?;
        let max_connections = match get("AUTOCRUD_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|_| ConfigError::Env {
                var: "AUTOCRUD_MAX_CONNECTIONS",
                message: format!("expected a positive integer, got '{}'", v),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let body_limit = match get("AUTOCRUD_BODY_LIMIT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Env {
                var: "AUTOCRUD_BODY_LIMIT",
                message: format!("expected a byte count, got '{}'", v),
            })?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(ServerConfig {
            bind,
            database_url: get("DATABASE_URL"),
            max_connections,
            body_limit,
            schema_path: get("AUTOCRUD_SCHEMA_PATH").map(PathBuf::from),
        })
    }
}
