//! Server configuration from the environment.

use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub max_connections: u32,
}

impl ServerConfig {
    /// Read configuration from env vars, with development defaults:
    /// `BIND_ADDR` (0.0.0.0:3000), `DATABASE_URL` (postgres://localhost/catalog),
    /// `PG_MAX_CONNECTIONS` (5).
    pub fn from_env() -> Self {
        ServerConfig {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/catalog".into()),
            max_connections: env::var("PG_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}
