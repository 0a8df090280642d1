//! configuration types for terrapin.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// main configuration for the terrapin controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// internal http server options.
    pub server: ServerConfig,

    /// public-facing application options.
    pub app: AppConfig,

    /// relay options announced to olms.
    pub gerbil: GerbilConfig,

    /// database configuration.
    pub database: DatabaseConfig,

    /// directory holding persistent controller state (keypair, sqlite file).
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            app: AppConfig::default(),
            gerbil: GerbilConfig::default(),
            database: DatabaseConfig::default(),
            data_dir: PathBuf::from("/var/lib/terrapin"),
        }
    }
}

/// internal http server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// listen port for the internal http surface.
    pub internal_port: u16,

    /// hmac secret for auxiliary signing. read by the auth-proxy builder
    /// but not emitted in any payload.
    pub secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            internal_port: 3003,
            secret: None,
        }
    }
}

/// public application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// public url of the controller dashboard. used to derive the auth
    /// cookie domain and the session-validation url pushed to newts.
    pub dashboard_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dashboard_url: String::new(),
        }
    }
}

/// relay configuration announced to olms in sync messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GerbilConfig {
    /// base relay port announced to olms.
    pub clients_start_port: u16,
}

impl Default for GerbilConfig {
    fn default() -> Self {
        Self {
            clients_start_port: 51820,
        }
    }
}

/// where the controller keeps its relational state.
///
/// tagged by `backend` so a config file reads as
/// `{"backend": "sqlite", "path": "..."}` or
/// `{"backend": "postgres", "url": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// embedded sqlite file, the single-node default.
    Sqlite {
        /// path to the database file. created on first start.
        path: PathBuf,
    },
    /// external postgresql server.
    Postgres {
        /// full connection url, credentials included.
        url: String,
    },
}

impl DatabaseConfig {
    /// short description for startup logs. never includes credentials.
    pub fn summary(&self) -> String {
        match self {
            DatabaseConfig::Sqlite { path } => format!("sqlite at {}", path.display()),
            DatabaseConfig::Postgres { .. } => "external postgres".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig::Sqlite {
            path: PathBuf::from("/var/lib/terrapin/db.sqlite"),
        }
    }
}
