//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. Optional file: `hnetdb.toml` in the working directory
//! 2. Driver/secret variables: `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`, `SECRET_ACCESS`
//! 3. Environment overrides: `HNETDB_*` (e.g. `HNETDB_SERVER_PORT`)
//!
//! # Example file
//!
//! ```toml
//! [neo4j]
//! uri = "bolt://localhost:7687"
//! username = "neo4j"
//! max_connections = 16
//! query_timeout_secs = 10
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [auth]
//! token_ttl_secs = 900
//! ```
//!
//! Credentials and the signing secret are expected from the environment.
//! A missing required value fails [`Config::load`], and the process aborts
//! before it binds a listener.

use std::ops::Deref;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub neo4j: Neo4jConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

/// Neo4j connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    /// Bolt URI (required), e.g. `bolt://localhost:7687`.
    pub uri: String,
    /// Username (required).
    pub username: String,
    /// Password (required).
    pub password: String,
    /// Upper bound of the driver's internal connection pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Deadline applied to every repository call.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl Neo4jConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Token signing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign login tokens (required).
    pub secret: String,
    /// Token lifetime, 15 minutes unless overridden.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

fn default_max_connections() -> usize {
    16
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_token_ttl_secs() -> u64 {
    15 * 60
}

/// Name of the optional configuration file.
pub const CONFIG_FILE: &str = "hnetdb.toml";

impl Config {
    /// Load config with layered resolution (file → driver env → `HNETDB_*` env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// The layered provider stack behind [`Config::load`].
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::default("server", ServerConfig::default()))
            // Layer 1: config file (lowest priority)
            .merge(Toml::file(CONFIG_FILE))
            // Layer 2: the driver variables the deployment already exports
            .merge(
                Env::raw()
                    .only(&["NEO4J_URI", "NEO4J_USERNAME", "NEO4J_PASSWORD"])
                    .map(|key| {
                        key.as_str()
                            .to_ascii_lowercase()
                            .replacen("neo4j_", "neo4j.", 1)
                            .into()
                    }),
            )
            .merge(
                Env::raw()
                    .only(&["SECRET_ACCESS"])
                    .map(|_| "auth.secret".into()),
            )
            // Layer 3: HNETDB_ overrides (highest priority)
            .merge(Env::prefixed("HNETDB_").map(|key| {
                key.as_str()
                    .to_ascii_lowercase()
                    .replacen("server_", "server.", 1)
                    .replacen("query_timeout_secs", "neo4j.query_timeout_secs", 1)
                    .replacen("token_ttl_secs", "auth.token_ttl_secs", 1)
                    .into()
            }))
    }

    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
