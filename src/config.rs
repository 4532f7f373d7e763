//! Server configuration

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::services::Pagination;
use crate::utils::RetryConfig;

/// Which repository adapter backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Storage {
    Scylla,
    Memory,
}

/// Storefront API server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront catalog, cart and order API", long_about = None)]
pub struct Config {
    /// Server host address
    #[arg(short = 'H', long, env = "STOREFRONT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "STOREFRONT_PORT", default_value = "8080")]
    pub port: u16,

    /// Repository backend
    #[arg(long, env = "STOREFRONT_STORAGE", value_enum, default_value = "scylla")]
    pub storage: Storage,

    /// ScyllaDB contact points, comma separated
    #[arg(
        long,
        env = "SCYLLA_NODES",
        value_delimiter = ',',
        default_value = "127.0.0.1:9042"
    )]
    pub scylla_nodes: Vec<String>,

    #[arg(long, env = "SCYLLA_KEYSPACE", default_value = "storefront")]
    pub scylla_keyspace: String,

    #[arg(long, env = "SCYLLA_REPLICATION_FACTOR", default_value = "1")]
    pub scylla_replication_factor: u32,

    /// Connection attempts before giving up at startup
    #[arg(long, env = "SCYLLA_CONNECT_ATTEMPTS", default_value = "5")]
    pub scylla_connect_attempts: u32,

    /// Page size used when a list request has no `limit`
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value = "20")]
    pub default_page_size: u32,

    /// Upper bound for `limit` on list requests
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "100")]
    pub max_page_size: u32,
}

impl Config {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination {
            default_limit: self.default_page_size.max(1),
            max_limit: self.max_page_size.max(1),
        }
    }

    #[must_use]
    pub fn connect_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.scylla_connect_attempts.max(1),
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}
