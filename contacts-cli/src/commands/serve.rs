//! HTTP server command
//!
//! Builds the contact store from flags/environment and runs the server
//! until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, ValueEnum};

use contacts_server::config::DEFAULT_ACQUIRE_TIMEOUT_SECS;
use contacts_server::db::create_pool;
use contacts_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use contacts_server::http::{run_server, ServerConfig};
use contacts_server::{ContactRepo, ContactStore, DatabaseConfig, MemoryContactRepo};

/// Which backend holds the contacts
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// PostgreSQL `contacts` table
    Postgres,
    /// Process memory; contents are lost on exit
    Memory,
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 4001)]
    pub port: u16,

    /// Contact store backend
    #[arg(long, env = "CONTACTS_STORE", value_enum, default_value_t = StoreKind::Postgres)]
    pub store: StoreKind,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Allowed CORS origin, repeatable or comma-separated
    /// [default: localhost on port 3000 and on --port]
    #[arg(long = "cors-origin", env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// PostgreSQL connection settings
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Full connection string (overrides the individual --db-* settings)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Database user
    #[arg(long, env = "USER_NAME", default_value = "postgres")]
    pub db_user: String,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database name
    #[arg(long, env = "DATABASE", default_value = "contacts")]
    pub db_name: String,

    /// Database password
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database port
    #[arg(long, env = "PORT_DB", default_value_t = 5432)]
    pub db_port: u16,

    /// Maximum pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Seconds a request waits for a pooled connection
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = DEFAULT_ACQUIRE_TIMEOUT_SECS)]
    pub acquire_timeout_secs: u64,
}

impl From<DatabaseArgs> for DatabaseConfig {
    fn from(args: DatabaseArgs) -> Self {
        Self {
            url: args.database_url,
            user: args.db_user,
            host: args.db_host,
            database: args.db_name,
            password: args.db_password,
            port: args.db_port,
            max_connections: args.max_connections,
            acquire_timeout: Duration::from_secs(args.acquire_timeout_secs),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let bind_addr = SocketAddr::new(args.host, args.port);
    tracing::info!("Starting contacts server on {}", bind_addr);

    let store: Arc<dyn ContactStore> = match args.store {
        StoreKind::Postgres => {
            let config = DatabaseConfig::from(args.database);
            let pool = create_pool(&config)
                .await
                .with_context(|| format!("Failed to connect to {}", config.display_target()))?;
            Arc::new(ContactRepo::new(pool))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store - contacts are lost on exit");
            Arc::new(MemoryContactRepo::new())
        }
    };

    let cors_origins = if args.cors_origins.is_empty() {
        ServerConfig::local_origins(args.port)
    } else {
        args.cors_origins
    };

    let config = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive,
        cors_origins,
    };

    // Blocks until shutdown
    run_server(store, config).await.context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        TestCli::try_parse_from(std::iter::once("serve").chain(args.iter().copied()))
            .expect("parse failed")
            .serve
    }

    #[test]
    fn flags_build_database_config() {
        let args = parse(&[
            "--db-user",
            "app",
            "--db-host",
            "db.internal",
            "--db-name",
            "crm",
            "--db-password",
            "hunter2",
            "--db-port",
            "6543",
            "--max-connections",
            "3",
            "--acquire-timeout-secs",
            "5",
        ]);

        let config = DatabaseConfig::from(args.database);
        assert_eq!(config.user, "app");
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.database, "crm");
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.port, 6543);
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn store_and_bind_flags() {
        let args = parse(&["--store", "memory", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(args.store, StoreKind::Memory);
        assert_eq!(SocketAddr::new(args.host, args.port).to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn user_name_env_sets_db_user() {
        std::env::set_var("USER_NAME", "contacts_app");
        let args = parse(&[]);
        std::env::remove_var("USER_NAME");

        assert_eq!(DatabaseConfig::from(args.database).user, "contacts_app");
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let args = parse(&[
            "--cors-origin",
            "http://localhost:3000,https://contacts.example",
            "--cors-origin",
            "http://10.0.0.5:8080",
        ]);
        assert_eq!(
            args.cors_origins,
            vec![
                "http://localhost:3000",
                "https://contacts.example",
                "http://10.0.0.5:8080"
            ]
        );
    }

    #[test]
    fn rejects_unknown_store() {
        let result = TestCli::try_parse_from(["serve", "--store", "redis"]);
        assert!(result.is_err());
    }
}
