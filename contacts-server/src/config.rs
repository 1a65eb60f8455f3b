//! Database connection settings
//!
//! Connection parts map onto sqlx `PgConnectOptions` directly, so a password
//! containing URL metacharacters never needs escaping. A full `url` wins
//! over the individual parts when present.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::db::pool::DEFAULT_MAX_CONNECTIONS;

/// Default seconds to wait for a pooled connection
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// PostgreSQL connection and pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; overrides the parts below
    pub url: Option<String>,
    pub user: String,
    pub host: String,
    pub database: String,
    pub password: Option<String>,
    pub port: u16,
    /// Upper bound on open connections in the pool
    pub max_connections: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: "postgres".to_string(),
            host: "localhost".to_string(),
            database: "contacts".to_string(),
            password: None,
            port: 5432,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl DatabaseConfig {
    /// Build sqlx connect options.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is set and cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url);
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        Ok(match &self.password {
            Some(password) => options.password(password),
            None => options,
        })
    }

    /// Host and database for log lines; never includes the password.
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_become_connect_options() {
        let config = DatabaseConfig {
            user: "app".into(),
            host: "db.internal".into(),
            database: "crm".into(),
            password: Some("p@ss/word".into()),
            port: 6543,
            ..Default::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "app");
        assert_eq!(options.get_database(), Some("crm"));
    }

    #[test]
    fn url_overrides_parts() {
        let config = DatabaseConfig {
            url: Some("postgres://alice@example.org:5999/other".into()),
            ..Default::default()
        };

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "example.org");
        assert_eq!(options.get_port(), 5999);
        assert_eq!(options.get_username(), "alice");
    }

    #[test]
    fn bad_url_is_an_error() {
        let config = DatabaseConfig {
            url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(config.connect_options().is_err());
    }

    #[test]
    fn display_target_hides_password() {
        let config = DatabaseConfig {
            password: Some("secret".into()),
            ..Default::default()
        };
        let target = config.display_target();
        assert_eq!(target, "postgres@localhost:5432/contacts");
        assert!(!target.contains("secret"));
    }
}
