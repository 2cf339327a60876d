//! Database connection settings and pool setup

use anyhow::Context;
use fairs_common::FailureLog;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::Connection;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{EtlError, Result};

const DEFAULT_PG_PORT: u16 = 5432;

/// Variables required when `DATABASE_URL` is not set
const REQUIRED_VARS: [&str; 4] = ["PG_HOST", "PG_DB", "PG_USER", "PG_PASSWORD"];

#[derive(Clone)]
pub struct DbConfig {
    pub options: PgConnectOptions,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

// Keeps the password out of debug output
impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.options.get_host())
            .field("port", &self.options.get_port())
            .field("database", &self.options.get_database())
            .field("username", &self.options.get_username())
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DbConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// `DATABASE_URL` wins when set. Otherwise the `PG_*` parts are passed to
    /// the driver as separate fields, so credentials need no URL escaping.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let options = match non_empty("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|e| {
                EtlError::Configuration(format!("DATABASE_URL is not a valid connection URL: {}", e))
            })?,
            None => {
                let missing: Vec<&str> = REQUIRED_VARS
                    .iter()
                    .copied()
                    .filter(|name| non_empty(*name).is_none())
                    .collect();
                if !missing.is_empty() {
                    return Err(EtlError::Configuration(format!(
                        "missing database settings {}",
                        missing.join(", ")
                    )));
                }

                let port = match non_empty("PG_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                        EtlError::Configuration(format!("PG_PORT is not a valid port: {}", raw))
                    })?,
                    None => DEFAULT_PG_PORT,
                };

                // Presence checked above
                let var = |name: &str| non_empty(name).unwrap_or_default();
                PgConnectOptions::new()
                    .host(&var("PG_HOST"))
                    .port(port)
                    .username(&var("PG_USER"))
                    .password(&var("PG_PASSWORD"))
                    .database(&var("PG_DB"))
            },
        };

        let max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let connect_timeout_secs = lookup("DB_CONNECT_TIMEOUT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            options,
            max_connections,
            connect_timeout_secs,
        })
    }
}

/// Open a pool. The driver error goes to `failure_log`; the caller gets
/// [`EtlError::Connection`].
pub async fn connect(config: &DbConfig, failure_log: &dyn FailureLog) -> Result<PgPool> {
    match open_pool(config).await {
        Ok(pool) => {
            tracing::info!(
                max_connections = config.max_connections,
                "Database connection pool created"
            );
            Ok(pool)
        },
        Err(e) => {
            failure_log.log_failure(&e);
            Err(EtlError::Connection)
        },
    }
}

async fn open_pool(config: &DbConfig) -> anyhow::Result<PgPool> {
    let timeout = Duration::from_secs(config.connect_timeout_secs);

    // The pool only reports a timeout; a single connection surfaces the cause
    let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&config.options))
        .await
        .context("Timed out connecting to PostgreSQL")?
        .context("Failed to connect to PostgreSQL")?;
    if let Err(e) = conn.close().await {
        tracing::debug!("Closing initial connection failed: {}", e);
    }

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(timeout)
        .connect_with(config.options.clone())
        .await
        .context("Failed to create PostgreSQL connection pool")
}
