// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Live MySQL client
//!
//! Reads table and column metadata from `information_schema`.
//!
//! - Tables are filtered to the configured database, or the session's
//!   `DATABASE()` when none is configured.
//! - `COLUMN_COMMENT` fills [`RawField::comment`].
//! - An unknown table yields an empty column list.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schema_introspect::{ConnectionSettings, DatabaseClient, MySqlClient};
//!
//! let mut client = MySqlClient::new(
//!     ConnectionSettings::new("mysql").with_database("shop").with_password("secret"),
//! );
//! client.connect().await?;
//! let tables = client.get_tables().await?;
//! client.disconnect().await;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use crate::error::{IntrospectError, IntrospectResult};
use crate::metadata::{Nullability, RawField};
use crate::r#trait::DatabaseClient;
use crate::settings::{Adapter, ConnectionSettings};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";

/// Pool acquire timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// information_schema columns use binary collations on MySQL 8; the casts
// keep them decodable as text.
const TABLES_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR)
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = COALESCE(?, DATABASE())
      AND TABLE_TYPE IN ('BASE TABLE', 'VIEW')
    ORDER BY TABLE_NAME
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR),
        CAST(DATA_TYPE AS CHAR),
        CAST(IS_NULLABLE AS CHAR),
        CAST(COLUMN_DEFAULT AS CHAR),
        CAST(COLUMN_COMMENT AS CHAR)
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = COALESCE(?, DATABASE())
      AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Row shape of [`COLUMNS_QUERY`]
type ColumnRow = (String, String, String, Option<String>, Option<String>);

/// Live MySQL client
pub struct MySqlClient {
    settings: ConnectionSettings,
    pool: Option<MySqlPool>,
}

impl MySqlClient {
    /// Create a disconnected client
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: None,
        }
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let options = MySqlConnectOptions::new()
            .host(self.settings.host_or(DEFAULT_HOST))
            .port(self.settings.port_or(DEFAULT_PORT))
            .username(self.settings.user_or(DEFAULT_USER))
            .password(self.settings.password());

        match self.settings.database() {
            Some(database) => options.database(database),
            None => options,
        }
    }

    fn pool(&self) -> IntrospectResult<&MySqlPool> {
        self.pool.as_ref().ok_or(IntrospectError::NotConnected)
    }

    fn to_raw_field(row: ColumnRow) -> RawField {
        let (name, data_type, is_nullable, default, comment) = row;
        RawField::new(name, data_type)
            .with_null(Nullability::from_is_nullable(&is_nullable))
            .with_default(default)
            .with_comment(comment.unwrap_or_default())
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    fn adapter(&self) -> Adapter {
        Adapter::MySql
    }

    fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn default_host(&self) -> &'static str {
        DEFAULT_HOST
    }

    fn default_port(&self) -> u16 {
        DEFAULT_PORT
    }

    fn default_user(&self) -> &'static str {
        DEFAULT_USER
    }

    fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    async fn connect(&mut self) -> IntrospectResult<()> {
        if self.pool.is_some() {
            debug!("MySQL client already connected");
            return Ok(());
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_with(self.connect_options())
            .await
            .map_err(|e| {
                IntrospectError::ConnectionFailed(format!("Failed to connect to MySQL: {}", e))
            })?;

        info!(
            host = self.settings.host_or(DEFAULT_HOST),
            port = self.settings.port_or(DEFAULT_PORT),
            database = ?self.settings.database(),
            "Connected to MySQL"
        );
        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Disconnected from MySQL");
        }
    }

    async fn get_tables(&mut self) -> IntrospectResult<Vec<String>> {
        let pool = self.pool()?;

        let tables = sqlx::query_scalar::<_, String>(TABLES_QUERY)
            .bind(self.settings.database())
            .fetch_all(pool)
            .await
            .map_err(|e| IntrospectError::QueryFailed(format!("Failed to list tables: {}", e)))?;

        debug!(count = tables.len(), "Listed MySQL tables");
        Ok(tables)
    }

    async fn get_columns(&mut self, table: &str) -> IntrospectResult<Vec<RawField>> {
        let pool = self.pool()?;

        let rows = sqlx::query_as::<_, ColumnRow>(COLUMNS_QUERY)
            .bind(self.settings.database())
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                IntrospectError::QueryFailed(format!(
                    "Failed to get columns for table '{}': {}",
                    table, e
                ))
            })?;

        debug!(table, count = rows.len(), "Described MySQL table");
        Ok(rows.into_iter().map(Self::to_raw_field).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MySqlClient {
        MySqlClient::new(ConnectionSettings::new("mysql").with_database("shop"))
    }

    #[test]
    fn test_defaults() {
        let client = client();
        assert_eq!(client.adapter(), Adapter::MySql);
        assert_eq!(client.default_host(), "localhost");
        assert_eq!(client.default_port(), 3306);
        assert_eq!(client.default_user(), "root");
        assert!(!client.is_connected());
    }

    #[test]
    fn test_to_raw_field_maps_information_schema_row() {
        let field = MySqlClient::to_raw_field((
            "status".to_string(),
            "varchar".to_string(),
            "YES".to_string(),
            Some("pending".to_string()),
            Some("Order state".to_string()),
        ));

        assert_eq!(field.field, "status");
        assert_eq!(field.data_type, "varchar");
        assert_eq!(field.null, Nullability::Yes);
        assert_eq!(field.default.as_deref(), Some("pending"));
        assert_eq!(field.comment, "Order state");
    }

    #[test]
    fn test_to_raw_field_without_default_or_comment() {
        let field = MySqlClient::to_raw_field((
            "id".to_string(),
            "bigint".to_string(),
            "NO".to_string(),
            None,
            None,
        ));

        assert_eq!(field.null, Nullability::No);
        assert_eq!(field.default, None);
        assert_eq!(field.comment, "");
    }

    #[tokio::test]
    async fn test_catalog_calls_require_connection() {
        let mut client = client();
        assert_eq!(client.get_tables().await, Err(IntrospectError::NotConnected));
        assert_eq!(client.get_columns("orders").await, Err(IntrospectError::NotConnected));
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        let mut client = client();
        client.disconnect().await;
        client.disconnect().await;
        assert!(!client.is_connected());
    }
}
